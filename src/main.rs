//! # backdate
//!
//! **backdate** fills a git repository with backdated commits.
//!
//! Features:
//! - `backdate generate [COUNT]` creates COUNT commits with random dates from the past year, then pushes
//! - `backdate mark <X> <Y>` creates a single commit X weeks and Y days after the one-year-ago anchor
//! - `backdate window` prints the range of dates a commit can get today
//!
//! Settings can be kept in `backdate.toml` at the repository root.
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use backdate::{Overrides, RunOptions, cmd_generate, cmd_mark, cmd_window};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command-line interface definition.
///
/// Parsed using `clap` derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "backdate",
    version,
    about = "backdate - fill a git repository with backdated commits",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create COUNT backdated commits, then push
    Generate {
        /// Number of commits to create
        #[arg(default_value_t = 1)]
        count: u32,
        #[command(flatten)]
        shared: Shared,
    },
    /// Create one commit X weeks (0-53) and Y days (0-5) after the one-year-ago anchor
    Mark {
        x: u32,
        y: u32,
        #[command(flatten)]
        shared: Shared,
    },
    /// Print the range of dates a generated commit can get today
    Window,
}

/// Options shared by `generate` and `mark`.
#[derive(Args, Debug)]
struct Shared {
    /// Path inside the target repository (defaults to the current directory)
    #[arg(long)]
    repo: Option<PathBuf>,
    /// Settings file (defaults to backdate.toml at the repository root)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Data file rewritten before each commit, relative to the repository root
    #[arg(long)]
    data_file: Option<PathBuf>,
    /// Pause between commits in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Remote to push to
    #[arg(long)]
    remote: Option<String>,
    /// Skip the final push
    #[arg(long)]
    no_push: bool,
}

impl From<Shared> for RunOptions {
    fn from(s: Shared) -> Self {
        RunOptions {
            repo: s.repo,
            config: s.config,
            overrides: Overrides {
                data_file: s.data_file,
                delay_ms: s.delay_ms,
                remote: s.remote,
                no_push: s.no_push,
            },
        }
    }
}

/// CLI entry point.
///
/// Parses arguments with `clap`, sets up `tracing` (filtered by `RUST_LOG`)
/// and executes the selected subcommand.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Generate { count, shared } => cmd_generate(count, &shared.into()),
        Cmd::Mark { x, y, shared } => cmd_mark(x, y, &shared.into()),
        Cmd::Window => cmd_window(),
    }
}
