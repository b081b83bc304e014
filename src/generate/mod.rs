mod generator;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::ProgressBar;
use std::path::PathBuf;

use crate::config::{Overrides, Settings, load_settings};
use crate::git::Git2Backend;
use crate::paths::{Paths, discover_workdir, paths};

pub use generator::{CreatedCommit, Generator, PushOutcome, Report};

/// Options shared by the `generate` and `mark` commands.
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    /// Any path inside the target repository (current directory when `None`).
    pub repo: Option<PathBuf>,
    /// Explicit settings file instead of `<workdir>/backdate.toml`.
    pub config: Option<PathBuf>,
    pub overrides: Overrides,
}

/// Resolve the working tree, settings and data file for a run.
fn prepare(opts: &RunOptions) -> Result<(Settings, Paths)> {
    let workdir = discover_workdir(opts.repo.as_deref())?;
    let settings = load_settings(&workdir, opts.config.as_deref())?.apply(&opts.overrides);
    let p = paths(&workdir, &settings.data_file)?;
    Ok((settings, p))
}

fn open_generator(settings: &Settings, p: &Paths) -> Result<Generator<Git2Backend>> {
    let git = Git2Backend::open(&p.workdir, settings.remote.clone())
        .with_context(|| format!("failed to open repository at {}", p.workdir.display()))?;
    Ok(Generator::new(git, p)
        .delay(settings.delay())
        .push(settings.push)
        .progress(ProgressBar::new_spinner()))
}

/// Console line for the push attempt. A failure is a warning only; the
/// error text already carries any remediation hint.
fn push_notice(outcome: &PushOutcome, remote: &str) -> Option<String> {
    match outcome {
        PushOutcome::Pushed => Some(format!("pushed to {}", remote)),
        PushOutcome::Skipped => None,
        PushOutcome::Failed(msg) => Some(format!(
            "{} could not push to remote: {}",
            "warning:".yellow().bold(),
            msg
        )),
    }
}

fn print_push(outcome: &PushOutcome, remote: &str) {
    match (outcome, push_notice(outcome, remote)) {
        (PushOutcome::Failed(_), Some(line)) => eprintln!("{}", line),
        (_, Some(line)) => println!("{}", line),
        (_, None) => {}
    }
}

/// CLI command: create `count` backdated commits, then push.
///
/// Flow:
/// 1. Discover the repository and load `backdate.toml` (if any), applying CLI overrides.
/// 2. For each of the `count` iterations: draw an offset, overwrite the data
///    file, stage and commit it with the synthetic date.
/// 3. Attempt one push; a push failure is printed as a warning.
///
/// # Errors
/// Returns an error if the repository cannot be opened or any iteration fails.
/// Commits created before the failure are kept.
pub fn cmd_generate(count: u32, opts: &RunOptions) -> Result<()> {
    let (settings, p) = prepare(opts)?;
    let mut generator = open_generator(&settings, &p)?;
    let report = generator
        .run(count)
        .with_context(|| format!("failed to generate commits in {}", p.workdir.display()))?;
    print_push(&report.push, &settings.remote);
    Ok(())
}

/// CLI command: create a single commit at `x` weeks / `y` days past the
/// one-year-ago anchor, then push.
///
/// # Errors
/// Returns an error if `x`/`y` are out of range, the repository cannot be
/// opened, or writing/staging/committing fails.
pub fn cmd_mark(x: u32, y: u32, opts: &RunOptions) -> Result<()> {
    let (settings, p) = prepare(opts)?;
    let mut generator = open_generator(&settings, &p)?;
    let report = generator
        .mark(x, y)
        .with_context(|| format!("failed to create commit in {}", p.workdir.display()))?;
    for c in &report.commits {
        println!("{} {}", c.id, c.date);
    }
    print_push(&report.push, &settings.remote);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Repository;
    use std::fs;
    use tempfile::tempdir;

    fn init_repo(path: &std::path::Path) -> Repository {
        let repo = Repository::init(path).unwrap();
        let mut cfg = repo.config().unwrap();
        cfg.set_str("user.name", "Test User").unwrap();
        cfg.set_str("user.email", "test@example.com").unwrap();
        repo
    }

    fn commit_count(repo: &Repository) -> usize {
        let mut walk = repo.revwalk().unwrap();
        walk.push_head().unwrap();
        walk.count()
    }

    #[test]
    fn generate_uses_config_file_and_overrides() {
        let td = tempdir().unwrap();
        let repo = init_repo(td.path());
        fs::write(
            td.path().join("backdate.toml"),
            "data_file = \"records/data.json\"\ndelay_ms = 0\n",
        )
        .unwrap();

        let opts = RunOptions {
            repo: Some(td.path().to_path_buf()),
            config: None,
            overrides: Overrides {
                no_push: true,
                ..Default::default()
            },
        };
        cmd_generate(3, &opts).unwrap();

        assert_eq!(commit_count(&repo), 3);
        assert!(td.path().join("records").join("data.json").is_file());
    }

    #[test]
    fn generate_survives_missing_remote() {
        let td = tempdir().unwrap();
        let repo = init_repo(td.path());
        let opts = RunOptions {
            repo: Some(td.path().to_path_buf()),
            config: None,
            overrides: Overrides {
                delay_ms: Some(0),
                ..Default::default()
            },
        };
        cmd_generate(2, &opts).unwrap();
        assert_eq!(commit_count(&repo), 2);
    }

    #[test]
    fn missing_remote_hint_is_printed_once() {
        let err = crate::error::VcsError::NoRemote("origin".to_string());
        let line = push_notice(&PushOutcome::Failed(err.to_string()), "origin").unwrap();
        assert_eq!(line.matches("git remote add").count(), 1);
        assert!(line.contains("could not push to remote"));

        assert_eq!(push_notice(&PushOutcome::Skipped, "origin"), None);
        assert_eq!(
            push_notice(&PushOutcome::Pushed, "upstream").as_deref(),
            Some("pushed to upstream")
        );
    }

    #[test]
    fn mark_creates_one_commit() {
        let td = tempdir().unwrap();
        let repo = init_repo(td.path());
        let opts = RunOptions {
            repo: Some(td.path().to_path_buf()),
            config: None,
            overrides: Overrides {
                no_push: true,
                ..Default::default()
            },
        };
        cmd_mark(10, 5, &opts).unwrap();
        assert_eq!(commit_count(&repo), 1);

        let txt = fs::read_to_string(td.path().join("data.json")).unwrap();
        assert!(txt.contains("\"coordinates\":\"(10, 5)\""));
    }

    #[test]
    fn mark_out_of_range_makes_no_commit() {
        let td = tempdir().unwrap();
        let repo = init_repo(td.path());
        let opts = RunOptions {
            repo: Some(td.path().to_path_buf()),
            ..Default::default()
        };
        assert!(cmd_mark(0, 6, &opts).is_err());
        assert!(repo.head().is_err());
    }
}
