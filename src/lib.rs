//! Crate entry point for **backdate**.
//!
//! This library provides the implementation behind the `backdate` CLI,
//! which fills a repository with commits carrying pseudo-random dates from
//! the past year. Each submodule owns one responsibility (date scheduling,
//! the data record, git operations, the generation loop, etc.).
//! The `pub use` re-exports make the commands and the generator available
//! directly from the crate root.

mod config;
mod error;
mod generate;
mod git;
mod paths;
mod progress;
mod record;
mod schedule;
mod window;

/// Re-export commonly used types and commands so they can be accessed from `backdate::*`.
pub use config::{CONFIG_FILE, Overrides, Settings, load_settings};
pub use error::{GenerateError, VcsError};
pub use generate::{
    CreatedCommit, Generator, PushOutcome, Report, RunOptions, cmd_generate, cmd_mark,
};
pub use git::{Git2Backend, VersionControl};
pub use paths::{Paths, discover_workdir, paths};
pub use record::{CommitRecord, MarkRecord, write_record};
pub use schedule::{
    Clock, FixedClock, FixedOffsets, MAX_DAYS, MAX_WEEKS, Offset, OffsetSource, RandomOffsets,
    SystemClock, format_date, synthetic_date, window,
};
pub use window::cmd_window;
