//! Git integration layer.
//!
//! The generator only talks to the [`VersionControl`] trait; the `git2`
//! implementation lives in `git2_backend` and is re-exported as
//! [`Git2Backend`]. Tests drive the generator with an in-memory fake.

mod git2_backend;

use chrono::{DateTime, FixedOffset};
use std::path::Path;

use crate::error::VcsError;

pub use git2_backend::Git2Backend;

/// The three version-control operations commit generation needs.
pub trait VersionControl {
    /// Stage `path` (relative to the working tree root).
    fn stage(&mut self, path: &Path) -> Result<(), VcsError>;

    /// Commit the index with `message`, using `date` as both the author and
    /// committer timestamp. Returns the new commit id.
    fn commit(&mut self, message: &str, date: &DateTime<FixedOffset>) -> Result<String, VcsError>;

    /// Push the current branch to the configured remote.
    fn push(&mut self) -> Result<(), VcsError>;
}
