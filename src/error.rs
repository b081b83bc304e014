use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a version-control backend.
///
/// Kept free of backend types in its public surface except for the
/// transparent `git2` variant, so fakes can report failures with [`VcsError::Other`].
#[derive(Error, Debug)]
pub enum VcsError {
    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error("remote `{0}` is not configured (add one with: git remote add {0} <url>)")]
    NoRemote(String),

    #[error("HEAD is not on a branch; nothing to push")]
    DetachedHead,

    #[error("remote rejected {reference}: {message}")]
    Rejected { reference: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Errors that stop commit generation.
///
/// Push failures never show up here: they are reported through
/// [`PushOutcome`](crate::PushOutcome) instead.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("offset out of range: {weeks} weeks / {days} days (weeks 0..=53, days 0..=5)")]
    InvalidOffset { weeks: u32, days: u32 },

    #[error("synthetic date is out of the representable range")]
    DateOutOfRange,

    #[error("failed to serialize commit record")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stage {}", path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: VcsError,
    },

    #[error("failed to commit")]
    Commit {
        #[source]
        source: VcsError,
    },

    #[error("commit {remaining} failed after {completed} commit(s) were created")]
    Iteration {
        remaining: u32,
        completed: usize,
        #[source]
        source: Box<GenerateError>,
    },
}

impl GenerateError {
    /// Number of commits that were created before this error stopped the run.
    pub fn completed(&self) -> usize {
        match self {
            GenerateError::Iteration { completed, .. } => *completed,
            _ => 0,
        }
    }

    /// The underlying step failure, looking through the iteration wrapper.
    pub fn root(&self) -> &GenerateError {
        match self {
            GenerateError::Iteration { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_remote_message_includes_hint() {
        let err = VcsError::NoRemote("origin".to_string());
        let msg = err.to_string();
        assert!(msg.contains("`origin`"));
        assert!(msg.contains("git remote add origin"));
    }

    #[test]
    fn iteration_wrapper_exposes_root_and_count() {
        let inner = GenerateError::Write {
            path: PathBuf::from("data.json"),
            source: std::io::Error::other("disk full"),
        };
        let err = GenerateError::Iteration {
            remaining: 3,
            completed: 2,
            source: Box::new(inner),
        };
        assert_eq!(err.completed(), 2);
        assert!(matches!(err.root(), GenerateError::Write { .. }));
        assert!(err.to_string().contains("commit 3 failed after 2"));
    }
}
