use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::GenerateError;

/// Content written to the data file before each batch commit.
///
/// The file only exists to give every commit a change to record; history
/// lives in the commits, not in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub date: String,
    pub commit: u32,
}

/// Content written by the single-shot `mark` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkRecord {
    pub date: String,
    pub x: u32,
    pub y: u32,
    pub coordinates: String,
}

impl MarkRecord {
    pub fn new(date: String, x: u32, y: u32) -> Self {
        Self {
            date,
            x,
            y,
            coordinates: format!("({}, {})", x, y),
        }
    }
}

/// Serialize `record` as one line of JSON and replace the file at `path` with it.
///
/// Missing parent directories are created. The previous content is always
/// discarded; nothing is appended.
///
/// # Errors
/// - [`GenerateError::Serialize`] if the record cannot be encoded.
/// - [`GenerateError::Write`] if the directory or file cannot be written.
pub fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<(), GenerateError> {
    let mut body = serde_json::to_string(record)?;
    body.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, body).map_err(|source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    })
}
