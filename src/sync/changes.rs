//! File changes requested for a run.

use crate::error::{ForkPrError, Result};
use std::path::PathBuf;

/// Whether a change writes or deletes a destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Add,
    Remove,
}

/// One requested change to the head branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Local file whose bytes are written; `None` for removals.
    pub local_path: Option<PathBuf>,
    /// Path inside the repository.
    pub destination: String,
    pub operation: FileOperation,
}

impl FileChange {
    /// Write the bytes of `local_path` to `destination`.
    pub fn add(local_path: impl Into<PathBuf>, destination: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            local_path: Some(local_path.into()),
            destination: normalize_destination(destination.as_ref())?,
            operation: FileOperation::Add,
        })
    }

    /// Delete `destination` from the repository.
    pub fn remove(destination: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            local_path: None,
            destination: normalize_destination(destination.as_ref())?,
            operation: FileOperation::Remove,
        })
    }

    /// Build the change list from command-line style inputs.
    ///
    /// `positional` must hold either nothing or a `SOURCE DEST` pair, and the
    /// `add_files` / `dest_files` lists must pair up one-to-one. The
    /// positional pair comes first, then additions, then removals.
    pub fn from_args(
        positional: &[String],
        add_files: &[PathBuf],
        dest_files: &[String],
        remove_files: &[String],
    ) -> Result<Vec<Self>> {
        let mut changes = Vec::new();

        match positional {
            [] => {}
            [source, dest] => changes.push(Self::add(source, dest)?),
            other => {
                return Err(ForkPrError::InvalidConfig(format!(
                    "expected SOURCE and DEST positional arguments, got {} argument(s)",
                    other.len()
                )));
            }
        }

        if add_files.len() != dest_files.len() {
            return Err(ForkPrError::InvalidConfig(format!(
                "--addfile given {} time(s) but --destfile given {} time(s)",
                add_files.len(),
                dest_files.len()
            )));
        }

        for (source, dest) in add_files.iter().zip(dest_files) {
            changes.push(Self::add(source, dest)?);
        }
        for path in remove_files {
            changes.push(Self::remove(path)?);
        }

        if changes.is_empty() {
            return Err(ForkPrError::InvalidConfig(
                "no files to add or remove".into(),
            ));
        }

        Ok(changes)
    }
}

/// Turn a user-supplied destination into a repository path.
///
/// Leading `/` and `./` are dropped; empty paths and `..` segments are rejected.
pub fn normalize_destination(path: &str) -> Result<String> {
    let trimmed = path.trim();
    let mut rest = trimmed;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }

    let segments: Vec<&str> = rest
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if segments.is_empty() || segments.contains(&"..") {
        return Err(ForkPrError::InvalidConfig(format!(
            "invalid destination path '{}'",
            path
        )));
    }

    Ok(segments.join("/"))
}
