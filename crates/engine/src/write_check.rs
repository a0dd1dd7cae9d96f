// crates/engine/src/write_check.rs
use crate::error::{EngineError, Result};
use crate::options::WritePreset;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// A write → read back → compare → remove cycle on one file.
#[derive(Debug, Clone)]
pub struct WriteCheck {
    pub path: PathBuf,
    pub content: String,
    pub keep: bool,
}

impl From<WritePreset> for WriteCheck {
    fn from(preset: WritePreset) -> Self {
        Self {
            path: PathBuf::from(preset.file_name()),
            content: preset.content().to_string(),
            keep: preset.keeps_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteCheckReport {
    pub path: PathBuf,
    pub bytes_written: usize,
    pub content_read: String,
    pub matched: bool,
    pub removed: bool,
}

/// Run the check.
///
/// A content mismatch is not an error; it is reported through
/// [`WriteCheckReport::matched`]. The file is removed even on mismatch unless
/// `keep` is set.
///
/// # Errors
/// Returns an error when the file cannot be written, read, or removed.
pub fn run(check: &WriteCheck) -> Result<WriteCheckReport> {
    tracing::debug!(path = %check.path.display(), "writing probe file");
    fs::write(&check.path, check.content.as_bytes()).map_err(|source| EngineError::FileWrite {
        path: check.path.clone(),
        source,
    })?;

    if !check.path.exists() {
        return Err(EngineError::FileMissing(check.path.clone()));
    }

    let content_read = fs::read_to_string(&check.path).map_err(|source| EngineError::FileRead {
        path: check.path.clone(),
        source,
    })?;
    let matched = content_read == check.content;
    if !matched {
        tracing::warn!(path = %check.path.display(), "read-back content differs");
    }

    let removed = if check.keep {
        false
    } else {
        fs::remove_file(&check.path).map_err(|source| EngineError::FileRemove {
            path: check.path.clone(),
            source,
        })?;
        true
    };

    Ok(WriteCheckReport {
        path: check.path.clone(),
        bytes_written: check.content.len(),
        content_read,
        matched,
        removed,
    })
}
