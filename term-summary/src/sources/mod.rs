//! Data source loaders for the summarization engine.
//!
//! Every loader reads the whole file into memory: CSV files are registered
//! with a DataFusion context, JSON documents are parsed with `serde_json`, and
//! text files are read as UTF-8 strings.

use crate::prelude::*;
use std::path::Path;
use tracing::{debug, instrument};

mod csv;
mod json;

pub use csv::{CsvOptions, CsvSource, DEFAULT_NULL_REGEX};
pub use json::JsonSource;

/// Fails with [`SummaryError::FileTooLarge`] when `path` is above `limit`.
///
/// Also surfaces missing or unreadable files as [`SummaryError::Io`] before
/// any parser sees them.
#[instrument(skip(path), fields(path = %path.display()))]
pub async fn check_file(path: &Path, limit: Option<u64>) -> Result<u64> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(SummaryError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("'{}' is not a regular file", path.display()),
        )));
    }

    let size = metadata.len();
    if let Some(limit) = limit {
        if size > limit {
            return Err(SummaryError::FileTooLarge {
                path: path.display().to_string(),
                size,
                limit,
            });
        }
    }

    debug!(file.size = size, "File accepted for summarization");
    Ok(size)
}

/// Reads a whole UTF-8 file after checking it against the size limit.
pub async fn read_to_string(path: &Path, limit: Option<u64>) -> Result<String> {
    check_file(path, limit).await?;
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content)
}
