//! JSON document source.

use crate::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// A single JSON document loaded fully into memory.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    /// Creates a JSON source for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the document.
    ///
    /// Syntax errors fail with a `json` parse error; read failures with an IO
    /// error.
    #[instrument(skip(self), fields(source.type = "json", source.path = %self.path.display()))]
    pub async fn load(&self, max_file_size: Option<u64>) -> Result<Value> {
        let content = super::read_to_string(&self.path, max_file_size).await?;
        let value = parse_document(&content)?;
        debug!(bytes = content.len(), "JSON document parsed");
        Ok(value)
    }

    /// Returns a human-readable description of this source.
    pub fn description(&self) -> String {
        format!("JSON file: {}", self.path.display())
    }
}

/// Parses a JSON document from text.
pub fn parse_document(content: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|e| SummaryError::parse_with_source("json", e))
}
