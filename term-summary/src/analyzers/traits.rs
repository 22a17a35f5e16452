//! Core analyzer trait and the supported file formats.

use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::path::Path;

use crate::error::Result;
use crate::summary::Summary;

/// The file formats the engine can summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Comma separated values
    Csv,
    /// JSON object mapping field names to arrays
    Json,
    /// Line-oriented free text
    Text,
}

impl FileFormat {
    /// All supported formats.
    pub const ALL: [FileFormat; 3] = [FileFormat::Csv, FileFormat::Json, FileFormat::Text];

    /// Selects a format from the file name suffix.
    ///
    /// Matching is case-sensitive: `data.CSV` is not recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| name.ends_with(format.extension()))
    }

    /// Suffix recognized for this format, including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => ".csv",
            FileFormat::Json => ".json",
            FileFormat::Text => ".txt",
        }
    }

    /// Short lowercase label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
            FileFormat::Text => "txt",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An analyzer turning one file of a given format into a [`Summary`].
///
/// Analyzers hold only configuration; every call reads its file afresh and
/// shares no state with other calls, so one analyzer can serve many files
/// concurrently.
///
/// # Example
///
/// ```rust,ignore
/// use term_summary::analyzers::{FileAnalyzer, FileFormat};
/// use term_summary::summary::{Summary, TextSummary};
/// use async_trait::async_trait;
/// use std::path::Path;
///
/// #[derive(Debug)]
/// struct LineCounter;
///
/// #[async_trait]
/// impl FileAnalyzer for LineCounter {
///     fn format(&self) -> FileFormat {
///         FileFormat::Text
///     }
///
///     fn name(&self) -> &str {
///         "line_counter"
///     }
///
///     async fn summarize(&self, path: &Path) -> Result<Summary> {
///         let content = tokio::fs::read_to_string(path).await?;
///         Ok(Summary::Text(TextSummary {
///             row_count: content.lines().count(),
///             unique_values: vec![],
///             unique_characters: String::new(),
///             emails: vec![],
///             phones: vec![],
///         }))
///     }
/// }
/// ```
#[async_trait]
pub trait FileAnalyzer: Send + Sync + Debug {
    /// The format this analyzer understands.
    fn format(&self) -> FileFormat;

    /// Returns the name of this analyzer.
    fn name(&self) -> &str;

    /// Returns a description of what this analyzer computes.
    fn description(&self) -> &str {
        ""
    }

    /// Reads `path` and produces its summary.
    async fn summarize(&self, path: &Path) -> Result<Summary>;
}
