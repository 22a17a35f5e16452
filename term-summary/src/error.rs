//! Error types for the term-summary engine.
//!
//! All failures raised while loading or summarizing a file are represented by
//! the [`SummaryError`] enum. The engine never retries and never returns a
//! partial summary: the first failure is propagated to the caller.

use thiserror::Error;

/// The main error type for the summarization engine.
#[derive(Error, Debug)]
pub enum SummaryError {
    /// The input could not be parsed in its declared format.
    #[error("Parse error ({format}): {message}")]
    Parse {
        /// Declared format of the input (e.g., "csv", "json")
        format: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from I/O operations (missing file, permissions, invalid UTF-8).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from DataFusion operations not attributable to parsing.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A field classified as numeric holds a value that cannot be aggregated.
    #[error("Type mismatch in field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// Nested input exceeds the configured traversal depth.
    #[error("Nesting depth exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },

    /// The input file is larger than the configured limit.
    #[error("File '{path}' is {size} bytes, above the limit of {limit} bytes")]
    FileTooLarge { path: String, size: u64, limit: u64 },

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Security-related error (e.g., an upload name that sanitizes to nothing).
    #[error("Security error: {0}")]
    Security(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, SummaryError>`.
pub type Result<T> = std::result::Result<T, SummaryError>;

impl SummaryError {
    /// Creates a parse error for the given format.
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a parse error that keeps the underlying error as its source.
    pub fn parse_with_source(
        format: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Parse {
            format: format.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a type mismatch error for a record field.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Returns true for malformed-input failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Returns true for read failures.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<SummaryError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            // Keep the variant so callers can still tell parse and read failures apart.
            SummaryError::Parse {
                format,
                message,
                source,
            } => SummaryError::Parse {
                format,
                message: format!("{}: {message}", f()),
                source,
            },
            SummaryError::Io(inner) => {
                SummaryError::Io(std::io::Error::new(inner.kind(), format!("{}: {inner}", f())))
            }
            SummaryError::Internal(inner) => SummaryError::Internal(format!("{}: {inner}", f())),
            other => SummaryError::Internal(format!("{}: {other}", f())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_parse_error_display() {
        let err = SummaryError::parse("csv", "unequal row lengths");
        assert_eq!(err.to_string(), "Parse error (csv): unequal row lengths");
        assert!(err.is_parse());
        assert!(!err.is_io());
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SummaryError::parse_with_source("json", json_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = SummaryError::type_mismatch("price", "number", "string");
        assert_eq!(
            err.to_string(),
            "Type mismatch in field 'price': expected number, found string"
        );
    }

    #[test]
    fn test_context_preserves_io_kind() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = result.context("Reading upload").unwrap_err();
        match err {
            SummaryError::Io(inner) => {
                assert_eq!(inner.kind(), std::io::ErrorKind::NotFound);
                assert!(inner.to_string().contains("Reading upload"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_context_preserves_parse_variant() {
        let result: Result<()> = Err(SummaryError::parse("json", "bad token"));
        let err = result.context("Loading records").unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("Loading records: bad token"));
    }
}
