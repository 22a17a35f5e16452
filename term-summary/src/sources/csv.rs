//! CSV file source backed by DataFusion.

use crate::prelude::*;
use datafusion::arrow::datatypes::Schema;
use datafusion::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Cells matching this pattern are read as null: the empty cell plus the
/// usual missing-value tokens (`NA`, `N/A`, `NaN`, `null`, `None`, ...).
pub const DEFAULT_NULL_REGEX: &str = r"^(?:|#N/A|#N/A N/A|#NA|-1\.#IND|-1\.#QNAN|-NaN|-nan|1\.#IND|1\.#QNAN|<NA>|N/A|NA|NULL|NaN|None|n/a|nan|null)$";

/// Options for configuring CSV file reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Escape character (default: None)
    pub escape: Option<u8>,
    /// Comment prefix (lines starting with this are ignored)
    pub comment: Option<u8>,
    /// Whether quoted values may span several lines
    pub newlines_in_values: bool,
    /// Maximum records read for schema inference
    ///
    /// Defaults to every record, so a column is numeric only when all of its
    /// non-null values parse as numbers.
    pub schema_infer_max_records: usize,
    /// Cells matching this regex are null; `None` treats only empty cells as null
    pub null_regex: Option<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            newlines_in_values: true,
            schema_infer_max_records: usize::MAX,
            null_regex: Some(DEFAULT_NULL_REGEX.to_string()),
        }
    }
}

impl CsvOptions {
    /// Tab separated values.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Sets the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Limits how many records schema inference reads.
    pub fn with_schema_infer_max_records(mut self, max: usize) -> Self {
        self.schema_infer_max_records = max;
        self
    }

    /// Sets the null pattern; `None` treats only empty cells as null.
    pub fn with_null_regex(mut self, pattern: Option<String>) -> Self {
        self.null_regex = pattern;
        self
    }
}

/// A single delimited file registered as a DataFusion table.
///
/// # Examples
///
/// ```rust,no_run
/// use datafusion::prelude::SessionContext;
/// use term_summary::sources::{CsvOptions, CsvSource};
///
/// # async fn example() -> term_summary::prelude::Result<()> {
/// let source = CsvSource::new("uploads/sales.csv");
/// let ctx = SessionContext::new();
/// let schema = source.register(&ctx, "data").await?;
/// println!("{} columns", schema.fields().len());
///
/// let tsv = CsvSource::with_options("uploads/sales.tsv", CsvOptions::tsv());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a CSV source with default options.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: CsvOptions::default(),
        }
    }

    /// Creates a CSV source with custom options.
    pub fn with_options(path: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the reading options.
    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// Extension DataFusion should accept for this file, including the dot.
    fn file_extension(&self) -> String {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }

    /// Registers the file as `table_name` and returns its inferred schema.
    ///
    /// Malformed input (ragged rows, undecodable bytes, values that contradict
    /// the inferred schema) fails with a `csv` parse error.
    #[instrument(skip(self, ctx), fields(
        table.name = %table_name,
        source.type = "csv",
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    pub async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<Arc<Schema>> {
        info!(
            table.name = %table_name,
            source.path = %self.path.display(),
            "Registering CSV data source"
        );

        let path = self.path.to_str().ok_or_else(|| {
            SummaryError::Configuration("Path contains invalid UTF-8".to_string())
        })?;
        let extension = self.file_extension();

        let mut csv_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .newlines_in_values(self.options.newlines_in_values)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .null_regex(self.options.null_regex.clone())
            .file_extension(&extension);

        if let Some(escape) = self.options.escape {
            csv_options = csv_options.escape(escape);
        }
        if let Some(comment) = self.options.comment {
            csv_options = csv_options.comment(comment);
        }

        ctx.register_csv(table_name, path, csv_options)
            .await
            .map_err(|e| SummaryError::parse_with_source("csv", e))?;

        let df = ctx
            .table(table_name)
            .await
            .map_err(|e| SummaryError::parse_with_source("csv", e))?;
        let schema = df.schema().inner().clone();

        debug!(
            table.name = %table_name,
            columns = schema.fields().len(),
            "CSV data source registered successfully"
        );

        Ok(schema)
    }

    /// Returns a human-readable description of this source.
    pub fn description(&self) -> String {
        format!("CSV file: {}", self.path.display())
    }
}
