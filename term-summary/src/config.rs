//! Configuration for the summarization engine.

use std::path::PathBuf;

use crate::sources::CsvOptions;

/// How record fields are classified as numeric or non-numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeInferenceMode {
    /// Classify a field by its first element only.
    ///
    /// A field whose first element is a number is numeric even when later
    /// elements are not. This reproduces the historical output of the tool.
    #[default]
    FirstSample,
    /// Classify a field as numeric only when every element is a number.
    Strict,
}

/// Denominator convention for standard deviation.
///
/// Tabular statistics default to [`Sample`](Self::Sample) and record
/// statistics to [`Population`](Self::Population).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdDevConvention {
    /// Population standard deviation (denominator N).
    Population,
    /// Sample standard deviation (denominator N - 1).
    Sample,
}

impl StdDevConvention {
    /// Name of the DataFusion aggregate implementing this convention.
    pub fn sql_function(&self) -> &'static str {
        match self {
            Self::Population => "stddev_pop",
            Self::Sample => "stddev_samp",
        }
    }
}

impl std::str::FromStr for StdDevConvention {
    type Err = crate::error::SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "population" | "pop" => Ok(Self::Population),
            "sample" | "samp" => Ok(Self::Sample),
            other => Err(crate::error::SummaryError::Configuration(format!(
                "Unknown standard deviation convention '{other}' (expected 'population' or 'sample')"
            ))),
        }
    }
}

/// Default convention for tabular statistics.
pub const DEFAULT_TABULAR_STD_DEV: StdDevConvention = StdDevConvention::Sample;

/// Default convention for record statistics.
pub const DEFAULT_RECORD_STD_DEV: StdDevConvention = StdDevConvention::Population;

/// Default traversal depth for nested record input.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Configuration shared by the dispatcher and every analyzer.
///
/// # Examples
///
/// ```rust
/// use term_summary::config::{StdDevConvention, SummaryConfig, TypeInferenceMode};
///
/// let config = SummaryConfig::default()
///     .with_type_inference(TypeInferenceMode::Strict)
///     .with_std_dev(StdDevConvention::Sample)
///     .with_max_file_size(16 * 1024 * 1024);
///
/// assert_eq!(config.max_file_size, Some(16 * 1024 * 1024));
/// ```
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Options used when reading delimited files
    pub csv: CsvOptions,
    /// Field classification for record input
    pub type_inference: TypeInferenceMode,
    /// Standard deviation convention for tabular statistics
    pub tabular_std_dev: StdDevConvention,
    /// Standard deviation convention for record statistics
    pub record_std_dev: StdDevConvention,
    /// Maximum depth walked when collecting nested record values
    pub max_nesting_depth: usize,
    /// Files above this size (in bytes) are rejected before reading
    pub max_file_size: Option<u64>,
    /// Number of files summarized at once by `Dispatcher::dispatch_many`
    pub max_concurrency: usize,
    /// Directory receiving uploaded files
    pub upload_dir: PathBuf,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            csv: CsvOptions::default(),
            type_inference: TypeInferenceMode::default(),
            tabular_std_dev: DEFAULT_TABULAR_STD_DEV,
            record_std_dev: DEFAULT_RECORD_STD_DEV,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_file_size: None,
            max_concurrency: num_cpus::get().max(1),
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

impl SummaryConfig {
    /// Sets the CSV reading options.
    pub fn with_csv_options(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    /// Sets the record field classification mode.
    pub fn with_type_inference(mut self, mode: TypeInferenceMode) -> Self {
        self.type_inference = mode;
        self
    }

    /// Uses one standard deviation convention for every analyzer.
    pub fn with_std_dev(mut self, convention: StdDevConvention) -> Self {
        self.tabular_std_dev = convention;
        self.record_std_dev = convention;
        self
    }

    pub fn with_tabular_std_dev(mut self, convention: StdDevConvention) -> Self {
        self.tabular_std_dev = convention;
        self
    }

    pub fn with_record_std_dev(mut self, convention: StdDevConvention) -> Self {
        self.record_std_dev = convention;
        self
    }

    /// Sets the maximum nesting depth for record traversal.
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Rejects files larger than `bytes`.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Sets how many files `dispatch_many` processes at once.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Sets the upload directory.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// Checks the configuration for values the engine cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.max_concurrency == 0 {
            return Err(crate::error::SummaryError::Configuration(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_nesting_depth == 0 {
            return Err(crate::error::SummaryError::Configuration(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        if self.csv.schema_infer_max_records == 0 {
            return Err(crate::error::SummaryError::Configuration(
                "schema_infer_max_records must be at least 1".to_string(),
            ));
        }
        if let Some(pattern) = &self.csv.null_regex {
            regex::Regex::new(pattern).map_err(|e| {
                crate::error::SummaryError::Configuration(format!("Invalid null_regex: {e}"))
            })?;
        }
        Ok(())
    }
}
