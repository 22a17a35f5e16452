//! Suffix-based dispatch of files to their analyzers.
//!
//! The [`Dispatcher`] owns one analyzer per supported format and a shared
//! [`SummaryMetrics`] registry. Files with an unknown suffix produce
//! [`DispatchOutcome::Unsupported`] instead of an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use term_summary::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let dispatcher = Dispatcher::with_config(SummaryConfig::default().with_max_concurrency(4))?;
//!
//! let outcome = dispatcher.dispatch("uploads/sales.csv").await?;
//! println!("{outcome}");
//!
//! let outcomes = dispatcher
//!     .dispatch_many(&["uploads/a.json", "uploads/notes.txt", "uploads/report.pdf"])
//!     .await;
//! assert_eq!(outcomes.len(), 3);
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::analyzers::{FileAnalyzer, FileFormat, RecordAnalyzer, TabularAnalyzer, TextAnalyzer};
use crate::config::SummaryConfig;
use crate::error::{ErrorContext, Result};
use crate::metrics::{Outcome, SummaryMetrics};
use crate::security::validate_upload_name;
use crate::summary::DispatchOutcome;

/// Routes files to the analyzer matching their suffix.
#[derive(Debug)]
pub struct Dispatcher {
    config: SummaryConfig,
    tabular: TabularAnalyzer,
    record: RecordAnalyzer,
    text: TextAnalyzer,
    metrics: Arc<SummaryMetrics>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::from_valid_config(SummaryConfig::default())
    }
}

impl Dispatcher {
    /// Creates a dispatcher with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher after validating `config`.
    pub fn with_config(config: SummaryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: SummaryConfig) -> Self {
        Self {
            tabular: TabularAnalyzer::from_config(&config),
            record: RecordAnalyzer::from_config(&config),
            text: TextAnalyzer::from_config(&config),
            metrics: Arc::new(SummaryMetrics::new()),
            config,
        }
    }

    /// Replaces the metrics registry, e.g. to share one across dispatchers.
    pub fn with_metrics(mut self, metrics: Arc<SummaryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<SummaryMetrics> {
        &self.metrics
    }

    /// Returns the analyzer responsible for `format`.
    pub fn analyzer_for(&self, format: FileFormat) -> &dyn FileAnalyzer {
        match format {
            FileFormat::Csv => &self.tabular,
            FileFormat::Json => &self.record,
            FileFormat::Text => &self.text,
        }
    }

    /// Summarizes one file, selecting the analyzer by suffix.
    ///
    /// Unknown suffixes yield [`DispatchOutcome::Unsupported`]; analyzer
    /// failures are returned unchanged. Every call is recorded in the metrics.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn dispatch(&self, path: impl AsRef<Path>) -> Result<DispatchOutcome> {
        let path = path.as_ref();
        let started = Instant::now();
        let _in_flight = self.metrics.start_request();
        let format = FileFormat::from_path(path);

        let result = match format {
            Some(format) => {
                let analyzer = self.analyzer_for(format);
                info!(format = %format, analyzer = analyzer.name(), "Dispatching file");
                analyzer
                    .summarize(path)
                    .await
                    .map(DispatchOutcome::Summary)
            }
            None => {
                info!("Unsupported file format");
                Ok(DispatchOutcome::Unsupported)
            }
        };

        let outcome = match &result {
            Ok(DispatchOutcome::Unsupported) => Outcome::Unsupported,
            Ok(DispatchOutcome::Summary(_)) => Outcome::Ok,
            Err(e) => {
                warn!(error = %e, "Summarization failed");
                Outcome::Error
            }
        };
        self.metrics.record(format, outcome, started.elapsed());

        result
    }

    /// Summarizes several files concurrently, keeping input order.
    ///
    /// At most `max_concurrency` files are in progress at once. Each file gets
    /// its own result; one failure does not affect the others.
    #[instrument(skip(self, paths), fields(files = paths.len()))]
    pub async fn dispatch_many<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<Result<DispatchOutcome>> {
        stream::iter(paths.iter().map(|path| self.dispatch(path.as_ref())))
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await
    }

    /// Stores uploaded bytes under the upload directory and summarizes them.
    ///
    /// The client-supplied name is sanitized first; a name with no usable
    /// characters fails with a security error and nothing is written.
    #[instrument(skip(self, contents), fields(upload.name = %file_name, upload.bytes = contents.len()))]
    pub async fn dispatch_upload(&self, file_name: &str, contents: &[u8]) -> Result<DispatchOutcome> {
        let stored = self.store_upload(file_name, contents).await?;
        self.dispatch(&stored).await
    }

    async fn store_upload(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
        let name = validate_upload_name(file_name)?;
        let dir = &self.config.upload_dir;

        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;

        let path = dir.join(&name);
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("Failed to store upload {}", path.display()))?;

        info!(stored = %path.display(), "Upload stored");
        Ok(path)
    }
}
