//! Common imports for working with term-summary.

pub use crate::analyzers::{FileAnalyzer, FileFormat};
pub use crate::config::{StdDevConvention, SummaryConfig, TypeInferenceMode};
pub use crate::dispatcher::Dispatcher;
pub use crate::error::{ErrorContext, Result, SummaryError};
pub use crate::formatters::{FormatterConfig, SummaryFormatter};
pub use crate::summary::{DispatchOutcome, Summary};
