//! Format-specific analyzers that turn one file into a [`Summary`].
//!
//! ## Available Analyzers
//!
//! - **Tabular** (`tabular`): delimited files registered with DataFusion; SQL
//!   aggregates per numeric column, truncated to integers.
//! - **Record** (`record`): JSON objects mapping field names to arrays; values
//!   collected recursively, aggregates rounded to two decimals.
//! - **Text** (`text`): line-oriented text; emails and phone numbers extracted,
//!   token and character inventories built from what is left.
//!
//! All analyzers implement [`FileAnalyzer`] and share the output types in
//! [`crate::summary`].
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use term_summary::analyzers::{FileAnalyzer, TabularAnalyzer};
//! use std::path::Path;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let analyzer = TabularAnalyzer::new();
//! let summary = analyzer.summarize(Path::new("uploads/sales.csv")).await.unwrap();
//! println!("rows: {}", summary.row_count());
//! # })
//! ```
//!
//! [`Summary`]: crate::summary::Summary

pub mod patterns;
pub mod record;
pub mod stats;
pub mod tabular;
pub mod text;
pub mod traits;

pub use record::RecordAnalyzer;
pub use stats::NumericStats;
pub use tabular::TabularAnalyzer;
pub use text::TextAnalyzer;
pub use traits::{FileAnalyzer, FileFormat};
