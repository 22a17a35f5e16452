//! # term-summary - structural summaries of data files
//!
//! term-summary reads a data file and describes it: how many rows it holds,
//! which columns or fields it has, which distinct values occur, and per-column
//! numeric aggregates. Free text gets token and character inventories plus the
//! email addresses and phone numbers found in it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use term_summary::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new();
//!
//! match dispatcher.dispatch("uploads/sales.csv").await? {
//!     DispatchOutcome::Summary(summary) => println!("{} rows", summary.row_count()),
//!     DispatchOutcome::Unsupported => println!("Unsupported file format"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Formats
//!
//! The analyzer is chosen by file suffix:
//!
//! | Suffix  | Analyzer                                    | Aggregates                 |
//! |---------|---------------------------------------------|----------------------------|
//! | `.csv`  | [`TabularAnalyzer`](analyzers::TabularAnalyzer) | truncated to integers  |
//! | `.json` | [`RecordAnalyzer`](analyzers::RecordAnalyzer)   | rounded to 2 decimals  |
//! | `.txt`  | [`TextAnalyzer`](analyzers::TextAnalyzer)       | none                   |
//!
//! Any other suffix yields [`DispatchOutcome::Unsupported`](summary::DispatchOutcome),
//! which renders as the string `"Unsupported file format"`.
//!
//! ## Output
//!
//! Summaries serialize with `serde` into the shapes consumed by existing
//! clients, e.g. for a CSV file:
//!
//! ```json
//! {
//!   "num_rows": 3,
//!   "unique_values": [1, 2, 4],
//!   "columns": ["n"],
//!   "statistical_measures": {
//!     "sum": {"n": 7}, "avg": {"n": 2}, "max": {"n": 4},
//!     "min": {"n": 1}, "median": {"n": 2}, "std": {"n": 1}
//!   }
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`analyzers`**: the three format analyzers and the [`FileAnalyzer`](analyzers::FileAnalyzer) trait
//! - **`sources`**: file loaders (DataFusion CSV registration, JSON documents, text)
//! - **`dispatcher`**: suffix routing, batch and upload dispatch
//! - **`summary`**: output types
//! - **`metrics`**: request counters and latency histogram
//! - **`formatters`**: JSON and human-readable rendering
//! - **`logging`**: `tracing` subscriber setup

pub mod analyzers;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod metrics;
pub mod prelude;
pub mod security;
pub mod sources;
pub mod summary;
