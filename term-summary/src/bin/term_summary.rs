//! term-summary command line
//!
//! Summarizes one or more files and prints the results as JSON or text.
//!
//! ```text
//! term-summary data/*.csv notes.txt --output human
//! term-summary records.json --compact --strict-types --std-dev sample
//! ```

use clap::{Parser, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use term_summary::formatters::{HumanFormatter, JsonFormatter};
use term_summary::logging::setup::{init_logging, LoggingConfig};
use term_summary::prelude::*;
use tracing::{warn, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Human,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to summarize; glob patterns are expanded
    #[arg(required = true)]
    paths: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// Single-line JSON, or shortened value lists for human output
    #[arg(long)]
    compact: bool,

    /// Treat a record field as numeric only when every element is a number
    #[arg(long)]
    strict_types: bool,

    /// Standard deviation convention for every format: population or sample
    /// [default: sample for CSV, population for JSON]
    #[arg(long)]
    std_dev: Option<StdDevConvention>,

    /// Reject files larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_file_size: Option<u64>,

    /// Files summarized at the same time
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level for term-summary events
    #[arg(long, default_value = "warn")]
    log_level: Level,

    /// Print request metrics in Prometheus format after the results
    #[arg(long)]
    metrics: bool,
}

impl Args {
    fn summary_config(&self) -> SummaryConfig {
        let mut config = SummaryConfig::default();
        if let Some(convention) = self.std_dev {
            config = config.with_std_dev(convention);
        }
        if self.strict_types {
            config = config.with_type_inference(TypeInferenceMode::Strict);
        }
        if let Some(bytes) = self.max_file_size {
            config = config.with_max_file_size(bytes);
        }
        if let Some(max) = self.max_concurrency {
            config = config.with_max_concurrency(max);
        }
        config
    }

    fn formatter(&self) -> Box<dyn SummaryFormatter> {
        match (self.output, self.compact) {
            (OutputFormat::Json, compact) => Box::new(JsonFormatter::new().with_pretty(!compact)),
            (OutputFormat::Human, true) => {
                Box::new(HumanFormatter::with_config(FormatterConfig::compact()))
            }
            (OutputFormat::Human, false) => Box::new(HumanFormatter::new()),
        }
    }
}

/// Expands glob patterns; patterns without matches are kept as literal paths.
fn expand_paths(patterns: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matches: Vec<PathBuf> = match glob::glob(pattern) {
            Ok(entries) => entries.filter_map(|entry| entry.ok()).collect(),
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Invalid glob pattern");
                Vec::new()
            }
        };
        if matches.is_empty() {
            paths.push(PathBuf::from(pattern));
        } else {
            paths.extend(matches);
        }
    }
    paths
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_logging(
        LoggingConfig::default()
            .with_crate_level(args.log_level)
            .with_json_format(args.json_logs),
    )?;

    let dispatcher = Dispatcher::with_config(args.summary_config())?;
    let formatter = args.formatter();
    let paths = expand_paths(&args.paths);

    let results = dispatcher.dispatch_many(&paths).await;
    let mut failures = 0;

    if args.output == OutputFormat::Json && paths.len() > 1 {
        let mut entries = Vec::with_capacity(paths.len());
        for (path, result) in paths.iter().zip(&results) {
            let path = path.display().to_string();
            entries.push(match result {
                Ok(outcome) => json!({ "path": path, "result": outcome }),
                Err(e) => {
                    failures += 1;
                    json!({ "path": path, "error": e.to_string() })
                }
            });
        }
        let rendered = if args.compact {
            serde_json::to_string(&entries)?
        } else {
            serde_json::to_string_pretty(&entries)?
        };
        println!("{rendered}");
    } else {
        for (path, result) in paths.iter().zip(&results) {
            if paths.len() > 1 {
                println!("==> {} <==", path.display());
            }
            match result {
                Ok(outcome) => println!("{}", formatter.format(outcome)?),
                Err(e) => {
                    failures += 1;
                    eprintln!("error: {}: {e}", path.display());
                }
            }
        }
    }

    if args.metrics {
        print!("{}", dispatcher.metrics().render_prometheus()?);
    }

    if failures > 0 {
        process::exit(1);
    }
    Ok(())
}
