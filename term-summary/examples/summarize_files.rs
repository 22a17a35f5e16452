//! Summarizes a small generated data set in every supported format.
//!
//! Run with `cargo run --example summarize_files`.

use term_summary::formatters::HumanFormatter;
use term_summary::logging::setup::{init_logging, LoggingConfig};
use term_summary::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default())?;

    let dir = tempfile::tempdir()?;
    let files = [
        ("orders.csv", "order_id,amount,region\n1,19.99,north\n2,5.50,south\n3,42.00,north\n"),
        ("readings.json", r#"{"sensor": ["a", "b", "a"], "celsius": [21.5, 22.0, 19.25]}"#),
        ("contacts.txt", "Reach sales at sales@example.com\nor call +48 555 123 456\n"),
        ("slides.pptx", "not summarized"),
    ];

    let dispatcher = Dispatcher::with_config(SummaryConfig::default().with_upload_dir(dir.path()))?;
    let formatter = HumanFormatter::new();

    for (name, contents) in files {
        let outcome = dispatcher.dispatch_upload(name, contents.as_bytes()).await?;
        println!("==> {name} <==");
        println!("{}", formatter.format(&outcome)?);
    }

    print!("{}", dispatcher.metrics().render_prometheus()?);
    Ok(())
}
