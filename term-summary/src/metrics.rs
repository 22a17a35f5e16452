//! Request metrics for the dispatcher.
//!
//! Counters and the latency histogram are `prometheus-client` instruments held
//! in one [`Registry`], so a [`SummaryMetrics`] can be shared behind an `Arc`
//! by concurrent dispatches. [`SummaryMetrics::render_prometheus`] encodes the
//! registry in the text exposition format:
//!
//! ```text
//! # TYPE summary_requests counter
//! summary_requests_total{format="csv",outcome="ok"} 3
//! # TYPE summary_request_latency_seconds histogram
//! summary_request_latency_seconds_bucket{le="0.005"} 1
//! ...
//! ```

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue, LabelValueEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;
use std::fmt::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::analyzers::FileFormat;
use crate::error::{Result, SummaryError};

/// Upper bounds of the latency histogram buckets, in seconds.
pub const LATENCY_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

const FORMAT_LABELS: [&str; 4] = ["csv", "json", "txt", "other"];

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ok,
    Unsupported,
    Error,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Ok, Outcome::Unsupported, Outcome::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Unsupported => "unsupported",
            Outcome::Error => "error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EncodeLabelValue for Outcome {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> std::result::Result<(), fmt::Error> {
        encoder.write_str(self.as_str())
    }
}

fn format_label(format: Option<FileFormat>) -> &'static str {
    match format {
        Some(FileFormat::Csv) => FORMAT_LABELS[0],
        Some(FileFormat::Json) => FORMAT_LABELS[1],
        Some(FileFormat::Text) => FORMAT_LABELS[2],
        None => FORMAT_LABELS[3],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EncodeLabelSet)]
struct RequestLabels {
    format: &'static str,
    outcome: Outcome,
}

/// Request counters by format and outcome plus a latency histogram.
///
/// Every format/outcome series exists from construction, so the exposition
/// reports zeros instead of omitting labels that have not been seen yet.
#[derive(Debug)]
pub struct SummaryMetrics {
    registry: Registry,
    requests: Family<RequestLabels, Counter>,
    latency: Histogram,
    in_flight: Arc<AtomicU64>,
}

impl Default for SummaryMetrics {
    fn default() -> Self {
        let requests = Family::<RequestLabels, Counter>::default();
        let latency = Histogram::new(LATENCY_BUCKETS.into_iter());

        for format in FORMAT_LABELS {
            for outcome in Outcome::ALL {
                requests.get_or_create(&RequestLabels { format, outcome });
            }
        }

        let mut registry = Registry::default();
        registry.register(
            "summary_requests",
            "Summarize requests by format and outcome",
            requests.clone(),
        );
        registry.register(
            "summary_request_latency_seconds",
            "Summarize request latency in seconds",
            latency.clone(),
        );

        Self {
            registry,
            requests,
            latency,
            in_flight: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl SummaryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished request.
    pub fn record(&self, format: Option<FileFormat>, outcome: Outcome, elapsed: Duration) {
        self.requests
            .get_or_create(&RequestLabels {
                format: format_label(format),
                outcome,
            })
            .inc();
        self.latency.observe(elapsed.as_secs_f64());
    }

    /// Marks a request as in flight until the guard is dropped.
    pub fn start_request(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            counter: Arc::clone(&self.in_flight),
        }
    }

    /// Number of requests currently being summarized.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Requests recorded for one format and outcome; `None` is the unsupported bucket.
    pub fn request_count(&self, format: Option<FileFormat>, outcome: Outcome) -> u64 {
        self.requests
            .get_or_create(&RequestLabels {
                format: format_label(format),
                outcome,
            })
            .get()
    }

    /// Requests recorded across all labels.
    pub fn total_requests(&self) -> u64 {
        FORMAT_LABELS
            .into_iter()
            .flat_map(|format| {
                Outcome::ALL.into_iter().map(move |outcome| RequestLabels {
                    format,
                    outcome,
                })
            })
            .map(|labels| self.requests.get_or_create(&labels).get())
            .sum()
    }

    /// Renders all metrics in the Prometheus text exposition format.
    pub fn render_prometheus(&self) -> Result<String> {
        let mut out = String::new();
        encode(&mut out, &self.registry)
            .map_err(|e| SummaryError::Internal(format!("Failed to encode metrics: {e}")))?;
        Ok(out)
    }
}

/// Decrements the in-flight gauge when dropped.
pub struct InFlightGuard {
    counter: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
    }
}
