//! Rendering of dispatch outcomes for callers and the command line.
//!
//! # Examples
//!
//! ```rust
//! use term_summary::formatters::{HumanFormatter, JsonFormatter, SummaryFormatter};
//! use term_summary::summary::DispatchOutcome;
//!
//! let outcome = DispatchOutcome::Unsupported;
//! assert_eq!(JsonFormatter::new().format(&outcome).unwrap(), "\"Unsupported file format\"");
//! assert_eq!(HumanFormatter::new().format(&outcome).unwrap().trim(), "Unsupported file format");
//! ```

use chrono::Utc;
use serde_json::Value;
use std::fmt::{self, Write};

use crate::logging::{truncate_field, DEFAULT_MAX_FIELD_LENGTH};
use crate::prelude::*;
use crate::summary::{DatasetSummary, Measure, TextSummary, UNSUPPORTED_FORMAT};

/// Options shared by all formatters.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Maximum number of unique values to show; `None` shows all
    pub max_values: Option<usize>,
    /// Whether to stamp output with the rendering time
    pub include_timestamps: bool,
    /// Maximum length of one rendered line of values (human output only)
    pub max_field_length: usize,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            max_values: None,
            include_timestamps: false,
            max_field_length: DEFAULT_MAX_FIELD_LENGTH,
        }
    }
}

impl FormatterConfig {
    /// Short output for terminals.
    pub fn compact() -> Self {
        Self {
            max_values: Some(20),
            include_timestamps: false,
            max_field_length: 120,
        }
    }

    pub fn with_max_values(mut self, max: usize) -> Self {
        self.max_values = Some(max);
        self
    }

    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamps = include;
        self
    }

    pub fn with_max_field_length(mut self, max: usize) -> Self {
        self.max_field_length = max;
        self
    }
}

/// Renders a [`DispatchOutcome`] as text.
///
/// # Examples
///
/// ```rust
/// use term_summary::formatters::SummaryFormatter;
/// use term_summary::summary::DispatchOutcome;
///
/// struct RowsOnly;
///
/// impl SummaryFormatter for RowsOnly {
///     fn format(&self, outcome: &DispatchOutcome) -> term_summary::prelude::Result<String> {
///         Ok(match outcome.summary() {
///             Some(summary) => format!("{} rows", summary.row_count()),
///             None => "unsupported".to_string(),
///         })
///     }
/// }
/// ```
pub trait SummaryFormatter {
    /// Formats an outcome with the formatter's own configuration.
    fn format(&self, outcome: &DispatchOutcome) -> Result<String>;

    /// Formats an outcome with explicit configuration.
    fn format_with_config(
        &self,
        outcome: &DispatchOutcome,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(outcome)
    }
}

/// Renders outcomes as JSON in the documented output shapes.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryFormatter for JsonFormatter {
    fn format(&self, outcome: &DispatchOutcome) -> Result<String> {
        self.format_with_config(outcome, &self.config)
    }

    fn format_with_config(
        &self,
        outcome: &DispatchOutcome,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut value = serde_json::to_value(outcome).map_err(|e| {
            SummaryError::Internal(format!("Failed to serialize summary to JSON: {e}"))
        })?;

        if let (Some(max), Some(Value::Array(values))) =
            (config.max_values, value.get_mut("unique_values"))
        {
            values.truncate(max);
        }

        if config.include_timestamps {
            value = serde_json::json!({
                "timestamp": Utc::now().to_rfc3339(),
                "result": value,
            });
        }

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        rendered.map_err(|e| SummaryError::Internal(format!("Failed to render JSON: {e}")))
    }
}

/// Renders outcomes as plain text for terminals.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl SummaryFormatter for HumanFormatter {
    fn format(&self, outcome: &DispatchOutcome) -> Result<String> {
        self.format_with_config(outcome, &self.config)
    }

    fn format_with_config(
        &self,
        outcome: &DispatchOutcome,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        render_human(&mut output, outcome, config)
            .map_err(|e| SummaryError::Internal(format!("Failed to render summary: {e}")))?;
        Ok(output)
    }
}

fn render_human(out: &mut String, outcome: &DispatchOutcome, config: &FormatterConfig) -> fmt::Result {
    if config.include_timestamps {
        writeln!(out, "Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    }

    match outcome.summary() {
        None => writeln!(out, "{UNSUPPORTED_FORMAT}"),
        Some(Summary::Dataset(summary)) => render_dataset(out, summary, config),
        Some(Summary::Text(summary)) => render_text(out, summary, config),
    }
}

fn render_dataset(out: &mut String, summary: &DatasetSummary, config: &FormatterConfig) -> fmt::Result {
    writeln!(out, "Rows: {}", summary.row_count)?;
    write_list(out, "Columns", summary.columns.iter(), summary.columns.len(), config)?;
    write_list(
        out,
        "Unique values",
        summary.unique_values.iter(),
        summary.unique_values.len(),
        config,
    )?;

    let measures = &summary.statistical_measures;
    let columns = measures.columns();
    if columns.is_empty() {
        return writeln!(out, "Statistical measures: none");
    }

    writeln!(out, "Statistical measures:")?;
    let width = columns.iter().map(|c| c.len()).max().unwrap_or(0).max(6);
    write!(out, "  {:<width$}", "column")?;
    for measure in Measure::ALL {
        write!(out, " {:>12}", measure.key(measures.naming()))?;
    }
    writeln!(out)?;

    for column in columns {
        write!(out, "  {column:<width$}")?;
        for measure in Measure::ALL {
            match measures.value(measure, column) {
                Some(value) => write!(out, " {:>12}", value.to_string())?,
                None => write!(out, " {:>12}", "-")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_text(out: &mut String, summary: &TextSummary, config: &FormatterConfig) -> fmt::Result {
    writeln!(out, "Rows: {}", summary.row_count)?;
    write_list(out, "Emails", summary.emails.iter(), summary.emails.len(), config)?;
    write_list(out, "Phones", summary.phones.iter(), summary.phones.len(), config)?;
    write_list(
        out,
        "Unique tokens",
        summary.unique_values.iter(),
        summary.unique_values.len(),
        config,
    )?;
    writeln!(
        out,
        "Unique characters: {}",
        truncate_field(&summary.unique_characters, config.max_field_length)
    )
}

/// Writes `label (n): a, b, c`, honoring `max_values` and the line length cap.
fn write_list<T: fmt::Display>(
    out: &mut String,
    label: &str,
    items: impl Iterator<Item = T>,
    total: usize,
    config: &FormatterConfig,
) -> fmt::Result {
    let shown = config.max_values.unwrap_or(total).min(total);
    let mut line = items
        .take(shown)
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if shown < total {
        write!(line, ", ... and {} more", total - shown)?;
    }
    writeln!(
        out,
        "{label} ({total}): {}",
        truncate_field(&line, config.max_field_length)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{MeasureNaming, MetricValue, ScalarValue, StatisticalMeasures};

    fn dataset_outcome() -> DispatchOutcome {
        let mut measures = StatisticalMeasures::new(MeasureNaming::Tabular);
        measures.insert(Measure::Sum, "n", MetricValue::Long(7));
        measures.insert(Measure::Average, "n", MetricValue::Long(2));

        DispatchOutcome::Summary(Summary::Dataset(DatasetSummary {
            row_count: 3,
            unique_values: [1, 2, 4].into_iter().map(ScalarValue::Int).collect(),
            columns: ["n".to_string()].into_iter().collect(),
            statistical_measures: measures,
        }))
    }

    fn text_outcome() -> DispatchOutcome {
        DispatchOutcome::Summary(Summary::Text(TextSummary {
            row_count: 1,
            unique_values: vec!["Contact".into(), "me".into()],
            unique_characters: "C a c e m n o t".into(),
            emails: vec!["a@b.com".into()],
            phones: vec![],
        }))
    }

    #[test]
    fn test_json_formatter_shape() {
        let output = JsonFormatter::new()
            .with_pretty(false)
            .format(&dataset_outcome())
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["num_rows"], 3);
        assert_eq!(value["unique_values"], serde_json::json!([1, 2, 4]));
        assert_eq!(value["statistical_measures"]["sum"]["n"], 7);
        assert_eq!(value["statistical_measures"]["std"], serde_json::json!({}));
    }

    #[test]
    fn test_json_formatter_limits_values() {
        let formatter = JsonFormatter::with_config(FormatterConfig::default().with_max_values(2));
        let value: Value = serde_json::from_str(&formatter.format(&dataset_outcome()).unwrap()).unwrap();
        assert_eq!(value["unique_values"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_json_formatter_timestamps() {
        let formatter = JsonFormatter::with_config(FormatterConfig::default().with_timestamps(true));
        let value: Value = serde_json::from_str(&formatter.format(&text_outcome()).unwrap()).unwrap();
        assert!(value["timestamp"].is_string());
        assert_eq!(value["result"]["emails"][0], "a@b.com");
    }

    #[test]
    fn test_human_formatter_dataset() {
        let output = HumanFormatter::new().format(&dataset_outcome()).unwrap();
        assert!(output.contains("Rows: 3"));
        assert!(output.contains("Columns (1): n"));
        assert!(output.contains("Unique values (3): 1, 2, 4"));
        assert!(output.contains("avg"));
        assert!(output.lines().any(|l| l.trim_start().starts_with('n') && l.contains('7')));
    }

    #[test]
    fn test_human_formatter_text() {
        let config = FormatterConfig::default().with_max_values(1);
        let output = HumanFormatter::with_config(config)
            .format(&text_outcome())
            .unwrap();
        assert!(output.contains("Emails (1): a@b.com"));
        assert!(output.contains("Phones (0): "));
        assert!(output.contains("Unique tokens (2): Contact, ... and 1 more"));
        assert!(output.contains("Unique characters: C a c e m n o t"));
    }
}
