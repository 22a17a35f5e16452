//! Record analyzer for JSON documents shaped as an object of arrays.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::analyzers::stats::{round_to, NumericStats};
use crate::analyzers::{FileAnalyzer, FileFormat};
use crate::config::{
    StdDevConvention, SummaryConfig, TypeInferenceMode, DEFAULT_MAX_NESTING_DEPTH,
    DEFAULT_RECORD_STD_DEV,
};
use crate::error::{Result, SummaryError};
use crate::sources::JsonSource;
use crate::summary::{
    DatasetSummary, Measure, MeasureNaming, MetricValue, ScalarValue, StatisticalMeasures, Summary,
};

/// Decimal places kept on every record aggregate.
const DECIMALS: usize = 2;

/// Numeric class of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    NonNumeric,
}

/// Analyzer for JSON objects mapping field names to arrays of values.
#[derive(Debug, Clone)]
pub struct RecordAnalyzer {
    type_inference: TypeInferenceMode,
    std_dev: StdDevConvention,
    max_nesting_depth: usize,
    max_file_size: Option<u64>,
}

impl Default for RecordAnalyzer {
    fn default() -> Self {
        Self {
            type_inference: TypeInferenceMode::default(),
            std_dev: DEFAULT_RECORD_STD_DEV,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_file_size: None,
        }
    }
}

impl RecordAnalyzer {
    /// Creates a record analyzer with first-sample inference and population std.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record analyzer from the shared configuration.
    pub fn from_config(config: &SummaryConfig) -> Self {
        Self {
            type_inference: config.type_inference,
            std_dev: config.record_std_dev,
            max_nesting_depth: config.max_nesting_depth,
            max_file_size: config.max_file_size,
        }
    }

    /// Sets how fields are classified as numeric.
    pub fn with_type_inference(mut self, mode: TypeInferenceMode) -> Self {
        self.type_inference = mode;
        self
    }

    /// Sets the standard deviation convention.
    pub fn with_std_dev(mut self, convention: StdDevConvention) -> Self {
        self.std_dev = convention;
        self
    }

    /// Sets the deepest container level walked for unique values.
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Summarizes an already parsed document.
    ///
    /// The top level must be an object; anything else is a `json` parse error.
    pub fn summarize_value(&self, document: &Value) -> Result<DatasetSummary> {
        let Value::Object(fields) = document else {
            return Err(SummaryError::parse(
                "json",
                format!(
                    "top-level value must be an object, found {}",
                    json_type_name(document)
                ),
            ));
        };

        let unique_values = collect_unique_values(document, self.max_nesting_depth)?;
        let statistical_measures = self.field_measures(fields)?;

        Ok(DatasetSummary {
            row_count: fields.len(),
            unique_values,
            columns: fields.keys().cloned().collect(),
            statistical_measures,
        })
    }

    fn field_measures(&self, fields: &Map<String, Value>) -> Result<StatisticalMeasures> {
        let mut measures = StatisticalMeasures::new(MeasureNaming::Record);

        for (name, value) in fields {
            if classify_field(value, self.type_inference) == FieldKind::NonNumeric {
                debug!(field = %name, "Skipping non-numeric field");
                continue;
            }

            let values = numeric_values(name, value)?;
            let Some(stats) = NumericStats::compute(&values, self.std_dev) else {
                continue;
            };

            let rounded = |v: f64| MetricValue::Double(round_to(v, DECIMALS));
            measures.insert(Measure::Sum, name.as_str(), rounded(stats.sum));
            measures.insert(Measure::Average, name.as_str(), rounded(stats.mean));
            measures.insert(Measure::Max, name.as_str(), rounded(stats.max));
            measures.insert(Measure::Min, name.as_str(), rounded(stats.min));
            measures.insert(Measure::Median, name.as_str(), rounded(stats.median));
            if let Some(std) = stats.std_dev {
                measures.insert(Measure::Std, name.as_str(), rounded(std));
            }
        }

        Ok(measures)
    }
}

#[async_trait]
impl FileAnalyzer for RecordAnalyzer {
    fn format(&self) -> FileFormat {
        FileFormat::Json
    }

    fn name(&self) -> &str {
        "record"
    }

    fn description(&self) -> &str {
        "Summarizes JSON objects of arrays: keys, unique scalars and rounded field statistics"
    }

    #[instrument(skip(self), fields(analyzer = "record", path = %path.display()))]
    async fn summarize(&self, path: &Path) -> Result<Summary> {
        let document = JsonSource::new(path).load(self.max_file_size).await?;
        let summary = self.summarize_value(&document)?;

        info!(
            fields = summary.row_count,
            numeric_fields = summary.statistical_measures.columns().len(),
            unique_values = summary.unique_values.len(),
            "Record summary computed"
        );
        Ok(Summary::Dataset(summary))
    }
}

/// Collects every leaf scalar reachable from `root` into one set.
///
/// `root` itself is at depth 1 when it is a container; each nested array or
/// object adds one. Exceeding `max_depth` fails with
/// [`SummaryError::NestingTooDeep`]. Object keys are not collected.
pub fn collect_unique_values(root: &Value, max_depth: usize) -> Result<BTreeSet<ScalarValue>> {
    let mut unique = BTreeSet::new();
    let mut pending: Vec<(&Value, usize)> = vec![(root, 1)];

    while let Some((value, depth)) = pending.pop() {
        let children: Box<dyn Iterator<Item = &Value>> = match value {
            Value::Array(items) => Box::new(items.iter()),
            Value::Object(map) => Box::new(map.values()),
            leaf => {
                if let Some(scalar) = ScalarValue::from_json(leaf) {
                    unique.insert(scalar);
                }
                continue;
            }
        };

        if depth > max_depth {
            return Err(SummaryError::NestingTooDeep { limit: max_depth });
        }
        pending.extend(children.map(|child| (child, depth + 1)));
    }

    Ok(unique)
}

/// Classifies a field value under the given inference mode.
///
/// Only non-empty arrays can be numeric. `FirstSample` looks at the first
/// element alone; `Strict` requires every element to be a number.
pub fn classify_field(value: &Value, mode: TypeInferenceMode) -> FieldKind {
    let Value::Array(items) = value else {
        return FieldKind::NonNumeric;
    };

    let numeric = match mode {
        TypeInferenceMode::FirstSample => items.first().is_some_and(Value::is_number),
        TypeInferenceMode::Strict => !items.is_empty() && items.iter().all(Value::is_number),
    };

    if numeric {
        FieldKind::Numeric
    } else {
        FieldKind::NonNumeric
    }
}

/// Converts the elements of a numeric field to floats.
///
/// Booleans count as 1 and 0; any other non-number fails with a type
/// mismatch naming the field.
fn numeric_values(field: &str, value: &Value) -> Result<Vec<f64>> {
    let Value::Array(items) = value else {
        return Err(SummaryError::type_mismatch(field, "array", json_type_name(value)));
    };

    items
        .iter()
        .map(|item| match item {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| SummaryError::type_mismatch(field, "number", n.to_string())),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(SummaryError::type_mismatch(field, "number", json_type_name(other))),
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
