//! Summary types shared by every analyzer.
//!
//! A [`Summary`] is either a [`DatasetSummary`] (tabular and record input) or a
//! [`TextSummary`] (free text). The serialized key set is part of the external
//! contract consumed by renderers:
//!
//! - tabular: `num_rows`, `unique_values`, `columns`, `statistical_measures`
//!   with measures `sum, avg, max, min, median, std`
//! - record: identical, except the average is keyed `average`
//! - text: `num_rows`, `unique_values`, `unique_characters`, `emails`, `phones`

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Sentinel returned instead of a summary for unrecognized file suffixes.
pub const UNSUPPORTED_FORMAT: &str = "Unsupported file format";

/// A single aggregate value.
///
/// Tabular statistics are truncated integers (`Long`), record statistics are
/// floats rounded to two decimals (`Double`). Both serialize as bare numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// An integer metric value.
    Long(i64),
    /// A floating-point metric value.
    Double(f64),
}

impl MetricValue {
    /// Returns the value as f64.
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Long(v) => *v as f64,
            MetricValue::Double(v) => *v,
        }
    }

    /// Returns the value as i64 when it has no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetricValue::Long(v) => Some(*v),
            MetricValue::Double(v) => {
                if v.fract() == 0.0 {
                    Some(*v as i64)
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Long(v) => write!(f, "{v}"),
            MetricValue::Double(v) => {
                if v.fract() == 0.0 {
                    write!(f, "{v:.0}")
                } else {
                    write!(f, "{v}")
                }
            }
        }
    }
}

/// The statistical measures reported for numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Measure {
    Sum,
    Average,
    Max,
    Min,
    Median,
    Std,
}

impl Measure {
    /// All measures in the order they are reported.
    pub const ALL: [Measure; 6] = [
        Measure::Sum,
        Measure::Average,
        Measure::Max,
        Measure::Min,
        Measure::Median,
        Measure::Std,
    ];

    /// Output key of this measure under the given naming.
    pub fn key(&self, naming: MeasureNaming) -> &'static str {
        match self {
            Measure::Sum => "sum",
            Measure::Average => match naming {
                MeasureNaming::Tabular => "avg",
                MeasureNaming::Record => "average",
            },
            Measure::Max => "max",
            Measure::Min => "min",
            Measure::Median => "median",
            Measure::Std => "std",
        }
    }
}

/// Key naming used when serializing measures.
///
/// Tabular output names the average `avg`; record output names it `average`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureNaming {
    Tabular,
    Record,
}

/// Measure name -> (column name -> value).
///
/// Every measure key is serialized, even when no column is numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticalMeasures {
    naming: MeasureNaming,
    values: BTreeMap<Measure, BTreeMap<String, MetricValue>>,
}

impl StatisticalMeasures {
    /// Creates an empty set of measures.
    pub fn new(naming: MeasureNaming) -> Self {
        Self {
            naming,
            values: Measure::ALL
                .iter()
                .map(|m| (*m, BTreeMap::new()))
                .collect(),
        }
    }

    /// Records a value for one column.
    pub fn insert(&mut self, measure: Measure, column: impl Into<String>, value: MetricValue) {
        self.values
            .entry(measure)
            .or_default()
            .insert(column.into(), value);
    }

    /// Returns the naming used for output keys.
    pub fn naming(&self) -> MeasureNaming {
        self.naming
    }

    /// Returns the per-column values of a measure.
    pub fn get(&self, measure: Measure) -> Option<&BTreeMap<String, MetricValue>> {
        self.values.get(&measure)
    }

    /// Looks a measure up by its output key (`"avg"`, `"average"`, `"std"`...).
    pub fn get_by_key(&self, key: &str) -> Option<&BTreeMap<String, MetricValue>> {
        Measure::ALL
            .iter()
            .find(|m| m.key(self.naming) == key)
            .and_then(|m| self.get(*m))
    }

    /// Returns the value of one measure for one column.
    pub fn value(&self, measure: Measure, column: &str) -> Option<MetricValue> {
        self.get(measure).and_then(|values| values.get(column)).copied()
    }

    /// Names of all columns with at least one measure.
    pub fn columns(&self) -> BTreeSet<&str> {
        self.values
            .values()
            .flat_map(|values| values.keys().map(String::as_str))
            .collect()
    }

    /// Iterates `(output key, per-column values)` in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &BTreeMap<String, MetricValue>)> {
        let naming = self.naming;
        Measure::ALL
            .iter()
            .filter_map(move |m| self.values.get(m).map(|values| (m.key(naming), values)))
    }
}

impl Serialize for StatisticalMeasures {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Measure::ALL.len()))?;
        for (key, values) in self.iter() {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// A scalar value observed in the input.
///
/// Values are totally ordered so that unique-value sets serialize
/// deterministically: nulls, then numbers, then text. Booleans are numbers
/// here (`false` is 0, `true` is 1), so `Bool(true)`, `Int(1)` and
/// `Float(1.0)` compare equal and collapse to whichever reached the set first.
/// Integers and floats are compared exactly, never through a lossy cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    fn rank(&self) -> u8 {
        match self {
            ScalarValue::Null => 0,
            ScalarValue::Bool(_) | ScalarValue::Int(_) | ScalarValue::Float(_) => 1,
            ScalarValue::Text(_) => 2,
        }
    }

    /// Returns the numeric value of `Int` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Int(v) => Some(*v as f64),
            ScalarValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string of a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a JSON leaf into a scalar; containers return `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => Some(ScalarValue::Null),
            Value::Bool(b) => Some(ScalarValue::Bool(*b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => ScalarValue::Int(i),
                None => ScalarValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(s) => Some(ScalarValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Orders floats numerically with `-0.0 == 0.0`; NaN sorts after every number.
fn cmp_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison of an integer with a float.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63; every float in [-2^63, 2^63) truncates to a representable i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() || f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }

    let whole = f.trunc();
    i.cmp(&(whole as i64)).then_with(|| cmp_floats(0.0, f - whole))
}

impl Ord for ScalarValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use ScalarValue::*;

        match (self, other) {
            (Bool(a), _) if other.rank() == 1 => Int(i64::from(*a)).cmp(other),
            (_, Bool(b)) if self.rank() == 1 => self.cmp(&Int(i64::from(*b))),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => cmp_floats(*a, *b),
            (Int(a), Float(b)) => cmp_int_float(*a, *b),
            (Float(a), Int(b)) => cmp_int_float(*b, *a).reverse(),
            (Text(a), Text(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScalarValue {}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "null"),
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::Int(i) => write!(f, "{i}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
            ScalarValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Text(value.to_string())
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

/// Summary of tabular or record input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    /// Data rows for tabular input, top-level keys for record input.
    #[serde(rename = "num_rows")]
    pub row_count: usize,
    /// Distinct values seen anywhere in the input.
    pub unique_values: BTreeSet<ScalarValue>,
    /// Column or top-level field names.
    pub columns: BTreeSet<String>,
    /// Aggregates of the numeric columns.
    pub statistical_measures: StatisticalMeasures,
}

/// Summary of free-text input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSummary {
    /// Number of lines.
    #[serde(rename = "num_rows")]
    pub row_count: usize,
    /// Sorted distinct tokens left after entity exclusion.
    pub unique_values: Vec<String>,
    /// Sorted distinct characters of the remaining tokens, space separated.
    pub unique_characters: String,
    /// Matched email addresses in order of appearance.
    pub emails: Vec<String>,
    /// Matched phone numbers in order of appearance.
    pub phones: Vec<String>,
}

/// Summary produced by one analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Summary {
    Dataset(DatasetSummary),
    Text(TextSummary),
}

impl Summary {
    /// Row count of either summary shape.
    pub fn row_count(&self) -> usize {
        match self {
            Summary::Dataset(s) => s.row_count,
            Summary::Text(s) => s.row_count,
        }
    }

    /// Returns the dataset summary, if this is one.
    pub fn as_dataset(&self) -> Option<&DatasetSummary> {
        match self {
            Summary::Dataset(s) => Some(s),
            Summary::Text(_) => None,
        }
    }

    /// Returns the text summary, if this is one.
    pub fn as_text(&self) -> Option<&TextSummary> {
        match self {
            Summary::Text(s) => Some(s),
            Summary::Dataset(_) => None,
        }
    }

    /// Renders the summary as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<DatasetSummary> for Summary {
    fn from(value: DatasetSummary) -> Self {
        Summary::Dataset(value)
    }
}

impl From<TextSummary> for Summary {
    fn from(value: TextSummary) -> Self {
        Summary::Text(value)
    }
}

/// Result of dispatching a file: a summary or the unsupported-format sentinel.
///
/// Serializes as the summary mapping, or as the plain string
/// `"Unsupported file format"`.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Summary(Summary),
    Unsupported,
}

impl DispatchOutcome {
    /// Returns true for the unsupported-format sentinel.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DispatchOutcome::Unsupported)
    }

    /// Returns the summary, if any.
    pub fn summary(&self) -> Option<&Summary> {
        match self {
            DispatchOutcome::Summary(s) => Some(s),
            DispatchOutcome::Unsupported => None,
        }
    }

    /// Consumes the outcome, returning the summary if any.
    pub fn into_summary(self) -> Option<Summary> {
        match self {
            DispatchOutcome::Summary(s) => Some(s),
            DispatchOutcome::Unsupported => None,
        }
    }
}

impl Serialize for DispatchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DispatchOutcome::Summary(summary) => summary.serialize(serializer),
            DispatchOutcome::Unsupported => serializer.serialize_str(UNSUPPORTED_FORMAT),
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Summary(summary) => write!(f, "{}", summary.to_json()),
            DispatchOutcome::Unsupported => write!(f, "{UNSUPPORTED_FORMAT}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_measure_naming() {
        assert_eq!(Measure::Average.key(MeasureNaming::Tabular), "avg");
        assert_eq!(Measure::Average.key(MeasureNaming::Record), "average");
        assert_eq!(Measure::Std.key(MeasureNaming::Record), "std");
    }

    #[test]
    fn test_measures_serialize_all_keys_in_order() {
        let mut measures = StatisticalMeasures::new(MeasureNaming::Record);
        measures.insert(Measure::Sum, "a", MetricValue::Double(7.0));

        let rendered = serde_json::to_string(&measures).unwrap();
        assert_eq!(
            rendered,
            r#"{"sum":{"a":7.0},"average":{},"max":{},"min":{},"median":{},"std":{}}"#
        );
    }

    #[test]
    fn test_measures_lookup_by_key() {
        let mut measures = StatisticalMeasures::new(MeasureNaming::Tabular);
        measures.insert(Measure::Average, "a", MetricValue::Long(2));

        assert_eq!(measures.get_by_key("avg").unwrap()["a"], MetricValue::Long(2));
        assert!(measures.get_by_key("average").is_none());
        assert_eq!(measures.value(Measure::Average, "a"), Some(MetricValue::Long(2)));
        assert_eq!(measures.columns().into_iter().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_scalar_numbers_collapse() {
        let mut set = BTreeSet::new();
        set.insert(ScalarValue::Int(1));
        set.insert(ScalarValue::Float(1.0));
        set.insert(ScalarValue::Bool(true));
        set.insert(ScalarValue::Text("1".to_string()));
        assert_eq!(set.len(), 2);
        // the first member inserted is the one kept
        assert!(matches!(set.first(), Some(ScalarValue::Int(1))));

        let mut set = BTreeSet::new();
        set.insert(ScalarValue::Bool(false));
        set.insert(ScalarValue::Int(0));
        set.insert(ScalarValue::Float(-0.0));
        assert_eq!(set.len(), 1);
        assert!(matches!(set.first(), Some(ScalarValue::Bool(false))));
    }

    #[test]
    fn test_int_float_comparison_is_exact() {
        let big = 1i64 << 53;
        let float = ScalarValue::Float(big as f64);

        assert_eq!(ScalarValue::Int(big), float);
        assert!(ScalarValue::Int(big + 1) > float);
        assert!(ScalarValue::Int(big - 1) < float);
        assert!(ScalarValue::Int(2) < ScalarValue::Float(2.5));
        assert!(ScalarValue::Int(-2) > ScalarValue::Float(-2.5));
        assert!(ScalarValue::Int(i64::MAX) < ScalarValue::Float(1e19));
        assert!(ScalarValue::Int(i64::MIN) > ScalarValue::Float(-1e19));
        assert!(ScalarValue::Int(i64::MAX) < ScalarValue::Float(f64::NAN));

        let set: BTreeSet<ScalarValue> = [
            ScalarValue::Int(big),
            ScalarValue::Int(big + 1),
            float,
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_scalar_ordering_by_kind() {
        let mut values = vec![
            ScalarValue::from("b"),
            ScalarValue::Float(2.5),
            ScalarValue::Null,
            ScalarValue::Int(-3),
            ScalarValue::Bool(true),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                ScalarValue::Null,
                ScalarValue::Int(-3),
                ScalarValue::Bool(true),
                ScalarValue::Float(2.5),
                ScalarValue::from("b"),
            ]
        );
    }

    #[test]
    fn test_scalar_from_json() {
        assert_eq!(ScalarValue::from_json(&json!(3)), Some(ScalarValue::Int(3)));
        assert_eq!(ScalarValue::from_json(&json!(2.5)), Some(ScalarValue::Float(2.5)));
        assert_eq!(ScalarValue::from_json(&json!(null)), Some(ScalarValue::Null));
        assert_eq!(ScalarValue::from_json(&json!([1])), None);
        assert_eq!(ScalarValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_dataset_summary_serialization() {
        let mut measures = StatisticalMeasures::new(MeasureNaming::Tabular);
        measures.insert(Measure::Sum, "n", MetricValue::Long(7));
        let summary = Summary::Dataset(DatasetSummary {
            row_count: 3,
            unique_values: [ScalarValue::Int(1), ScalarValue::from("x")].into_iter().collect(),
            columns: ["n".to_string()].into_iter().collect(),
            statistical_measures: measures,
        });

        let value = summary.to_json();
        assert_eq!(value["num_rows"], json!(3));
        assert_eq!(value["unique_values"], json!([1, "x"]));
        assert_eq!(value["columns"], json!(["n"]));
        assert_eq!(value["statistical_measures"]["sum"]["n"], json!(7));
        assert_eq!(value["statistical_measures"]["avg"], json!({}));
    }

    #[test]
    fn test_unsupported_serializes_as_sentinel() {
        let outcome = DispatchOutcome::Unsupported;
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            "\"Unsupported file format\""
        );
        assert_eq!(outcome.to_string(), UNSUPPORTED_FORMAT);
        assert!(outcome.summary().is_none());
    }
}
