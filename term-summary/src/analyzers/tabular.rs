//! Tabular analyzer for delimited files.

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::analyzers::stats::truncate;
use crate::analyzers::{FileAnalyzer, FileFormat};
use crate::config::{StdDevConvention, SummaryConfig, DEFAULT_TABULAR_STD_DEV};
use crate::error::{Result, SummaryError};
use crate::security::SqlSecurity;
use crate::sources::{self, CsvOptions, CsvSource};
use crate::summary::{
    DatasetSummary, Measure, MeasureNaming, MetricValue, ScalarValue, StatisticalMeasures, Summary,
};

/// Table name the file is registered under.
const TABLE_NAME: &str = "data";

/// Analyzer for delimited rectangular files.
///
/// The file is registered with a fresh DataFusion context; schema inference
/// decides which columns are numeric. Every numeric column gets `sum`, `avg`,
/// `max`, `min`, `median` and `std`, each truncated toward zero.
///
/// # Example
///
/// ```rust,no_run
/// use term_summary::analyzers::{FileAnalyzer, TabularAnalyzer};
/// use term_summary::summary::{Measure, MetricValue};
/// use std::path::Path;
///
/// # async fn example() -> term_summary::prelude::Result<()> {
/// let summary = TabularAnalyzer::new()
///     .summarize(Path::new("uploads/scores.csv"))
///     .await?;
/// let dataset = summary.as_dataset().unwrap();
/// if let Some(MetricValue::Long(avg)) = dataset.statistical_measures.value(Measure::Average, "score") {
///     println!("average score: {avg}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TabularAnalyzer {
    csv: CsvOptions,
    std_dev: StdDevConvention,
    max_file_size: Option<u64>,
}

impl Default for TabularAnalyzer {
    fn default() -> Self {
        Self {
            csv: CsvOptions::default(),
            std_dev: DEFAULT_TABULAR_STD_DEV,
            max_file_size: None,
        }
    }
}

impl TabularAnalyzer {
    /// Creates a tabular analyzer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tabular analyzer from the shared configuration.
    pub fn from_config(config: &SummaryConfig) -> Self {
        Self {
            csv: config.csv.clone(),
            std_dev: config.tabular_std_dev,
            max_file_size: config.max_file_size,
        }
    }

    /// Sets the CSV reading options.
    pub fn with_csv_options(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    /// Sets the standard deviation convention.
    pub fn with_std_dev(mut self, convention: StdDevConvention) -> Self {
        self.std_dev = convention;
        self
    }

    /// Summarizes a table already registered in `ctx`.
    #[instrument(skip(self, ctx, schema), fields(table.name = %table_name))]
    pub async fn summarize_table(
        &self,
        ctx: &SessionContext,
        table_name: &str,
        schema: &Schema,
    ) -> Result<DatasetSummary> {
        let table = SqlSecurity::quote_identifier(table_name);
        let row_count = self.count_rows(ctx, &table).await?;

        let mut columns = BTreeSet::new();
        let mut unique_values = BTreeSet::new();
        let mut measures = StatisticalMeasures::new(MeasureNaming::Tabular);

        for field in schema.fields() {
            let name = field.name();
            let column = SqlSecurity::quote_identifier(name);
            columns.insert(name.clone());

            let sql = format!("SELECT DISTINCT {column} FROM {table}");
            for batch in run_query(ctx, &sql).await? {
                collect_scalars(batch.column(0), &mut unique_values)?;
            }

            if field.data_type().is_numeric() {
                let integer = field.data_type().is_integer();
                self.column_measures(ctx, &table, name, &column, integer, &mut measures)
                    .await?;
            } else {
                debug!(column = %name, data_type = %field.data_type(), "Skipping non-numeric column");
            }
        }

        info!(
            rows = row_count,
            columns = columns.len(),
            unique_values = unique_values.len(),
            "Tabular summary computed"
        );

        Ok(DatasetSummary {
            row_count,
            unique_values,
            columns,
            statistical_measures: measures,
        })
    }

    async fn count_rows(&self, ctx: &SessionContext, table: &str) -> Result<usize> {
        let batches = run_query(ctx, &format!("SELECT COUNT(*) AS row_count FROM {table}")).await?;
        let Some(batch) = batches.first().filter(|b| b.num_rows() > 0) else {
            return Ok(0);
        };
        let counts = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| SummaryError::Internal("Expected Int64 array for row count".into()))?;
        Ok(counts.value(0) as usize)
    }

    /// Computes all measures of one numeric column with a single query.
    ///
    /// Integer columns keep `sum`, `max` and `min` in Int64 so they stay exact
    /// beyond 2^53; the other measures run over `DOUBLE`.
    async fn column_measures(
        &self,
        ctx: &SessionContext,
        table: &str,
        name: &str,
        column: &str,
        integer: bool,
        measures: &mut StatisticalMeasures,
    ) -> Result<()> {
        let value = format!("CAST({column} AS DOUBLE)");
        let exact = if integer { column } else { value.as_str() };
        let sql = format!(
            "SELECT
                COUNT({column}) AS count,
                SUM({exact}) AS sum,
                AVG({value}) AS avg,
                MAX({exact}) AS max,
                MIN({exact}) AS min,
                MEDIAN({value}) AS median,
                {std}({value}) AS std
            FROM {table}",
            std = self.std_dev.sql_function(),
        );

        let batches = run_query(ctx, &sql).await?;
        let Some(batch) = batches.first().filter(|b| b.num_rows() > 0) else {
            return Ok(());
        };

        let count = long_at(batch, 0)?.unwrap_or(0);
        if count == 0 {
            debug!(column = %name, "Numeric column has no values");
            return Ok(());
        }

        let aggregates = [
            (Measure::Sum, 1, integer),
            (Measure::Average, 2, false),
            (Measure::Max, 3, integer),
            (Measure::Min, 4, integer),
            (Measure::Median, 5, false),
            (Measure::Std, 6, false),
        ];
        for (measure, index, exact) in aggregates {
            let value = if exact {
                long_at(batch, index)?
            } else {
                float_at(batch, index)?.map(truncate)
            };
            if let Some(value) = value {
                measures.insert(measure, name, MetricValue::Long(value));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl FileAnalyzer for TabularAnalyzer {
    fn format(&self) -> FileFormat {
        FileFormat::Csv
    }

    fn name(&self) -> &str {
        "tabular"
    }

    fn description(&self) -> &str {
        "Summarizes delimited files: rows, columns, unique values and truncated column statistics"
    }

    #[instrument(skip(self), fields(analyzer = "tabular", path = %path.display()))]
    async fn summarize(&self, path: &Path) -> Result<Summary> {
        sources::check_file(path, self.max_file_size).await?;

        let ctx = SessionContext::new();
        let source = CsvSource::with_options(path, self.csv.clone());
        let schema = source.register(&ctx, TABLE_NAME).await?;
        if schema.fields().is_empty() {
            return Err(SummaryError::parse("csv", "no columns to parse from file"));
        }

        let summary = self.summarize_table(&ctx, TABLE_NAME, &schema).await?;
        Ok(Summary::Dataset(summary))
    }
}

/// Runs a query; failures while scanning the file are malformed input.
async fn run_query(ctx: &SessionContext, sql: &str) -> Result<Vec<RecordBatch>> {
    let df = ctx
        .sql(sql)
        .await
        .map_err(|e| SummaryError::parse_with_source("csv", e))?;
    df.collect()
        .await
        .map_err(|e| SummaryError::parse_with_source("csv", e))
}

/// Reads row 0 of column `index` as i64; `None` when null.
fn long_at(batch: &RecordBatch, index: usize) -> Result<Option<i64>> {
    let column = batch.column(index);
    if column.is_null(0) {
        return Ok(None);
    }
    let values = cast(column, &DataType::Int64)?;
    Ok(Some(downcast::<Int64Array>(&values)?.value(0)))
}

/// Reads row 0 of column `index` as f64; `None` when null.
fn float_at(batch: &RecordBatch, index: usize) -> Result<Option<f64>> {
    let column = batch.column(index);
    if column.is_null(0) {
        return Ok(None);
    }
    let values = cast(column, &DataType::Float64)?;
    let values = values
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| SummaryError::Internal("Expected Float64 array for aggregate".into()))?;
    Ok(Some(values.value(0)))
}

/// Adds every value of `array` to `out`, keeping numbers and booleans typed.
fn collect_scalars(array: &ArrayRef, out: &mut BTreeSet<ScalarValue>) -> Result<()> {
    let data_type = array.data_type();

    if data_type.is_integer() {
        let values = cast(array, &DataType::Int64)?;
        let values = downcast::<Int64Array>(&values)?;
        for i in 0..values.len() {
            out.insert(if values.is_null(i) {
                ScalarValue::Null
            } else {
                ScalarValue::Int(values.value(i))
            });
        }
    } else if data_type.is_numeric() {
        let values = cast(array, &DataType::Float64)?;
        let values = downcast::<Float64Array>(&values)?;
        for i in 0..values.len() {
            out.insert(if values.is_null(i) {
                ScalarValue::Null
            } else {
                ScalarValue::Float(values.value(i))
            });
        }
    } else if matches!(data_type, DataType::Boolean) {
        let values = downcast::<BooleanArray>(array)?;
        for i in 0..values.len() {
            out.insert(if values.is_null(i) {
                ScalarValue::Null
            } else {
                ScalarValue::Bool(values.value(i))
            });
        }
    } else {
        let values = cast(array, &DataType::Utf8)?;
        let values = downcast::<StringArray>(&values)?;
        for i in 0..values.len() {
            out.insert(if values.is_null(i) {
                ScalarValue::Null
            } else {
                ScalarValue::Text(values.value(i).to_string())
            });
        }
    }

    Ok(())
}

fn downcast<T: 'static>(array: &ArrayRef) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        SummaryError::Internal(format!(
            "Unexpected array type {} while collecting values",
            array.data_type()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{content}").unwrap();
        file.flush().unwrap();
        file
    }

    async fn summarize(content: &str) -> DatasetSummary {
        let file = write_csv(content);
        let summary = TabularAnalyzer::new().summarize(file.path()).await.unwrap();
        summary.as_dataset().unwrap().clone()
    }

    #[tokio::test]
    async fn test_truncates_aggregates() {
        let summary = summarize("n\n1\n2\n4\n").await;
        let measures = &summary.statistical_measures;

        assert_eq!(summary.row_count, 3);
        assert_eq!(measures.value(Measure::Sum, "n"), Some(MetricValue::Long(7)));
        assert_eq!(measures.value(Measure::Average, "n"), Some(MetricValue::Long(2)));
        assert_eq!(measures.value(Measure::Max, "n"), Some(MetricValue::Long(4)));
        assert_eq!(measures.value(Measure::Min, "n"), Some(MetricValue::Long(1)));
        assert_eq!(measures.value(Measure::Median, "n"), Some(MetricValue::Long(2)));
        // sample: sqrt(7/3) = 1.53
        assert_eq!(measures.value(Measure::Std, "n"), Some(MetricValue::Long(1)));
    }

    #[tokio::test]
    async fn test_non_numeric_columns_have_no_measures() {
        let summary = summarize("name,score\nann,1.5\nbob,2.5\n").await;
        let measures = &summary.statistical_measures;

        assert!(measures.value(Measure::Sum, "name").is_none());
        assert_eq!(measures.value(Measure::Sum, "score"), Some(MetricValue::Long(4)));
        assert_eq!(measures.columns().into_iter().collect::<Vec<_>>(), vec!["score"]);
    }

    #[tokio::test]
    async fn test_unique_values_are_global() {
        let summary = summarize("a,b\n1,x\n1,y\n2,x\n").await;
        let expected: BTreeSet<ScalarValue> = [
            ScalarValue::Int(1),
            ScalarValue::Int(2),
            ScalarValue::from("x"),
            ScalarValue::from("y"),
        ]
        .into_iter()
        .collect();
        assert_eq!(summary.unique_values, expected);
    }

    #[tokio::test]
    async fn test_std_dev_convention() {
        let file = write_csv("n\n0\n6\n");

        // sample: sqrt(18) = 4.24
        let summary = TabularAnalyzer::new().summarize(file.path()).await.unwrap();
        assert_eq!(
            summary.as_dataset().unwrap().statistical_measures.value(Measure::Std, "n"),
            Some(MetricValue::Long(4))
        );

        // population: sqrt(9) = 3
        let summary = TabularAnalyzer::new()
            .with_std_dev(StdDevConvention::Population)
            .summarize(file.path())
            .await
            .unwrap();
        let dataset = summary.as_dataset().unwrap();
        assert_eq!(
            dataset.statistical_measures.value(Measure::Std, "n"),
            Some(MetricValue::Long(3))
        );
        assert_eq!(
            dataset.statistical_measures.value(Measure::Median, "n"),
            Some(MetricValue::Long(3))
        );
    }

    #[tokio::test]
    async fn test_integer_aggregates_stay_exact() {
        let summary = summarize("n\n9007199254740993\n0\n").await;
        let measures = &summary.statistical_measures;

        assert_eq!(
            measures.value(Measure::Sum, "n"),
            Some(MetricValue::Long(9_007_199_254_740_993))
        );
        assert_eq!(
            measures.value(Measure::Max, "n"),
            Some(MetricValue::Long(9_007_199_254_740_993))
        );
        assert_eq!(measures.value(Measure::Min, "n"), Some(MetricValue::Long(0)));
        assert!(summary
            .unique_values
            .contains(&ScalarValue::Int(9_007_199_254_740_993)));
    }

    #[tokio::test]
    async fn test_missing_value_tokens_do_not_block_statistics() {
        let summary = summarize("n\n1\nNA\n3\n").await;

        assert_eq!(summary.row_count, 3);
        assert_eq!(
            summary.statistical_measures.value(Measure::Sum, "n"),
            Some(MetricValue::Long(4))
        );
        assert!(summary.unique_values.contains(&ScalarValue::Null));
        assert!(!summary.unique_values.contains(&ScalarValue::from("NA")));
    }

    #[tokio::test]
    async fn test_empty_file_is_parse_error() {
        let file = write_csv("");
        let err = TabularAnalyzer::new()
            .summarize(file.path())
            .await
            .unwrap_err();
        assert!(err.is_parse(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_summarize_registered_table() {
        let file = write_csv("x,y\n10,a\n20,b\n");
        let ctx = SessionContext::new();
        let schema = CsvSource::new(file.path())
            .register(&ctx, "scores")
            .await
            .unwrap();

        let summary = TabularAnalyzer::new()
            .summarize_table(&ctx, "scores", &schema)
            .await
            .unwrap();
        assert_eq!(summary.row_count, 2);
        assert_eq!(
            summary.statistical_measures.value(Measure::Sum, "x"),
            Some(MetricValue::Long(30))
        );
    }

    #[test]
    fn test_collect_scalars_by_type() {
        let mut out = BTreeSet::new();
        let ints: ArrayRef = Arc::new(Int64Array::from(vec![Some(1), None, Some(3)]));
        let floats: ArrayRef = Arc::new(Float64Array::from(vec![1.0, 2.5]));
        let bools: ArrayRef = Arc::new(BooleanArray::from(vec![true]));
        let strings: ArrayRef = Arc::new(StringArray::from(vec!["a"]));

        for array in [&ints, &floats, &bools, &strings] {
            collect_scalars(array, &mut out).unwrap();
        }

        // true collapses into 1
        let expected: BTreeSet<ScalarValue> = [
            ScalarValue::Null,
            ScalarValue::Int(1),
            ScalarValue::Float(2.5),
            ScalarValue::Int(3),
            ScalarValue::from("a"),
        ]
        .into_iter()
        .collect();
        assert_eq!(out, expected);
        assert!(matches!(out.iter().nth(1), Some(ScalarValue::Int(1))));
    }
}
