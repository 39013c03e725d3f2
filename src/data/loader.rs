use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::error::{PipelineError, Result};
use super::model::{Observation, Series};

// ---------------------------------------------------------------------------
// Loader configuration
// ---------------------------------------------------------------------------

/// Names of the two logical columns in the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub date_column: String,
    pub value_column: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            value_column: "value".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a daily series from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with a date and a value column
/// * `.json`    – `[{ "date": "2016-05-09", "value": 1201 }, ...]`
/// * `.parquet` – date column (string or Date32/Date64) and numeric value column
///
/// The result is sorted by date. Any bad row aborts the whole load.
pub fn load_file(path: &Path, config: &LoaderConfig) -> Result<Series> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let series = match ext.as_str() {
        "csv" => read_csv(std::fs::File::open(path)?, config),
        "json" => parse_json(&std::fs::read_to_string(path)?, config),
        "parquet" | "pq" => load_parquet(path, config),
        other => Err(PipelineError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} observations from {} ({} … {})",
        series.len(),
        path.display(),
        series.first_date().map(|d| d.to_string()).unwrap_or_default(),
        series.last_date().map(|d| d.to_string()).unwrap_or_default(),
    );
    Ok(series)
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Parse a calendar date. Date-time strings are truncated to their date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Values must be finite and non-negative.
fn check_value(value: f64) -> std::result::Result<f64, String> {
    if !value.is_finite() {
        return Err(format!("value {value} is not a finite number"));
    }
    if value < 0.0 {
        return Err(format!("value {value} is negative"));
    }
    Ok(value)
}

fn parse_value(raw: &str) -> std::result::Result<f64, String> {
    let tok = raw.trim();
    let value = tok
        .parse::<f64>()
        .map_err(|_| format!("'{tok}' is not a number"))?;
    check_value(value)
}

fn parse_row(
    location: impl Fn() -> String,
    raw_date: &str,
    raw_value: &str,
) -> Result<Observation> {
    let date = parse_date(raw_date)
        .ok_or_else(|| PipelineError::malformed(location(), format!("'{raw_date}' is not a date")))?;
    let value = parse_value(raw_value).map_err(|reason| PipelineError::malformed(location(), reason))?;
    Ok(Observation::new(date, value))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one day per row.
/// Columns other than the configured date and value columns are ignored.
pub fn read_csv<R: Read>(input: R, config: &LoaderConfig) -> Result<Series> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    };
    let date_idx = position(&config.date_column)?;
    let value_idx = position(&config.value_column)?;

    let mut observations = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let location = || format!("CSV row {}", row_no + 1);
        let observation = parse_row(
            location,
            record.get(date_idx).unwrap_or(""),
            record.get(value_idx).unwrap_or(""),
        )?;
        observations.push(observation);
    }

    Series::from_observations(observations)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records',
/// date_format='iso')`):
///
/// ```json
/// [
///   { "date": "2016-05-09", "value": 1201 },
///   { "date": "2016-05-10", "value": 2329 }
/// ]
/// ```
///
/// Values may also be numeric strings.
pub fn parse_json(text: &str, config: &LoaderConfig) -> Result<Series> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root
        .as_array()
        .ok_or_else(|| PipelineError::malformed("JSON document", "expected a top-level array"))?;

    let mut observations = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let location = || format!("JSON record {i}");
        let obj = rec
            .as_object()
            .ok_or_else(|| PipelineError::malformed(location(), "not a JSON object"))?;

        let date = match obj.get(&config.date_column) {
            Some(JsonValue::String(s)) => parse_date(s)
                .ok_or_else(|| PipelineError::malformed(location(), format!("'{s}' is not a date")))?,
            Some(other) => {
                return Err(PipelineError::malformed(location(), format!("'{other}' is not a date")))
            }
            None => return Err(PipelineError::MissingColumn(config.date_column.clone())),
        };

        let value = match obj.get(&config.value_column) {
            Some(JsonValue::Number(n)) => n
                .as_f64()
                .ok_or_else(|| format!("'{n}' is not representable as f64"))
                .and_then(check_value),
            Some(JsonValue::String(s)) => parse_value(s),
            Some(other) => Err(format!("'{other}' is not a number")),
            None => return Err(PipelineError::MissingColumn(config.value_column.clone())),
        }
        .map_err(|reason| PipelineError::malformed(location(), reason))?;

        observations.push(Observation::new(date, value));
    }

    Series::from_observations(observations)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding a daily series.
///
/// Expected schema:
/// - date column: Utf8 / LargeUtf8 (ISO dates), Date32 or Date64
/// - value column: Float64, Float32, Int64 or Int32
/// - Any other columns are ignored
fn load_parquet(path: &Path, config: &LoaderConfig) -> Result<Series> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut observations = Vec::new();
    let mut row_offset = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let date_idx = schema
            .index_of(&config.date_column)
            .map_err(|_| PipelineError::MissingColumn(config.date_column.clone()))?;
        let value_idx = schema
            .index_of(&config.value_column)
            .map_err(|_| PipelineError::MissingColumn(config.value_column.clone()))?;

        let date_col = batch.column(date_idx);
        let value_col = batch.column(value_idx);

        for row in 0..batch.num_rows() {
            let location = || format!("Parquet row {}", row_offset + row);
            let date = extract_date(date_col, row)
                .map_err(|reason| PipelineError::malformed(location(), reason))?;
            let value = extract_value(value_col, row)
                .and_then(check_value)
                .map_err(|reason| PipelineError::malformed(location(), reason))?;
            observations.push(Observation::new(date, value));
        }
        row_offset += batch.num_rows();
    }

    Series::from_observations(observations)
}

// -- Parquet / Arrow helpers --

/// Days between 0001-01-01 (day 1 of the common era) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

fn date_from_epoch_days(days: i64) -> Option<NaiveDate> {
    let from_ce = i32::try_from(days + UNIX_EPOCH_DAYS_FROM_CE).ok()?;
    NaiveDate::from_num_days_from_ce_opt(from_ce)
}

fn extract_date(col: &ArrayRef, row: usize) -> std::result::Result<NaiveDate, String> {
    if col.is_null(row) {
        return Err("date is null".to_string());
    }
    let parse_text = |s: &str| parse_date(s).ok_or_else(|| format!("'{s}' is not a date"));
    match col.data_type() {
        DataType::Utf8 => parse_text(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => parse_text(col.as_string::<i64>().value(row)),
        DataType::Date32 => {
            let days = col.as_primitive::<Date32Type>().value(row);
            date_from_epoch_days(days as i64).ok_or_else(|| format!("day {days} is out of range"))
        }
        DataType::Date64 => {
            let millis = col.as_primitive::<Date64Type>().value(row);
            date_from_epoch_days(millis.div_euclid(86_400_000))
                .ok_or_else(|| format!("timestamp {millis} ms is out of range"))
        }
        other => Err(format!("unsupported date column type {other:?}")),
    }
}

fn extract_value(col: &ArrayRef, row: usize) -> std::result::Result<f64, String> {
    if col.is_null(row) {
        return Err("value is null".to_string());
    }
    match col.data_type() {
        DataType::Float64 => Ok(col.as_primitive::<Float64Type>().value(row)),
        DataType::Float32 => Ok(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Int64 => Ok(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Int32 => Ok(col.as_primitive::<Int32Type>().value(row) as f64),
        other => Err(format!("unsupported value column type {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn csv(text: &str) -> Result<Series> {
        read_csv(text.as_bytes(), &LoaderConfig::default())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn write_parquet(batch: RecordBatch) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer =
            ArrowWriter::try_new(file.reopen().unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    // ── dates ────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2016-05-09"), Some(date("2016-05-09")));
        assert_eq!(parse_date(" 2016-05-09 "), Some(date("2016-05-09")));
        assert_eq!(parse_date("2016-05-09T13:45:00"), Some(date("2016-05-09")));
        assert_eq!(parse_date("2016-05-09 13:45:00"), Some(date("2016-05-09")));
        assert_eq!(parse_date("2016-05-09T13:45:00+02:00"), Some(date("2016-05-09")));
        assert_eq!(parse_date("2016-13-01"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_epoch_days() {
        assert_eq!(date_from_epoch_days(0), Some(date("1970-01-01")));
        assert_eq!(date_from_epoch_days(17_000), Some(date("2016-07-18")));
        assert_eq!(date_from_epoch_days(-1), Some(date("1969-12-31")));
    }

    // ── CSV ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_csv_sorted_by_date() {
        let series = csv("date,value\n2016-05-11,30\n2016-05-09,10\n2016-05-10,20\n").unwrap();
        let dates: Vec<NaiveDate> = series.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date("2016-05-09"), date("2016-05-10"), date("2016-05-11")]);
        assert_eq!(series.values().collect::<Vec<_>>(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_csv_ignores_extra_columns_and_order() {
        let series = csv("value,note,date\n5,a,2019-01-01\n6,b,2019-01-02\n").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.observations()[1].value, 6.0);
    }

    #[test]
    fn test_csv_custom_column_names() {
        let config = LoaderConfig {
            date_column: "day".to_string(),
            value_column: "views".to_string(),
        };
        let series = read_csv("day,views\n2019-01-01,5\n".as_bytes(), &config).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_csv_bad_date_is_malformed() {
        let err = csv("date,value\n2016-05-09,10\nnot-a-date,20\n").unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("CSV row 2"));
    }

    #[test]
    fn test_csv_non_numeric_value_is_malformed() {
        let err = csv("date,value\n2016-05-09,lots\n").unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("'lots' is not a number"));
    }

    #[test]
    fn test_csv_rejects_nan_and_negative() {
        assert!(csv("date,value\n2016-05-09,NaN\n").unwrap_err().is_malformed_input());
        assert!(csv("date,value\n2016-05-09,-3\n").unwrap_err().is_malformed_input());
        assert!(csv("date,value\n2016-05-09,inf\n").unwrap_err().is_malformed_input());
    }

    #[test]
    fn test_csv_duplicate_date_is_malformed() {
        let err = csv("date,value\n2016-05-09,1\n2016-05-09,2\n").unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_csv_missing_column() {
        let err = csv("when,value\n2016-05-09,1\n").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == "date"));
    }

    #[test]
    fn test_csv_header_with_byte_order_mark() {
        let series = csv("\u{feff}date,value\n2019-01-01,5\n2019-01-02,7\n").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(date("2019-01-01")));
    }

    #[test]
    fn test_csv_header_only_is_empty_series() {
        assert!(csv("date,value\n").unwrap().is_empty());
    }

    // ── JSON ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_json_records() {
        let text = r#"[
            {"date": "2016-05-10", "value": 2329},
            {"date": "2016-05-09T00:00:00.000Z", "value": "1201"}
        ]"#;
        let series = parse_json(text, &LoaderConfig::default()).unwrap();
        assert_eq!(series.values().collect::<Vec<_>>(), vec![1201.0, 2329.0]);
    }

    #[test]
    fn test_json_non_numeric_value_is_malformed() {
        let text = r#"[{"date": "2016-05-10", "value": true}]"#;
        let err = parse_json(text, &LoaderConfig::default()).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("JSON record 0"));
    }

    #[test]
    fn test_json_not_an_array() {
        let err = parse_json(r#"{"date": "2016-05-10"}"#, &LoaderConfig::default()).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_json_missing_value_field() {
        let err = parse_json(r#"[{"date": "2016-05-10"}]"#, &LoaderConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == "value"));
    }

    #[test]
    fn test_json_syntax_error() {
        let err = parse_json("[{", &LoaderConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Json(_)));
    }

    // ── Parquet ──────────────────────────────────────────────────────────────

    #[test]
    fn test_parquet_date32_and_float() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("date", DataType::Date32, false),
            Field::new("value", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Date32Array::from(vec![17_001, 17_000])),
                Arc::new(Float64Array::from(vec![2.0, 1.0])),
            ],
        )
        .unwrap();
        let file = write_parquet(batch);

        let series = load_file(file.path(), &LoaderConfig::default()).unwrap();
        assert_eq!(series.first_date(), Some(date("2016-07-18")));
        assert_eq!(series.values().collect::<Vec<_>>(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_parquet_string_dates_and_int_values() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("date", DataType::Utf8, false),
            Field::new("value", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["2019-01-01", "oops"])),
                Arc::new(Int64Array::from(vec![1, 2])),
            ],
        )
        .unwrap();
        let file = write_parquet(batch);

        let err = load_file(file.path(), &LoaderConfig::default()).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("Parquet row 1"));
    }

    #[test]
    fn test_parquet_missing_value_column() {
        let schema = Arc::new(Schema::new(vec![Field::new("date", DataType::Utf8, false)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["2019-01-01"]))],
        )
        .unwrap();
        let file = write_parquet(batch);

        let err = load_file(file.path(), &LoaderConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(_)));
    }

    // ── dispatch ─────────────────────────────────────────────────────────────

    #[test]
    fn test_load_csv_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".CSV").tempfile().unwrap();
        writeln!(file, "date,value\n2019-01-01,5").unwrap();
        let series = load_file(file.path(), &LoaderConfig::default()).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let err = load_file(file.path(), &LoaderConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(ref e) if e == "xlsx"));
    }
}
