use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{MetadataTable, MetadataValue, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a metadata table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat scalar columns (recommended)
/// * `.json`    – `[{ "trace_name": "...", "eligible": true, ... }, ...]`
/// * `.csv`     – header row, cell types guessed per value
///
/// When `index_column` is given its values become the row index and must be
/// unique; otherwise rows are indexed by position.
pub fn load_file(path: &Path, index_column: Option<&str>) -> Result<MetadataTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    debug!("Loaded {} rows from {}", rows.len(), path.display());

    build_table(rows, index_column)
}

type Row = BTreeMap<String, MetadataValue>;

/// Turn raw rows into records, pulling out the index column if requested.
fn build_table(rows: Vec<Row>, index_column: Option<&str>) -> Result<MetadataTable> {
    let Some(index_column) = index_column else {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, metadata)| Record {
                index: MetadataValue::Integer(i as i64),
                metadata,
            })
            .collect();
        return Ok(MetadataTable::from_records(records));
    };

    let mut records = Vec::with_capacity(rows.len());
    for (i, mut metadata) in rows.into_iter().enumerate() {
        let index = match metadata.remove(index_column) {
            Some(value) if !value.is_null() => value,
            _ => bail!("Row {i}: missing value in index column '{index_column}'"),
        };
        records.push(Record { index, metadata });
    }

    let table =
        MetadataTable::from_records(records).with_index_name(Some(index_column.to_string()));
    if !table.has_unique_index() {
        bail!("Index column '{index_column}' contains duplicate values");
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "trace_name": "XY.ABC..HH", "PS-pairs": true, "magnitude": 2.4 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Row>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| -> Result<Row> {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(obj
                .iter()
                .map(|(key, val)| (key.clone(), json_to_metadata(val)))
                .collect())
        })
        .collect()
}

fn json_to_metadata(val: &JsonValue) -> MetadataValue {
    match val {
        JsonValue::String(s) => MetadataValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                MetadataValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                MetadataValue::Float(f)
            } else {
                MetadataValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => MetadataValue::Bool(*b),
        JsonValue::Null => MetadataValue::Null,
        other => MetadataValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
fn load_csv(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), MetadataValue::guess(value)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of scalar metadata columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested or exotic column types are
/// kept as their display string.
fn load_parquet(path: &Path) -> Result<Vec<Row>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let columns: Vec<(&String, &ArrayRef)> = schema
            .fields()
            .iter()
            .map(|f| f.name())
            .zip(batch.columns())
            .collect();

        for row in 0..batch.num_rows() {
            let mut metadata = BTreeMap::new();
            for (name, col) in &columns {
                let value = extract_metadata_value(col, row)
                    .with_context(|| format!("Row {row}: failed to read '{name}'"))?;
                metadata.insert((*name).clone(), value);
            }
            rows.push(metadata);
        }
    }

    Ok(rows)
}

/// Extract a single metadata value from an Arrow column at a given row.
fn extract_metadata_value(col: &ArrayRef, row: usize) -> Result<MetadataValue> {
    if col.is_null(row) {
        return Ok(MetadataValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => MetadataValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => MetadataValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Boolean => MetadataValue::Bool(col.as_boolean().value(row)),
        DataType::Int8 => MetadataValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => MetadataValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => MetadataValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => MetadataValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => MetadataValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => MetadataValue::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => MetadataValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            match i64::try_from(v) {
                Ok(i) => MetadataValue::Integer(i),
                Err(_) => MetadataValue::String(v.to_string()),
            }
        }
        DataType::Float32 => MetadataValue::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => MetadataValue::Float(col.as_primitive::<Float64Type>().value(row)),
        _ => MetadataValue::String(array_value_to_string(col.as_ref(), row)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_positional_index() {
        let file = write_temp(".csv", "trace,PS-pairs,snr\nA,True,3.5\nB,False,\n");
        let table = load_file(file.path(), None).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.index_name, None);
        assert_eq!(table.records[1].index, MetadataValue::Integer(1));
        assert_eq!(table.records[0].get("PS-pairs"), Some(&MetadataValue::Bool(true)));
        assert_eq!(table.records[0].get("snr"), Some(&MetadataValue::Float(3.5)));
        assert_eq!(table.records[1].get("snr"), Some(&MetadataValue::Null));
    }

    #[test]
    fn test_load_csv_with_index_column() {
        let file = write_temp(".csv", "id,eligible\n17,true\n3,false\n");
        let table = load_file(file.path(), Some("id")).unwrap();

        assert_eq!(table.index_name.as_deref(), Some("id"));
        assert_eq!(table.records[0].index, MetadataValue::Integer(17));
        assert_eq!(table.column_names, vec!["eligible"]);
    }

    #[test]
    fn test_duplicate_index_is_rejected() {
        let file = write_temp(".csv", "id,eligible\n1,true\n1,false\n");
        let err = load_file(file.path(), Some("id")).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_missing_index_value_is_rejected() {
        let file = write_temp(".json", r#"[{"id": 1, "eligible": true}, {"eligible": false}]"#);
        let err = load_file(file.path(), Some("id")).unwrap_err();
        assert!(err.to_string().contains("Row 1"));
    }

    #[test]
    fn test_load_json_records() {
        let file = write_temp(
            ".json",
            r#"[{"name": "a", "eligible": true, "mag": 2}, {"name": "b", "eligible": false, "mag": 1.5, "tags": [1]}]"#,
        );
        let table = load_file(file.path(), Some("name")).unwrap();

        assert_eq!(table.records[1].index, MetadataValue::from("b"));
        assert_eq!(table.records[0].get("mag"), Some(&MetadataValue::Integer(2)));
        assert_eq!(table.records[1].get("mag"), Some(&MetadataValue::Float(1.5)));
        assert_eq!(table.records[1].get("tags"), Some(&MetadataValue::from("[1]")));
    }

    #[test]
    fn test_json_must_be_array() {
        let file = write_temp(".json", r#"{"eligible": true}"#);
        assert!(load_file(file.path(), None).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".xlsx", "");
        let err = load_file(file.path(), None).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
