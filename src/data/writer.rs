use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::ArrowWriter;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::model::{MetadataTable, MetadataValue};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write a metadata table to a file.  Dispatch by extension, same formats as
/// [`super::loader::load_file`].
///
/// The index is written as its own column only when the table was loaded
/// with a named index; positional indices are implied by row order.
pub fn write_file(table: &MetadataTable, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => write_parquet(table, path)?,
        "json" => write_json(table, path)?,
        "csv" => write_csv(table, path)?,
        other => bail!("Unsupported file extension: .{other}"),
    }
    debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Output columns: the named index first, then the metadata columns.
fn output_columns(table: &MetadataTable) -> Vec<&str> {
    table
        .index_name
        .iter()
        .map(String::as_str)
        .chain(table.column_names.iter().map(String::as_str))
        .collect()
}

/// Value of `column` for row `pos`, resolving the index column.
fn cell<'a>(table: &'a MetadataTable, pos: usize, column: &str) -> &'a MetadataValue {
    let rec = &table.records[pos];
    if table.index_name.as_deref() == Some(column) {
        return &rec.index;
    }
    rec.get(column).unwrap_or(&MetadataValue::Null)
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

fn write_csv(table: &MetadataTable, path: &Path) -> Result<()> {
    let columns = output_columns(table);
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(&columns).context("writing CSV header")?;

    for pos in 0..table.len() {
        let row = columns.iter().map(|c| cell(table, pos, c).to_string());
        writer
            .write_record(row)
            .with_context(|| format!("writing CSV row {pos}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON writer
// ---------------------------------------------------------------------------

/// Records-oriented array, readable by `pd.read_json(path, orient='records')`.
fn write_json(table: &MetadataTable, path: &Path) -> Result<()> {
    let columns = output_columns(table);
    let records: Vec<JsonValue> = (0..table.len())
        .map(|pos| {
            let obj: JsonMap<String, JsonValue> = columns
                .iter()
                .map(|c| (c.to_string(), metadata_to_json(cell(table, pos, c))))
                .collect();
            JsonValue::Object(obj)
        })
        .collect();

    let file = std::fs::File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records)
        .context("writing JSON")?;
    Ok(())
}

fn metadata_to_json(val: &MetadataValue) -> JsonValue {
    match val {
        MetadataValue::String(s) => JsonValue::String(s.clone()),
        MetadataValue::Integer(i) => JsonValue::from(*i),
        // NaN / inf have no JSON representation.
        MetadataValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        MetadataValue::Bool(b) => JsonValue::Bool(*b),
        MetadataValue::Null => JsonValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

/// Arrow type chosen for a column from the values it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Boolean,
    Int64,
    Float64,
    Utf8,
}

impl ColumnKind {
    /// Narrowest kind holding every non-null value; ints widen to floats,
    /// anything else mixed falls back to strings.
    fn infer<'a>(values: impl Iterator<Item = &'a MetadataValue>) -> Self {
        let mut kind: Option<ColumnKind> = None;
        for v in values {
            let this = match v {
                MetadataValue::Null => continue,
                MetadataValue::Bool(_) => ColumnKind::Boolean,
                MetadataValue::Integer(_) => ColumnKind::Int64,
                MetadataValue::Float(_) => ColumnKind::Float64,
                MetadataValue::String(_) => ColumnKind::Utf8,
            };
            kind = Some(match (kind, this) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(ColumnKind::Int64), ColumnKind::Float64)
                | (Some(ColumnKind::Float64), ColumnKind::Int64) => ColumnKind::Float64,
                _ => ColumnKind::Utf8,
            });
        }
        kind.unwrap_or(ColumnKind::Utf8)
    }

    fn data_type(self) -> DataType {
        match self {
            ColumnKind::Boolean => DataType::Boolean,
            ColumnKind::Int64 => DataType::Int64,
            ColumnKind::Float64 => DataType::Float64,
            ColumnKind::Utf8 => DataType::Utf8,
        }
    }
}

fn build_array<'a>(kind: ColumnKind, values: impl Iterator<Item = &'a MetadataValue>) -> ArrayRef {
    match kind {
        ColumnKind::Boolean => {
            let mut b = BooleanBuilder::new();
            for v in values {
                b.append_option(v.as_bool());
            }
            Arc::new(b.finish())
        }
        ColumnKind::Int64 => {
            let mut b = Int64Builder::new();
            for v in values {
                match v {
                    MetadataValue::Integer(i) => b.append_value(*i),
                    _ => b.append_null(),
                }
            }
            Arc::new(b.finish())
        }
        ColumnKind::Float64 => {
            let mut b = Float64Builder::new();
            for v in values {
                match v {
                    MetadataValue::Float(f) => b.append_value(*f),
                    MetadataValue::Integer(i) => b.append_value(*i as f64),
                    _ => b.append_null(),
                }
            }
            Arc::new(b.finish())
        }
        ColumnKind::Utf8 => {
            let mut b = StringBuilder::new();
            for v in values {
                match v {
                    MetadataValue::Null => b.append_null(),
                    other => b.append_value(other.to_string()),
                }
            }
            Arc::new(b.finish())
        }
    }
}

fn write_parquet(table: &MetadataTable, path: &Path) -> Result<()> {
    let columns = output_columns(table);

    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays = Vec::with_capacity(columns.len());
    for column in &columns {
        let values = move || (0..table.len()).map(move |pos| cell(table, pos, column));
        let kind = ColumnKind::infer(values());
        fields.push(Field::new(*column, kind.data_type(), true));
        arrays.push(build_array(kind, values()));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
