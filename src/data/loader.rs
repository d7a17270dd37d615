use std::collections::BTreeMap;
use std::io::Read;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use serde_json::Value as JsonValue;

use super::model::{DataFrame, Value};
use crate::error::{DeminError, Result};

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

/// Parse a records-oriented JSON array (the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "X": 101.5, "Y": 20.0, "Z": -3.0, "Lithology": "Laterite" },
///   ...
/// ]
/// ```
pub fn from_json_records(text: &str) -> Result<DataFrame> {
    let root: JsonValue = serde_json::from_str(text)?;
    from_json_value(&root)
}

/// Same as [`from_json_records`] for an already parsed document.
pub fn from_json_value(root: &JsonValue) -> Result<DataFrame> {
    let records = root
        .as_array()
        .ok_or_else(|| DeminError::InvalidInput("expected top-level JSON array".into()))?;

    let rows = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .ok_or_else(|| DeminError::InvalidInput(format!("row {i} is not a JSON object")))?;
            Ok(obj
                .iter()
                .map(|(key, val)| (key.clone(), json_to_value(val)))
                .collect::<BTreeMap<_, _>>())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DataFrame::from_records(rows))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Read CSV text with a header row.  Cell types are guessed per cell.
pub fn read_csv<R: Read>(reader: R) -> Result<DataFrame> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        for (col_idx, column) in columns.iter_mut().enumerate() {
            column.push(guess_value_type(record.get(col_idx).unwrap_or("")));
        }
    }

    DataFrame::from_columns(headers.into_iter().zip(columns))
}

fn guess_value_type(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("na") {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Arrow
// ---------------------------------------------------------------------------

/// Convert an Arrow record batch; one frame column per field.
pub fn from_record_batch(batch: &RecordBatch) -> Result<DataFrame> {
    let schema = batch.schema();
    let columns = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, col)| {
            let values = (0..batch.num_rows())
                .map(|row| extract_value(col, row))
                .collect::<Result<Vec<_>>>()?;
            Ok((field.name().clone(), values))
        })
        .collect::<Result<Vec<_>>>()?;
    DataFrame::from_columns(columns)
}

/// Extract a single value from an Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        _ => Value::String(arrow::util::display::array_value_to_string(col.as_ref(), row)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_cells_are_typed() {
        let text = "X,Y,Z,Lithology,Fe\n1,2.5,-3,Laterite,\n4,5,6,,41.2\n";
        let df = read_csv(text.as_bytes()).unwrap();
        assert_eq!(df.len(), 2);
        assert_eq!(df.value(0, "X").unwrap(), &Value::Integer(1));
        assert_eq!(df.value(0, "Y").unwrap(), &Value::Float(2.5));
        assert_eq!(df.value(0, "Lithology").unwrap(), &Value::from("Laterite"));
        assert!(df.value(0, "Fe").unwrap().is_missing());
        assert!(df.value(1, "Lithology").unwrap().is_missing());
    }

    #[test]
    fn json_records_fill_missing_keys() {
        let df = from_json_records(r#"[{"X": 1, "Lith": "a"}, {"X": 2.5}]"#).unwrap();
        assert_eq!(df.numeric_column("X").unwrap(), vec![1.0, 2.5]);
        assert_eq!(df.value(1, "Lith").unwrap(), &Value::Null);
    }

    #[test]
    fn json_root_must_be_an_array() {
        assert!(matches!(
            from_json_records(r#"{"X": 1}"#),
            Err(DeminError::InvalidInput(_))
        ));
    }

    #[test]
    fn record_batch_round_trips_through_frame() {
        let df = read_csv("A,B,C\n1,x,0.5\n,y,\n".as_bytes()).unwrap();
        let batch = df.to_record_batch().unwrap();
        let back = from_record_batch(&batch).unwrap();
        // The index column comes first in the exported batch.
        assert_eq!(back.column_names()[1..], df.column_names()[..]);
        assert_eq!(back.value(1, "A").unwrap(), &Value::Null);
        assert_eq!(back.value(0, "B").unwrap(), &Value::from("x"));
    }
}
