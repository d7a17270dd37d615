use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use super::model::{DataFrame, Value};
use crate::error::Result;

/// Narrowest Arrow type able to hold every non-missing cell of a column.
fn infer_type(values: &[Value]) -> DataType {
    let present = || values.iter().filter(|v| !v.is_missing());
    if present().next().is_none() {
        DataType::Utf8
    } else if present().all(|v| matches!(v, Value::Integer(_))) {
        DataType::Int64
    } else if present().all(Value::is_numeric) {
        DataType::Float64
    } else if present().all(|v| matches!(v, Value::Bool(_))) {
        DataType::Boolean
    } else {
        DataType::Utf8
    }
}

fn to_array(values: &[Value], data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Int64 => Arc::new(Int64Array::from_iter(values.iter().map(|v| match v {
            Value::Integer(i) => Some(*i),
            _ => None,
        }))),
        DataType::Float64 => Arc::new(Float64Array::from_iter(
            values
                .iter()
                .map(|v| if v.is_missing() { None } else { v.as_f64() }),
        )),
        DataType::Boolean => Arc::new(BooleanArray::from_iter(values.iter().map(|v| match v {
            Value::Bool(b) => Some(*b),
            _ => None,
        }))),
        _ => Arc::new(StringArray::from_iter(
            values
                .iter()
                .map(|v| (!v.is_missing()).then(|| v.to_string())),
        )),
    }
}

impl DataFrame {
    /// Export as an Arrow record batch.  The row index becomes the first
    /// (string) column, named after the index name.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(self.ncols() + 1);
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.ncols() + 1);

        fields.push(Field::new(self.index_name().unwrap_or(""), DataType::Utf8, false));
        arrays.push(Arc::new(StringArray::from_iter_values(self.index())));

        for (name, values) in self.columns_iter() {
            let data_type = infer_type(values);
            arrays.push(to_array(values, &data_type));
            fields.push(Field::new(name, data_type, true));
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let batch = self.to_record_batch().map_err(|_| fmt::Error)?;
        let table = pretty_format_batches(&[batch]).map_err(|_| fmt::Error)?;
        write!(f, "{table}")
    }
}
