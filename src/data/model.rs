use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use nalgebra::DMatrix;

use super::filter;
use crate::error::{DeminError, Result};

// ---------------------------------------------------------------------------
// Value – a single cell of a DataFrame
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `Value` must be `Ord`.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --
//
// Equality is defined by `cmp`, so `0.0 == -0.0` for grouping and hashing
// alike.

/// `-0.0` folded onto `0.0`; every other value unchanged.
fn unsigned_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => unsigned_zero(*a).total_cmp(&unsigned_zero(*b)),
            // Mixed numeric columns sort by magnitude, ints first on ties.
            (Integer(a), Float(b)) => (*a as f64)
                .total_cmp(&unsigned_zero(*b))
                .then(std::cmp::Ordering::Less),
            (Float(a), Integer(b)) => unsigned_zero(*a)
                .total_cmp(&(*b as f64))
                .then(std::cmp::Ordering::Greater),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => unsigned_zero(*f).to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Value {
    /// Try to interpret the value as an `f64` for numeric work.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// `Null` and `NaN` both count as missing, like `pandas.isna`.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }
}

/// Round half to even, matching `numpy.around`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

// ---------------------------------------------------------------------------
// DataFrame – a small column-labelled table
// ---------------------------------------------------------------------------

/// Column-major table of [`Value`] cells with a string row index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
    index: Vec<String>,
    index_name: Option<String>,
}

impl DataFrame {
    /// Build a frame from `(name, values)` pairs.  All columns must have the
    /// same length; a repeated name replaces the earlier column.
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Vec<Value>)>,
    ) -> Result<Self> {
        let mut frame = DataFrame::default();
        let mut nrows: Option<usize> = None;
        for (name, values) in columns {
            match nrows {
                None => {
                    nrows = Some(values.len());
                    frame.index = default_index(values.len());
                }
                Some(n) if n != values.len() => {
                    return Err(DeminError::DimensionMismatch {
                        expected: n,
                        got: values.len(),
                    });
                }
                Some(_) => {}
            }
            frame.insert_column(name, values)?;
        }
        Ok(frame)
    }

    /// Build a frame of float columns.
    pub fn from_numeric_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Vec<f64>)>,
    ) -> Result<Self> {
        Self::from_columns(
            columns
                .into_iter()
                .map(|(name, values)| (name, values.into_iter().map(Value::Float).collect())),
        )
    }

    /// Build a frame from records.  Columns appear in first-seen order and
    /// cells absent from a record become `Null`.
    pub fn from_records(records: Vec<BTreeMap<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for rec in &records {
            for key in rec.keys() {
                if seen.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
        }
        let data = columns
            .iter()
            .map(|col| {
                records
                    .iter()
                    .map(|rec| rec.get(col).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        DataFrame {
            columns,
            data,
            index: default_index(records.len()),
            index_name: None,
        }
    }

    /// Replace the row labels.
    pub fn with_index<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if !self.columns.is_empty() && labels.len() != self.len() {
            return Err(DeminError::DimensionMismatch {
                expected: self.len(),
                got: labels.len(),
            });
        }
        self.index = labels;
        Ok(self)
    }

    /// Name the row index, like `rename_axis`.
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| DeminError::MissingColumn(name.to_string()))
    }

    /// Borrow a column's cells.
    pub fn column(&self, name: &str) -> Result<&[Value]> {
        let idx = self.require(name)?;
        Ok(&self.data[idx])
    }

    /// Cell at `(row, column)`.
    pub fn value(&self, row: usize, column: &str) -> Result<&Value> {
        let col = self.column(column)?;
        col.get(row).ok_or(DeminError::DimensionMismatch {
            expected: self.len(),
            got: row,
        })
    }

    /// Column as `f64`; missing cells become `NaN`, text is an error.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?
            .iter()
            .enumerate()
            .map(|(row, v)| match v {
                v if v.is_missing() => Ok(f64::NAN),
                v => v.as_f64().ok_or_else(|| DeminError::NonNumeric {
                    column: name.to_string(),
                    row,
                    value: v.to_string(),
                }),
            })
            .collect()
    }

    /// Whether every non-missing cell of the column is numeric.
    pub fn is_numeric_column(&self, name: &str) -> Result<bool> {
        Ok(self
            .column(name)?
            .iter()
            .all(|v| v.is_missing() || v.is_numeric()))
    }

    /// Sorted distinct non-missing values of a column.
    pub fn unique_values(&self, name: &str) -> Result<BTreeSet<Value>> {
        Ok(self
            .column(name)?
            .iter()
            .filter(|v| !v.is_missing())
            .cloned()
            .collect())
    }

    /// Rows whose `subset` cells are all present.
    pub fn drop_na(&self, subset: &[&str]) -> Result<Self> {
        let keep = filter::complete_indices(self, subset)?;
        Ok(self.take_rows(&keep))
    }

    /// New frame holding the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        DataFrame {
            columns: self.columns.clone(),
            data: self
                .data
                .iter()
                .map(|col| rows.iter().map(|&r| col[r].clone()).collect())
                .collect(),
            index: rows.iter().map(|&r| self.index[r].clone()).collect(),
            index_name: self.index_name.clone(),
        }
    }

    /// Rows whose `column` cell satisfies `predicate`.
    pub fn filter_rows(&self, column: &str, predicate: impl Fn(&Value) -> bool) -> Result<Self> {
        let keep: Vec<usize> = self
            .column(column)?
            .iter()
            .enumerate()
            .filter(|(_, v)| predicate(v))
            .map(|(i, _)| i)
            .collect();
        Ok(self.take_rows(&keep))
    }

    /// Swap rows and columns: index labels become column names and the other
    /// way round.  The index name is kept.  Index labels must be unique.
    pub fn transpose(&self) -> Result<Self> {
        let labels: BTreeSet<&String> = self.index.iter().collect();
        if labels.len() != self.index.len() {
            return Err(DeminError::InvalidInput(
                "cannot transpose a frame with duplicate index labels".into(),
            ));
        }
        let data = (0..self.len())
            .map(|r| self.data.iter().map(|col| col[r].clone()).collect())
            .collect();
        Ok(DataFrame {
            columns: self.index.clone(),
            data,
            index: self.columns.clone(),
            index_name: self.index_name.clone(),
        })
    }

    /// Insert a column, replacing an existing one of the same name in place.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.columns.is_empty() && self.index.is_empty() {
            self.index = default_index(values.len());
        } else if values.len() != self.len() {
            return Err(DeminError::DimensionMismatch {
                expected: self.len(),
                got: values.len(),
            });
        }
        match self.position(&name) {
            Some(idx) => self.data[idx] = values,
            None => {
                self.columns.push(name);
                self.data.push(values);
            }
        }
        Ok(())
    }

    pub fn insert_numeric_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        self.insert_column(name, values.into_iter().map(Value::Float).collect())
    }

    /// Drop columns by name; every name must exist.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        for name in names {
            self.require(name.as_ref())?;
        }
        let keep: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| !names.iter().any(|n| n.as_ref() == *c))
            .collect();
        self.select(&keep)
    }

    /// New frame with only the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut columns = Vec::with_capacity(names.len());
        let mut data = Vec::with_capacity(names.len());
        for name in names {
            let idx = self.require(name.as_ref())?;
            columns.push(self.columns[idx].clone());
            data.push(self.data[idx].clone());
        }
        Ok(DataFrame {
            columns,
            data,
            index: self.index.clone(),
            index_name: self.index_name.clone(),
        })
    }

    /// Columns reordered alphabetically.
    pub fn sort_columns(&self) -> Self {
        let mut names: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        names.sort_unstable();
        // All names come from `self`, so selection cannot fail.
        self.select(&names).unwrap_or_else(|_| self.clone())
    }

    /// Round every float cell.
    pub fn round(&self, decimals: u32) -> Self {
        let mut out = self.clone();
        for col in &mut out.data {
            for v in col.iter_mut() {
                if let Value::Float(f) = v {
                    *f = round_to(*f, decimals);
                }
            }
        }
        out
    }

    /// Row-wise sum of numeric cells, skipping missing ones.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.len())
            .map(|r| {
                self.data
                    .iter()
                    .filter_map(|col| col[r].as_f64())
                    .filter(|v| !v.is_nan())
                    .sum()
            })
            .collect()
    }

    /// Numeric columns as a dense `nrows × columns.len()` matrix.
    pub fn to_matrix<S: AsRef<str>>(&self, columns: &[S]) -> Result<DMatrix<f64>> {
        let cols = columns
            .iter()
            .map(|c| self.numeric_column(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(DMatrix::from_fn(self.len(), cols.len(), |r, c| cols[c][r]))
    }

    /// Row `r` as a record.
    pub fn record(&self, r: usize) -> BTreeMap<String, Value> {
        self.columns
            .iter()
            .zip(&self.data)
            .map(|(name, col)| (name.clone(), col[r].clone()))
            .collect()
    }

    pub(crate) fn columns_iter(&self) -> impl Iterator<Item = (&String, &Vec<Value>)> {
        self.columns.iter().zip(&self.data)
    }
}

fn default_index(n: usize) -> Vec<String> {
    (0..n).map(|i| i.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::from_columns([
            ("b", vec![Value::Float(1.0), Value::Null, Value::Integer(3)]),
            ("a", vec![Value::from("x"), Value::from("y"), Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn missing_values_include_nan_and_null() {
        assert!(Value::Null.is_missing());
        assert!(Value::Float(f64::NAN).is_missing());
        assert!(!Value::Float(0.0).is_missing());
        assert!(!Value::from("").is_missing());
    }

    #[test]
    fn signed_zeros_are_one_value() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let (pos, neg) = (Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(pos, neg);
        assert_eq!(pos.cmp(&neg), std::cmp::Ordering::Equal);
        let hash = |v: &Value| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&pos), hash(&neg));

        let set: BTreeSet<Value> = [pos, neg, Value::Float(1.0)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn mixed_numeric_values_sort_by_magnitude() {
        let set: BTreeSet<Value> = [Value::Float(2.5), Value::Integer(1), Value::Integer(3)]
            .into_iter()
            .collect();
        let ordered: Vec<f64> = set.iter().filter_map(Value::as_f64).collect();
        assert_eq!(ordered, vec![1.0, 2.5, 3.0]);
    }

    #[test]
    fn mismatched_column_lengths_are_rejected() {
        let err = DataFrame::from_numeric_columns([("a", vec![1.0]), ("b", vec![1.0, 2.0])]);
        assert!(matches!(
            err,
            Err(DeminError::DimensionMismatch { expected: 1, got: 2 })
        ));
    }

    #[test]
    fn drop_na_keeps_index_labels() {
        let df = sample().drop_na(&["b"]).unwrap();
        assert_eq!(df.index(), &["0".to_string(), "2".to_string()]);
        assert_eq!(df.numeric_column("b").unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn numeric_column_rejects_text() {
        let err = sample().numeric_column("a").unwrap_err();
        assert!(matches!(err, DeminError::NonNumeric { row: 0, .. }));
    }

    #[test]
    fn insert_replaces_existing_column_in_place() {
        let mut df = sample();
        df.insert_numeric_column("b", vec![9.0, 8.0, 7.0]).unwrap();
        assert_eq!(df.column_names(), &["b".to_string(), "a".to_string()]);
        assert_eq!(df.numeric_column("b").unwrap(), vec![9.0, 8.0, 7.0]);
    }

    #[test]
    fn sort_and_drop_columns() {
        let df = sample().sort_columns();
        assert_eq!(df.column_names(), &["a".to_string(), "b".to_string()]);
        let dropped = df.drop_columns(&["a"]).unwrap();
        assert_eq!(dropped.column_names(), &["b".to_string()]);
        assert!(df.drop_columns(&["zz"]).is_err());
    }

    #[test]
    fn filter_rows_by_predicate() {
        let df = sample().filter_rows("a", |v| !v.is_missing()).unwrap();
        assert_eq!(df.len(), 2);
        assert_eq!(df.index(), &["0".to_string(), "1".to_string()]);
        assert!(sample().filter_rows("zz", |_| true).is_err());
    }

    #[test]
    fn transpose_swaps_labels() {
        let df = DataFrame::from_numeric_columns([("Quartz", vec![46.74, 53.26])])
            .unwrap()
            .with_index(["Si", "O"])
            .unwrap()
            .with_index_name("Elements");
        let t = df.transpose().unwrap();
        assert_eq!(t.column_names(), &["Si".to_string(), "O".to_string()]);
        assert_eq!(t.index(), &["Quartz".to_string()]);
        assert_eq!(t.numeric_column("O").unwrap(), vec![53.26]);
        assert_eq!(t.transpose().unwrap(), df);
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(46.7435, 2), 46.74);
    }

    #[test]
    fn row_sums_skip_missing_and_text() {
        assert_eq!(sample().row_sums(), vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn records_fill_absent_cells_with_null() {
        let mut r0 = BTreeMap::new();
        r0.insert("x".to_string(), Value::Integer(1));
        let mut r1 = BTreeMap::new();
        r1.insert("y".to_string(), Value::from("a"));
        let df = DataFrame::from_records(vec![r0, r1]);
        assert_eq!(df.column_names(), &["x".to_string(), "y".to_string()]);
        assert_eq!(df.value(1, "x").unwrap(), &Value::Null);
    }
}
