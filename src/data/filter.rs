use std::collections::BTreeMap;

use super::model::{DataFrame, Value};
use crate::error::Result;

/// Row groups keyed by a column's distinct values, in sorted value order.
pub type Groups = BTreeMap<Value, Vec<usize>>;

/// Return indices of rows whose cells in every `subset` column are present.
///
/// A row passes when:
/// * none of the `subset` cells is `Null` or `NaN`
/// * an empty `subset` imposes no constraint
pub fn complete_indices(frame: &DataFrame, subset: &[&str]) -> Result<Vec<usize>> {
    let columns = subset
        .iter()
        .map(|name| frame.column(name))
        .collect::<Result<Vec<_>>>()?;

    Ok((0..frame.len())
        .filter(|&row| columns.iter().all(|col| !col[row].is_missing()))
        .collect())
}

/// Partition rows by the distinct non-missing values of `column`.
///
/// Rows with a missing value belong to no group, so a column that is
/// entirely missing yields an empty map.
pub fn group_indices(frame: &DataFrame, column: &str) -> Result<Groups> {
    let mut groups = Groups::new();
    for (row, value) in frame.column(column)?.iter().enumerate() {
        if value.is_missing() {
            continue;
        }
        groups.entry(value.clone()).or_default().push(row);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::from_columns([
            (
                "lith",
                vec![
                    Value::from("b"),
                    Value::from("a"),
                    Value::Null,
                    Value::from("b"),
                ],
            ),
            (
                "z",
                vec![
                    Value::Float(1.0),
                    Value::Float(f64::NAN),
                    Value::Float(3.0),
                    Value::Float(4.0),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn complete_rows_skip_nan_and_null() {
        assert_eq!(complete_indices(&frame(), &["lith", "z"]).unwrap(), vec![0, 3]);
        assert_eq!(complete_indices(&frame(), &[]).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn groups_are_sorted_and_skip_missing() {
        let groups = group_indices(&frame(), "lith").unwrap();
        let keys: Vec<String> = groups.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(groups[&Value::from("b")], vec![0, 3]);
    }

    #[test]
    fn signed_zeros_share_a_group() {
        let df = DataFrame::from_numeric_columns([("v", vec![0.0, -0.0, 1.0])]).unwrap();
        let groups = group_indices(&df, "v").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&Value::Float(0.0)], vec![0, 1]);
    }

    #[test]
    fn all_missing_column_has_no_groups() {
        let df = DataFrame::from_columns([("v", vec![Value::Null, Value::Null])]).unwrap();
        assert!(group_indices(&df, "v").unwrap().is_empty());
    }

    #[test]
    fn unknown_column_is_an_error() {
        assert!(complete_indices(&frame(), &["nope"]).is_err());
    }
}
