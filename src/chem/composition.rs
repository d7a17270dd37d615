use std::collections::{BTreeMap, BTreeSet};

use super::elements::atomic_mass;
use crate::data::{DataFrame, Value};
use crate::error::{DeminError, Result};

/// Element symbol → stoichiometric quantity of one formula.
pub type Composition = BTreeMap<String, f64>;

/// Formula name → composition, e.g. `{"Quartz": {"Si": 1, "O": 2}}`.
pub type Compositions = BTreeMap<String, Composition>;

/// Element symbol → percent of the formula mass.
pub type PercentageDistribution = BTreeMap<String, f64>;

/// Parse compositions from JSON.
pub fn compositions_from_json(text: &str) -> Result<Compositions> {
    Ok(serde_json::from_str(text)?)
}

fn describe(composition: &Composition) -> String {
    composition
        .iter()
        .map(|(el, q)| format!("{el}{q}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mass share of each element in a formula, in percent.
pub fn mass_percentage_distribution(composition: &Composition) -> Result<PercentageDistribution> {
    let masses = composition
        .iter()
        .map(|(element, &quantity)| Ok((element.clone(), atomic_mass(element)? * quantity)))
        .collect::<Result<Vec<(String, f64)>>>()?;

    let total: f64 = masses.iter().map(|(_, m)| m).sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(DeminError::EmptyComposition(describe(composition)));
    }

    Ok(masses
        .into_iter()
        .map(|(element, mass)| (element, mass / total * 100.0))
        .collect())
}

/// Percentage table: one row per element (index `Elements`, sorted), one
/// column per composition (sorted by name), zero where a composition lacks
/// the element, rounded to two decimals.
pub fn calculate_compositions(compositions: &Compositions) -> Result<DataFrame> {
    let distributions = compositions
        .iter()
        .map(|(name, composition)| {
            mass_percentage_distribution(composition)
                .map(|d| (name.clone(), d))
                .map_err(|e| match e {
                    DeminError::EmptyComposition(_) => DeminError::EmptyComposition(name.clone()),
                    other => other,
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let elements: BTreeSet<&String> = distributions.iter().flat_map(|(_, d)| d.keys()).collect();

    let columns = distributions.iter().map(|(name, dist)| {
        let values = elements
            .iter()
            .map(|el| Value::Float(dist.get(*el).copied().unwrap_or(0.0)))
            .collect();
        (name.clone(), values)
    });

    let table = DataFrame::from_columns(columns)?
        .with_index(elements.iter().map(|e| e.to_string()))?
        .with_index_name("Elements")
        .round(2);
    log::debug!(
        "composition table: {} elements x {} compositions",
        table.len(),
        table.ncols()
    );
    Ok(table)
}

/// Split bulk composition columns of `frame` into elemental columns.
///
/// Every composition must be a column of `frame`.  Each element column is
/// `Σ bulk × percent / 100` over all compositions, so contributions from
/// several compositions to one element add up; missing bulk values
/// contribute nothing.  An element column replaces any existing column of
/// that name.  The bulk columns are dropped and columns sorted by name.
pub fn fragmentate(frame: &DataFrame, compositions: &Compositions) -> Result<DataFrame> {
    let table = calculate_compositions(compositions)?;
    let bulk_names = table.column_names().to_vec();

    let bulk = bulk_names
        .iter()
        .map(|name| frame.numeric_column(name))
        .collect::<Result<Vec<_>>>()?;
    let shares = bulk_names
        .iter()
        .map(|name| table.numeric_column(name))
        .collect::<Result<Vec<_>>>()?;

    let mut out = frame.clone();
    for (row, element) in table.index().iter().enumerate() {
        let mut values = vec![0.0; frame.len()];
        for (column, share) in bulk.iter().zip(&shares) {
            let pct = share[row];
            for (acc, &v) in values.iter_mut().zip(column) {
                if !v.is_nan() {
                    *acc += v * pct / 100.0;
                }
            }
        }
        out.insert_numeric_column(element.clone(), values)?;
    }

    log::debug!(
        "fragmentated {} bulk columns into {} elements",
        bulk_names.len(),
        table.len()
    );
    Ok(out.drop_columns(&bulk_names)?.sort_columns())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quartz() -> Composition {
        [("Si".to_string(), 1.0), ("O".to_string(), 2.0)].into_iter().collect()
    }

    #[test]
    fn quartz_distribution() {
        let d = mass_percentage_distribution(&quartz()).unwrap();
        assert_eq!(d.len(), 2);
        assert!((d["Si"] - 46.74).abs() < 0.01);
        assert!((d["O"] - 53.26).abs() < 0.01);
    }

    #[test]
    fn single_element_is_all_of_the_mass() {
        let gold: Composition = [("Au".to_string(), 3.0)].into_iter().collect();
        assert_eq!(mass_percentage_distribution(&gold).unwrap()["Au"], 100.0);
    }

    #[test]
    fn unknown_element_is_reported() {
        let bad: Composition = [("Qz".to_string(), 1.0)].into_iter().collect();
        assert!(matches!(
            mass_percentage_distribution(&bad),
            Err(DeminError::UnknownElement(s)) if s == "Qz"
        ));
    }

    #[test]
    fn massless_composition_names_the_formula() {
        let mut comps = Compositions::new();
        comps.insert("Nothing".into(), Composition::new());
        assert!(matches!(
            calculate_compositions(&comps),
            Err(DeminError::EmptyComposition(name)) if name == "Nothing"
        ));
    }

    #[test]
    fn compositions_parse_from_json() {
        let comps = compositions_from_json(r#"{"Quartz": {"Si": 1, "O": 2}}"#).unwrap();
        assert_eq!(comps["Quartz"], quartz());
    }
}
