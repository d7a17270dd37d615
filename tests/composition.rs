use std::collections::BTreeMap;

use approx::assert_abs_diff_eq;
use demin::chem::{
    calculate_compositions, compositions_from_json, fragmentate, mass_percentage_distribution,
    Composition,
};
use demin::data::{DataFrame, Value};
use demin::DeminError;

fn formula(parts: &[(&str, f64)]) -> Composition {
    parts.iter().map(|&(el, q)| (el.to_string(), q)).collect()
}

#[test]
fn quartz_is_mostly_oxygen_by_mass() {
    let d = mass_percentage_distribution(&formula(&[("Si", 1.0), ("O", 2.0)])).unwrap();
    assert_abs_diff_eq!(d["Si"], 46.74, epsilon = 0.01);
    assert_abs_diff_eq!(d["O"], 53.26, epsilon = 0.01);
}

#[test]
fn distributions_sum_to_one_hundred() {
    for parts in [
        &[("Fe", 2.0), ("O", 3.0)][..],
        &[("Al", 2.0), ("Si", 2.0), ("O", 9.0), ("H", 4.0)][..],
        &[("Ca", 1.0), ("C", 1.0), ("O", 3.0)][..],
    ] {
        let d = mass_percentage_distribution(&formula(parts)).unwrap();
        assert_abs_diff_eq!(d.values().sum::<f64>(), 100.0, epsilon = 1e-9);
    }
}

#[test]
fn single_element_is_whole_mass() {
    let d = mass_percentage_distribution(&formula(&[("Au", 3.0)])).unwrap();
    assert_eq!(d.len(), 1);
    assert_abs_diff_eq!(d["Au"], 100.0, epsilon = 1e-12);
}

#[test]
fn unknown_symbol_is_rejected() {
    let err = mass_percentage_distribution(&formula(&[("Xx", 1.0)])).unwrap_err();
    assert!(matches!(err, DeminError::UnknownElement(s) if s == "Xx"));
}

#[test]
fn table_is_zero_filled_and_sorted() {
    let compositions = compositions_from_json(
        r#"{"Quartz": {"Si": 1, "O": 2}, "Hematite": {"Fe": 2, "O": 3}}"#,
    )
    .unwrap();
    let table = calculate_compositions(&compositions).unwrap();

    assert_eq!(table.index_name(), Some("Elements"));
    assert_eq!(table.index(), ["Fe", "O", "Si"]);
    assert_eq!(table.column_names(), ["Hematite", "Quartz"]);
    assert_eq!(table.value(0, "Quartz").unwrap(), &Value::Float(0.0));
    assert_eq!(table.value(2, "Hematite").unwrap(), &Value::Float(0.0));
    assert_abs_diff_eq!(table.numeric_column("Quartz").unwrap()[2], 46.74, epsilon = 1e-12);
}

#[test]
fn fragmentate_conserves_mass() {
    let mut compositions = BTreeMap::new();
    compositions.insert("Quartz".to_string(), formula(&[("Si", 1.0), ("O", 2.0)]));
    compositions.insert("Hematite".to_string(), formula(&[("Fe", 2.0), ("O", 3.0)]));

    let frame = DataFrame::from_columns([
        ("Hole", vec![Value::from("A"), Value::from("B")]),
        ("Quartz", vec![Value::Float(40.0), Value::Float(10.0)]),
        ("Hematite", vec![Value::Float(60.0), Value::Null]),
    ])
    .unwrap();

    let out = fragmentate(&frame, &compositions).unwrap();
    assert_eq!(out.column_names(), ["Fe", "Hole", "O", "Si"]);
    assert!(!out.has_column("Quartz") && !out.has_column("Hematite"));

    let totals: Vec<f64> = (0..out.len())
        .map(|r| {
            ["Fe", "O", "Si"]
                .iter()
                .map(|c| out.value(r, c).unwrap().as_f64().unwrap())
                .sum()
        })
        .collect();
    // Rounded percentages lose a little mass.
    assert_abs_diff_eq!(totals[0], 100.0, epsilon = 0.01);
    assert_abs_diff_eq!(totals[1], 10.0, epsilon = 0.01);
    // Missing hematite contributes no iron.
    assert_eq!(out.value(1, "Fe").unwrap().as_f64(), Some(0.0));
}

#[test]
fn fragmentate_needs_the_bulk_columns() {
    let mut compositions = BTreeMap::new();
    compositions.insert("Calcite".to_string(), formula(&[("Ca", 1.0), ("C", 1.0), ("O", 3.0)]));
    let frame = DataFrame::from_numeric_columns([("Quartz", vec![1.0])]).unwrap();
    assert!(matches!(
        fragmentate(&frame, &compositions),
        Err(DeminError::MissingColumn(c)) if c == "Calcite"
    ));
}
