use std::collections::BTreeMap;

use approx::assert_abs_diff_eq;
use demin::data::synthetic::{mineral_catalog, mixture_assay};
use demin::data::DataFrame;
use demin::fit::{Bounds, CompositionFitter, SolveStatus, PERCENT_ROW, PRED_ROW, SUM_COLUMN, TRUE_ROW};
use demin::DeminError;

fn identity() -> CompositionFitter {
    let x = DataFrame::from_numeric_columns([("A", vec![1.0, 0.0]), ("B", vec![0.0, 1.0])])
        .unwrap()
        .with_index(["Si", "Fe"])
        .unwrap();
    CompositionFitter::new(&x, &[0.3, 0.7]).unwrap()
}

#[test]
fn identity_problem_recovers_targets() {
    let mut fitter = identity();
    let stats = fitter.solve(Bounds::default(), false).unwrap();
    assert!(matches!(
        stats.status,
        SolveStatus::ConvergedGradient | SolveStatus::ConvergedStep | SolveStatus::ConvergedCost
    ));
    assert!(stats.cost < 1e-12);

    let w = fitter.weights().unwrap();
    assert_abs_diff_eq!(w[0], 0.3, epsilon = 1e-6);
    assert_abs_diff_eq!(w[1], 0.7, epsilon = 1e-6);

    let summary = fitter.summary().unwrap();
    assert_eq!(summary.minerals.index(), [PERCENT_ROW]);
    assert_eq!(summary.minerals.index_name(), Some("Mineral"));
    assert_abs_diff_eq!(summary.minerals.numeric_column("A").unwrap()[0], 30.0, epsilon = 1e-9);
    assert_abs_diff_eq!(
        summary.minerals.numeric_column(SUM_COLUMN).unwrap()[0],
        100.0,
        epsilon = 1e-9
    );
}

#[test]
fn comparison_sums_match_manual_product() {
    let x = DataFrame::from_numeric_columns([
        ("M1", vec![0.5, 0.25, 0.25]),
        ("M2", vec![0.1, 0.6, 0.3]),
    ])
    .unwrap()
    .with_index(["Si", "Fe", "O"])
    .unwrap();
    let y = [0.3, 0.4, 0.3];
    let mut fitter = CompositionFitter::new(&x, &y).unwrap();
    fitter.solve(Bounds::default(), false).unwrap();

    let w = fitter.weights().unwrap();
    let m1 = x.numeric_column("M1").unwrap();
    let m2 = x.numeric_column("M2").unwrap();
    let manual: f64 = (0..3).map(|i| m1[i] * w[0] + m2[i] * w[1]).sum();

    let summary = fitter.summary().unwrap();
    assert_eq!(summary.comparison.index(), [TRUE_ROW, PRED_ROW]);
    assert_eq!(summary.comparison.column_names(), ["Si", "Fe", "O", SUM_COLUMN]);
    let sums = summary.comparison.numeric_column(SUM_COLUMN).unwrap();
    assert_abs_diff_eq!(sums[0], 1.0, epsilon = 0.011);
    assert_abs_diff_eq!(sums[1], manual, epsilon = 0.02);
}

#[test]
fn summary_before_solve_is_an_error() {
    assert!(matches!(identity().summary(), Err(DeminError::NotSolved)));
    assert!(matches!(identity().predict(), Err(DeminError::NotSolved)));
}

#[test]
fn assay_length_must_match_rows() {
    let x = DataFrame::from_numeric_columns([("A", vec![1.0, 0.0])]).unwrap();
    assert!(CompositionFitter::new(&x, &[1.0]).is_err());
}

#[test]
fn recovers_mixture_proportions() {
    let catalog = mineral_catalog();
    let mut truth = BTreeMap::new();
    truth.insert("Hematite".to_string(), 0.5);
    truth.insert("Kaolinite".to_string(), 0.3);
    truth.insert("Quartz".to_string(), 0.2);
    let (x, y) = mixture_assay(&catalog, &truth, 0.0, 3).unwrap();

    let mut fitter = CompositionFitter::new(&x, &y).unwrap();
    fitter.solve(Bounds::default(), false).unwrap();
    let w = fitter.weights().unwrap();

    for (j, name) in fitter.features().iter().enumerate() {
        let expected = truth.get(name).copied().unwrap_or(0.0);
        assert_abs_diff_eq!(w[j], expected, epsilon = 0.02);
        assert!(w[j] >= 0.0);
    }
}
