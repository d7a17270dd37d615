//! Deterministic synthetic assay data used by the viewer and by tests.

use std::collections::BTreeMap;

use super::model::{DataFrame, Value};
use crate::chem::{calculate_compositions, Composition, Compositions};
use crate::error::Result;

/// Minimal deterministic PRNG (xoshiro256**)
pub struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    pub fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Iron content of pure hematite, in percent.
const HEMATITE_FE: f64 = 69.94;

fn lithology(depth: f64) -> &'static str {
    if depth < 10.0 {
        "Laterite"
    } else if depth < 30.0 {
        "Saprolite"
    } else {
        "Fresh rock"
    }
}

/// A grid of vertical drill holes through a lateritic iron profile.
///
/// Columns: `Hole`, `X`, `Y`, `Z`, `Depth`, `Lithology`, `Fe` and the bulk
/// mineral columns `Hematite`, `Kaolinite`, `Quartz` (percent).  A few cells
/// are left missing on purpose: every 41st `Z`, every 23rd `Lithology` and
/// every 17th `Fe`.
pub fn drillholes(seed: u64, holes: usize, samples_per_hole: usize) -> Result<DataFrame> {
    let mut rng = SimpleRng::new(seed);
    let mut records = Vec::with_capacity(holes * samples_per_hole);

    for h in 0..holes {
        let cx = 1000.0 + 50.0 * (h % 5) as f64 + rng.gauss(0.0, 5.0);
        let cy = 2000.0 + 50.0 * (h / 5) as f64 + rng.gauss(0.0, 5.0);
        let cz = 500.0 + rng.gauss(0.0, 3.0);

        for s in 0..samples_per_hole {
            let n = records.len();
            let depth = 2.0 * s as f64 + 1.0;

            let fe = (55.0 - 0.8 * depth + rng.gauss(0.0, 2.0)).max(5.0);
            let hematite = (fe / HEMATITE_FE * 100.0).min(90.0);
            let gangue = (100.0 - hematite) * (0.9 + 0.1 * rng.next_f64());
            let kaolinite_share = if depth < 30.0 { 0.6 } else { 0.3 };

            let mut rec = BTreeMap::new();
            rec.insert("Hole".to_string(), Value::String(format!("DH-{h:02}")));
            rec.insert("X".to_string(), Value::Float(cx + 0.05 * depth));
            rec.insert("Y".to_string(), Value::Float(cy - 0.02 * depth));
            rec.insert(
                "Z".to_string(),
                if n % 41 == 40 {
                    Value::Null
                } else {
                    Value::Float(cz - depth)
                },
            );
            rec.insert("Depth".to_string(), Value::Float(depth));
            rec.insert(
                "Lithology".to_string(),
                if n % 23 == 22 {
                    Value::Null
                } else {
                    Value::from(lithology(depth))
                },
            );
            rec.insert(
                "Fe".to_string(),
                if n % 17 == 16 {
                    Value::Float(f64::NAN)
                } else {
                    Value::Float(fe)
                },
            );
            rec.insert("Hematite".to_string(), Value::Float(hematite));
            rec.insert("Kaolinite".to_string(), Value::Float(gangue * kaolinite_share));
            rec.insert("Quartz".to_string(), Value::Float(gangue * (1.0 - kaolinite_share)));
            records.push(rec);
        }
    }

    let frame = DataFrame::from_records(records);
    // Keep a spreadsheet-like column order rather than alphabetical.
    frame.select(&[
        "Hole", "X", "Y", "Z", "Depth", "Lithology", "Fe", "Hematite", "Kaolinite", "Quartz",
    ])
}

/// Formulas of the minerals in [`drillholes`], plus goethite.
pub fn mineral_catalog() -> Compositions {
    fn formula(parts: &[(&str, f64)]) -> Composition {
        parts.iter().map(|&(el, q)| (el.to_string(), q)).collect()
    }

    let mut catalog = Compositions::new();
    catalog.insert("Quartz".into(), formula(&[("Si", 1.0), ("O", 2.0)]));
    catalog.insert("Hematite".into(), formula(&[("Fe", 2.0), ("O", 3.0)]));
    catalog.insert(
        "Kaolinite".into(),
        formula(&[("Al", 2.0), ("Si", 2.0), ("O", 9.0), ("H", 4.0)]),
    );
    catalog.insert("Goethite".into(), formula(&[("Fe", 1.0), ("O", 2.0), ("H", 1.0)]));
    catalog
}

/// Elemental assay of a mineral mixture, shaped for the composition fitter.
///
/// Returns `(X, y)`: `X` has one row per element and one column per mineral
/// holding the element's mass fraction in that mineral; `y` is the mixture's
/// elemental mass fraction for the given `proportions` plus Gaussian noise
/// of `noise` (absolute, clipped at zero).  Minerals absent from
/// `proportions` take no part in the mixture.
pub fn mixture_assay(
    compositions: &Compositions,
    proportions: &BTreeMap<String, f64>,
    noise: f64,
    seed: u64,
) -> Result<(DataFrame, Vec<f64>)> {
    let table = calculate_compositions(compositions)?;
    let minerals: Vec<String> = table.column_names().to_vec();

    let fractions = minerals
        .iter()
        .map(|m| {
            let pct = table.numeric_column(m)?;
            Ok((m.clone(), pct.into_iter().map(|p| p / 100.0).collect::<Vec<_>>()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rng = SimpleRng::new(seed);
    let y = (0..table.len())
        .map(|row| {
            let clean: f64 = fractions
                .iter()
                .map(|(m, col)| col[row] * proportions.get(m).copied().unwrap_or(0.0))
                .sum();
            (clean + rng.gauss(0.0, noise)).max(0.0)
        })
        .collect();

    let x = DataFrame::from_numeric_columns(fractions)?
        .with_index(table.index().to_vec())?
        .with_index_name("Elements");
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_is_deterministic() {
        let mut a = SimpleRng::new(7);
        let mut b = SimpleRng::new(7);
        for _ in 0..10 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn drillholes_have_expected_shape_and_gaps() {
        let df = drillholes(42, 4, 30).unwrap();
        assert_eq!(df.len(), 120);
        assert_eq!(df.column_names()[..4], ["Hole", "X", "Y", "Z"]);
        let z = df.numeric_column("Z").unwrap();
        assert_eq!(z.iter().filter(|v| v.is_nan()).count(), 120 / 41);
        assert!(df.unique_values("Lithology").unwrap().len() == 3);
    }

    #[test]
    fn noiseless_mixture_matches_proportions() {
        let catalog = mineral_catalog();
        let mut p = BTreeMap::new();
        p.insert("Quartz".to_string(), 1.0);
        let (x, y) = mixture_assay(&catalog, &p, 0.0, 1).unwrap();
        assert_eq!(x.ncols(), catalog.len());
        // Pure quartz: only Si and O are present and they make up the whole mass.
        let total: f64 = y.iter().sum();
        assert!((total - 1.0).abs() < 1e-3);
    }
}
