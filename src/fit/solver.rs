//! Bound-constrained linear least squares.
//!
//! Minimizes `||X w - y||^2` subject to `lower <= w_j <= upper` for every j.
//!
//! How [`ProjectedNewton`] works (high level):
//! - Compute the gradient `g = 2 X^T (X w - y)`.
//! - Pin the variables sitting on a bound whose gradient pushes outward.
//! - Solve the unconstrained subproblem on the free variables with SVD.
//! - Backtrack along the projected path `P(w + t d)` until the cost drops
//!   (Armijo); fall back to a projected gradient step of length `1 / L`.
//! - A vanishing Newton step is not convergence by itself: the next step
//!   follows the projected gradient, and only when that step vanishes too
//!   does the solve stop with [`SolveStatus::ConvergedStep`].
//!
//! Any other optimizer can be plugged in through [`BoundedLeastSquares`].

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while validating or running a solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// `X` and `y` disagree on the number of samples, or either is empty.
    #[error("dimension mismatch: X is {nrows}x{ncols}, y has {ylen} values")]
    DimensionMismatch {
        nrows: usize,
        ncols: usize,
        ylen: usize,
    },
    #[error("invalid bounds [{lower}, {upper}]")]
    InvalidBounds { lower: f64, upper: f64 },
    #[error("non-finite value in the problem data")]
    NonFinite,
    /// The linear algebra broke down (SVD failure, cost overflow).
    #[error("numerical failure: {0}")]
    NumericalFailure(String),
    #[error("no convergence after {iterations} iterations (projected gradient {grad_inf:.3e})")]
    MaxIterations { iterations: usize, grad_inf: f64 },
}

/// Closed interval applied to every weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 1.0,
        }
    }
}

impl From<[f64; 2]> for Bounds {
    fn from([lower, upper]: [f64; 2]) -> Self {
        Self { lower, upper }
    }
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Result<Self, SolverError> {
        Self { lower, upper }.validate()
    }

    pub fn validate(self) -> Result<Self, SolverError> {
        if self.lower.is_finite() && self.upper.is_finite() && self.lower <= self.upper {
            Ok(self)
        } else {
            Err(SolverError::InvalidBounds {
                lower: self.lower,
                upper: self.upper,
            })
        }
    }

    /// Intersect with `[0, ∞)`.
    pub fn non_negative(self) -> Self {
        Self {
            lower: self.lower.max(0.0),
            upper: self.upper,
        }
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.lower, self.upper)
    }

    fn project(&self, w: &mut DVector<f64>) {
        w.apply(|v| *v = self.clamp(*v));
    }
}

/// Options controlling the solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Maximum number of iterations.
    pub max_iters: usize,
    /// Converge when the projected gradient's inf-norm is at most
    /// `grad_tol * max(1, ||2 X^T y||_inf)`.
    pub grad_tol: f64,
    /// Converge when a projected gradient step moves
    /// `||Δw||_2 <= step_tol * (||w||_2 + step_tol)`.
    pub step_tol: f64,
    /// Converge when `||X w - y||^2 <= cost_tol`.
    pub cost_tol: f64,
    /// Log every iteration at info level.
    pub verbose: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iters: 100,
            grad_tol: 1e-9,
            step_tol: 1e-12,
            cost_tol: 1e-20,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    ConvergedGradient,
    ConvergedStep,
    ConvergedCost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverStats {
    pub status: SolveStatus,
    pub iterations: usize,
    /// Final objective `||X w - y||^2`.
    pub cost: f64,
    /// Final projected gradient inf-norm.
    pub grad_inf: f64,
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub weights: DVector<f64>,
    pub stats: SolverStats,
}

/// A solver for `min ||X w - y||^2` over a box.
pub trait BoundedLeastSquares {
    fn solve(
        &self,
        x: &DMatrix<f64>,
        y: &DVector<f64>,
        bounds: Bounds,
        options: &SolverOptions,
    ) -> Result<Solution, SolverError>;
}

/// Active-set projected Newton method; see the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectedNewton;

/// Sufficient-decrease constant of the Armijo test.
const ARMIJO: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;
const SVD_EPS: f64 = 1e-12;

fn cost(x: &DMatrix<f64>, y: &DVector<f64>, w: &DVector<f64>) -> f64 {
    (x * w - y).norm_squared()
}

/// Inf-norm of the gradient restricted to directions that stay feasible.
fn projected_grad_inf(w: &DVector<f64>, g: &DVector<f64>, bounds: &Bounds) -> f64 {
    w.iter()
        .zip(g.iter())
        .map(|(&wi, &gi)| {
            if (wi <= bounds.lower && gi > 0.0) || (wi >= bounds.upper && gi < 0.0) {
                0.0
            } else {
                gi.abs()
            }
        })
        .fold(0.0, f64::max)
}

/// Projected gradient step of length `1 / L`; it never increases the cost.
fn gradient_step(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    w: &DVector<f64>,
    g: &DVector<f64>,
    bounds: &Bounds,
    lipschitz: f64,
) -> (DVector<f64>, f64) {
    let mut trial = if lipschitz > 0.0 { w - g / lipschitz } else { w.clone() };
    bounds.project(&mut trial);
    let trial_cost = cost(x, y, &trial);
    (trial, trial_cost)
}

pub(crate) fn validate_problem(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
) -> Result<(), SolverError> {
    if x.nrows() == 0 || x.ncols() == 0 || x.nrows() != y.len() {
        return Err(SolverError::DimensionMismatch {
            nrows: x.nrows(),
            ncols: x.ncols(),
            ylen: y.len(),
        });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(SolverError::NonFinite);
    }
    Ok(())
}

impl ProjectedNewton {
    /// Newton direction on the free variables, zero on the pinned ones.
    fn newton_direction(
        x: &DMatrix<f64>,
        residual: &DVector<f64>,
        free: &[usize],
    ) -> Result<DVector<f64>, SolverError> {
        let xf = x.select_columns(free.iter());
        let rhs = -residual;
        let df = xf
            .svd(true, true)
            .solve(&rhs, SVD_EPS)
            .map_err(|e| SolverError::NumericalFailure(e.to_string()))?;
        let mut d = DVector::zeros(x.ncols());
        for (k, &j) in free.iter().enumerate() {
            d[j] = df[k];
        }
        Ok(d)
    }

    /// Newton direction on the free set with projected Armijo backtracking.
    /// `None` when no trial point passes the sufficient-decrease test.
    fn newton_step(
        x: &DMatrix<f64>,
        y: &DVector<f64>,
        w: &DVector<f64>,
        g: &DVector<f64>,
        residual: &DVector<f64>,
        current: f64,
        bounds: &Bounds,
    ) -> Result<Option<(DVector<f64>, f64)>, SolverError> {
        let free: Vec<usize> = (0..w.len())
            .filter(|&j| {
                !((w[j] <= bounds.lower && g[j] > 0.0) || (w[j] >= bounds.upper && g[j] < 0.0))
            })
            .collect();
        if free.is_empty() {
            return Ok(None);
        }

        let d = Self::newton_direction(x, residual, &free)?;
        let mut t = 1.0;
        for _ in 0..MAX_BACKTRACKS {
            let mut trial = w + t * &d;
            bounds.project(&mut trial);
            let trial_cost = cost(x, y, &trial);
            if trial_cost <= current + ARMIJO * g.dot(&(&trial - w)) {
                return Ok(Some((trial, trial_cost)));
            }
            t *= 0.5;
        }
        Ok(None)
    }

    /// Starting point: the unconstrained least-squares solution, projected.
    fn initial_point(x: &DMatrix<f64>, y: &DVector<f64>, bounds: &Bounds) -> DVector<f64> {
        let mid = 0.5 * (bounds.lower + bounds.upper);
        let mut w = x
            .clone()
            .svd(true, true)
            .solve(y, SVD_EPS)
            .ok()
            .filter(|w| w.iter().all(|v| v.is_finite()))
            .unwrap_or_else(|| DVector::from_element(x.ncols(), mid));
        bounds.project(&mut w);
        w
    }
}

impl BoundedLeastSquares for ProjectedNewton {
    fn solve(
        &self,
        x: &DMatrix<f64>,
        y: &DVector<f64>,
        bounds: Bounds,
        options: &SolverOptions,
    ) -> Result<Solution, SolverError> {
        validate_problem(x, y)?;
        let bounds = bounds.validate()?;

        // Gradient Lipschitz constant of ||Xw - y||^2 is 2 * sigma_max^2.
        let sigma_max = x.singular_values().max();
        let lipschitz = 2.0 * sigma_max * sigma_max;
        let grad_scale = (2.0 * x.tr_mul(y)).amax().max(1.0);
        let grad_tol = options.grad_tol * grad_scale;

        let mut w = Self::initial_point(x, y, &bounds);
        let mut current = cost(x, y, &w);
        let mut grad_inf = f64::INFINITY;
        // Set after a Newton step stalls; the next step follows the projected gradient.
        let mut stalled = false;

        for iter in 0..options.max_iters {
            if !current.is_finite() {
                return Err(SolverError::NumericalFailure(format!(
                    "non-finite cost at iteration {iter}"
                )));
            }
            let residual = x * &w - y;
            let g = 2.0 * x.tr_mul(&residual);
            grad_inf = projected_grad_inf(&w, &g, &bounds);

            if options.verbose {
                log::info!("iter {iter:>3}  cost {current:.6e}  |pg| {grad_inf:.3e}");
            } else {
                log::trace!("iter {iter:>3}  cost {current:.6e}  |pg| {grad_inf:.3e}");
            }

            let status = if grad_inf <= grad_tol {
                Some(SolveStatus::ConvergedGradient)
            } else if current <= options.cost_tol {
                Some(SolveStatus::ConvergedCost)
            } else {
                None
            };
            if let Some(status) = status {
                return Ok(finish(w, status, iter, current, grad_inf));
            }

            let newton = if stalled {
                None
            } else {
                Self::newton_step(x, y, &w, &g, &residual, current, &bounds)?
            };
            let (next, next_cost, from_gradient) = match newton {
                Some((trial, trial_cost)) => (trial, trial_cost, false),
                None => {
                    let (trial, trial_cost) = gradient_step(x, y, &w, &g, &bounds, lipschitz);
                    (trial, trial_cost, true)
                }
            };

            let step_norm = (&next - &w).norm();
            w = next;
            current = next_cost;
            if step_norm > options.step_tol * (w.norm() + options.step_tol) {
                stalled = false;
                continue;
            }
            if !from_gradient {
                // A vanishing Newton step says nothing about optimality on its
                // own; check it with a projected gradient step first.
                stalled = true;
                continue;
            }
            // A projected gradient step of length 1/L that barely moves means
            // the gradient mapping, hence the KKT residual, is negligible.
            let g = 2.0 * x.tr_mul(&(x * &w - y));
            grad_inf = projected_grad_inf(&w, &g, &bounds);
            return Ok(finish(w, SolveStatus::ConvergedStep, iter + 1, current, grad_inf));
        }

        Err(SolverError::MaxIterations {
            iterations: options.max_iters,
            grad_inf,
        })
    }
}

fn finish(
    weights: DVector<f64>,
    status: SolveStatus,
    iterations: usize,
    cost: f64,
    grad_inf: f64,
) -> Solution {
    log::debug!("solver finished: {status:?} after {iterations} iterations, cost {cost:.3e}");
    Solution {
        weights,
        stats: SolverStats {
            status,
            iterations,
            cost,
            grad_inf,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn solve(x: DMatrix<f64>, y: DVector<f64>, bounds: Bounds) -> Solution {
        ProjectedNewton
            .solve(&x, &y, bounds, &SolverOptions::default())
            .unwrap()
    }

    #[test]
    fn identity_recovers_target() {
        let sol = solve(
            DMatrix::identity(2, 2),
            DVector::from_vec(vec![0.3, 0.7]),
            Bounds::default(),
        );
        assert_abs_diff_eq!(sol.weights[0], 0.3, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.weights[1], 0.7, epsilon = 1e-9);
        assert!(sol.stats.cost < 1e-15);
    }

    #[test]
    fn optimum_outside_box_is_clipped() {
        // Unconstrained optimum is (1.5, -0.5); box optimum pins both ends.
        let sol = solve(
            DMatrix::identity(2, 2),
            DVector::from_vec(vec![1.5, -0.5]),
            Bounds::default(),
        );
        assert_abs_diff_eq!(sol.weights[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sol.weights[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sol.stats.cost, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn coupled_columns_respect_lower_bound() {
        // Unconstrained fit wants a negative second weight.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = DVector::from_vec(vec![3.0, 2.0, 1.0]);
        let sol = solve(x.clone(), y.clone(), Bounds::new(0.0, 10.0).unwrap());
        assert_abs_diff_eq!(sol.weights[1], 0.0, epsilon = 1e-12);
        // With w1 pinned at zero, w0 is the mean of y.
        assert_abs_diff_eq!(sol.weights[0], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn overdetermined_interior_solution_matches_normal_equations() {
        let x = DMatrix::from_row_slice(4, 2, &[0.5, 0.1, 0.2, 0.6, 0.3, 0.3, 0.0, 0.0]);
        let truth = DVector::from_vec(vec![0.4, 0.35]);
        let y = &x * &truth;
        let sol = solve(x, y, Bounds::default());
        assert_abs_diff_eq!(sol.weights, truth, epsilon = 1e-9);
    }

    #[test]
    fn rejects_bad_input() {
        let x = DMatrix::identity(2, 2);
        let y = DVector::from_vec(vec![1.0]);
        let err = ProjectedNewton
            .solve(&x, &y, Bounds::default(), &SolverOptions::default())
            .unwrap_err();
        assert!(matches!(err, SolverError::DimensionMismatch { ylen: 1, .. }));

        let y = DVector::from_vec(vec![1.0, f64::NAN]);
        let err = ProjectedNewton
            .solve(&x, &y, Bounds::default(), &SolverOptions::default())
            .unwrap_err();
        assert_eq!(err, SolverError::NonFinite);

        assert!(Bounds::new(1.0, 0.0).is_err());
        assert!(Bounds::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn iteration_limit_is_an_error() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 0.999, 0.999, 1.0]);
        let y = DVector::from_vec(vec![2.0, -1.0]);
        let options = SolverOptions {
            max_iters: 0,
            ..SolverOptions::default()
        };
        let err = ProjectedNewton
            .solve(&x, &y, Bounds::default(), &options)
            .unwrap_err();
        assert!(matches!(err, SolverError::MaxIterations { iterations: 0, .. }));
    }

    /// First-order optimality on the box, with tolerance relative to the
    /// problem's gradient scale.
    fn assert_kkt(x: &DMatrix<f64>, y: &DVector<f64>, w: &DVector<f64>, bounds: &Bounds) {
        let g = 2.0 * x.tr_mul(&(x * w - y));
        let sigma = x.singular_values().max();
        let tol = 1e-6 * (2.0 * x.tr_mul(y)).amax().max(2.0 * sigma * sigma).max(1.0);
        for j in 0..w.len() {
            assert!(w[j] >= bounds.lower && w[j] <= bounds.upper);
            if w[j] <= bounds.lower {
                assert!(g[j] >= -tol, "w[{j}] at lower bound with gradient {}", g[j]);
            } else if w[j] >= bounds.upper {
                assert!(g[j] <= tol, "w[{j}] at upper bound with gradient {}", g[j]);
            } else {
                assert!(g[j].abs() <= tol, "interior w[{j}] with gradient {}", g[j]);
            }
        }
    }

    #[test]
    fn random_box_problems_satisfy_kkt() {
        use crate::data::synthetic::SimpleRng;

        let mut rng = SimpleRng::new(2024);
        let options = SolverOptions {
            max_iters: 1000,
            ..SolverOptions::default()
        };
        for trial in 0..300 {
            let n = 2 + (rng.next_f64() * 10.0) as usize;
            let k = 1 + (rng.next_f64() * 9.0) as usize;
            let mut x = DMatrix::from_fn(n, k, |_, _| rng.gauss(0.0, 1.0));
            // Every few problems, make two columns nearly collinear.
            if k >= 2 && trial % 4 == 0 {
                for i in 0..n {
                    x[(i, 1)] = x[(i, 0)] + 1e-3 * rng.gauss(0.0, 1.0);
                }
            }
            let y = DVector::from_fn(n, |_, _| rng.gauss(0.0, 3.0));
            let bounds = Bounds::default();

            let sol = ProjectedNewton
                .solve(&x, &y, bounds, &options)
                .unwrap_or_else(|e| panic!("trial {trial} ({n}x{k}) failed: {e}"));
            assert_kkt(&x, &y, &sol.weights, &bounds);
        }
    }

    #[test]
    fn reported_step_convergence_is_stationary() {
        // Near-collinear columns whose unconstrained optimum lies far outside
        // the box.
        let x = DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 0.99, 0.0, 0.0, 0.1, 1.0, 1.0, 1.0, 1.0],
        );
        let y = DVector::from_vec(vec![2.0, -3.0, 0.5]);
        let bounds = Bounds::default();
        let sol = ProjectedNewton
            .solve(&x, &y, bounds, &SolverOptions::default())
            .unwrap();
        assert_kkt(&x, &y, &sol.weights, &bounds);
        if sol.stats.status == SolveStatus::ConvergedStep {
            assert!(sol.stats.grad_inf < 1e-6);
        }
    }

    #[test]
    fn non_negative_raises_lower_bound() {
        let b = Bounds::new(-1.0, 1.0).unwrap().non_negative();
        assert_eq!(b, Bounds { lower: 0.0, upper: 1.0 });
    }
}
