//! Ordinary least squares for a single feature plus intercept.
//!
//! We fit `y ≈ intercept + slope * x` by solving the least-squares problem on
//! the `n × 2` design matrix `[1, x]`.
//!
//! Implementation choices:
//! - SVD via nalgebra rather than the raw normal equations: `xᵀx` squares the
//!   condition number, and elapsed-day columns grow large.
//! - Degenerate inputs (fewer than two distinct `x`) are rejected up front, so
//!   the solver only ever sees full-rank systems.

use nalgebra::{DMatrix, DVector};

use crate::error::EstimateError;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// A fitted straight line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a line through `(x, y)` pairs by OLS.
pub fn fit_line(pairs: &[(f64, f64)]) -> Result<LineFit, EstimateError> {
    if pairs.len() < 2 {
        return Err(EstimateError::InsufficientData);
    }
    let x0 = pairs[0].0;
    if pairs.iter().all(|&(x, _)| x == x0) {
        return Err(EstimateError::InsufficientData);
    }
    if pairs.iter().any(|&(x, y)| !(x.is_finite() && y.is_finite())) {
        return Err(EstimateError::InvalidSeries(
            "regression input contains non-finite values".to_string(),
        ));
    }

    let n = pairs.len();
    let design = DMatrix::from_fn(n, 2, |r, c| if c == 0 { 1.0 } else { pairs[r].0 });
    let target = DVector::from_iterator(n, pairs.iter().map(|&(_, y)| y));

    let beta = solve_least_squares(&design, &target).ok_or(EstimateError::InsufficientData)?;

    Ok(LineFit {
        intercept: beta[0],
        slope: beta[1],
    })
}
