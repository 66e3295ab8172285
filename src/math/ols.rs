//! Least squares line fitting.
//!
//! Every segment of a trend is an ordinary least squares line:
//!
//! ```text
//! minimize Σ (y_i - (m x_i + c))^2
//! ```
//!
//! Implementation choices:
//! - x is centred on its mean before solving so day offsets in the thousands
//!   do not dominate the intercept column.
//! - The 2-column system is solved with SVD, which also yields the minimum-norm
//!   answer (a flat line through the mean) when all x coincide.

use nalgebra::{DMatrix, DVector};

use crate::domain::LineEquation;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit a line through `(x, y)` pairs and return it with its residual sum of squares.
///
/// Degenerate inputs (a single point, or every x equal) give a zero-slope line
/// through the mean of y. Returns `None` only for an empty input.
pub fn fit_line(points: &[(f64, f64)]) -> Option<(LineEquation, f64)> {
    let n = points.len();
    if n == 0 {
        return None;
    }

    let mean_x = points.iter().map(|&(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / n as f64;

    let spread_x = points.iter().any(|&(x, _)| x != points[0].0);
    let equation = if spread_x {
        let mut design = DMatrix::<f64>::zeros(n, 2);
        let mut obs = DVector::<f64>::zeros(n);
        for (i, &(x, y)) in points.iter().enumerate() {
            design[(i, 0)] = 1.0;
            design[(i, 1)] = x - mean_x;
            obs[i] = y;
        }
        match solve_least_squares(&design, &obs) {
            Some(beta) => LineEquation::new(beta[1], beta[0] - beta[1] * mean_x),
            None => LineEquation::flat(mean_y),
        }
    } else {
        LineEquation::flat(mean_y)
    };

    let rss = points
        .iter()
        .map(|&(x, y)| {
            let r = y - equation.apply(x);
            r * r
        })
        .sum();

    Some((equation, rss))
}
