//! Single-segment least squares over a day-indexed range.
//!
//! Missing points are skipped; they neither pull the line nor add residual.

use crate::domain::{IndexedSeries, LineEquation, SegmentFit};
use crate::error::TrendError;
use crate::math::fit_line;

/// Fit one line over parallel `days`/`values` slices.
///
/// One valid point gives a flat line through it with zero residual; no valid
/// points is an `InsufficientData` error.
pub fn fit_segment(days: &[i64], values: &[Option<f64>]) -> Result<(LineEquation, f64), TrendError> {
    if days.len() != values.len() {
        return Err(TrendError::invalid_input(format!(
            "index/value length mismatch: {} days, {} values",
            days.len(),
            values.len()
        )));
    }

    let points: Vec<(f64, f64)> = days
        .iter()
        .zip(values)
        .filter_map(|(&d, v)| v.map(|y| (d as f64, y)))
        .collect();

    fit_line(&points).ok_or_else(|| TrendError::insufficient(1, 0))
}

/// Fit a plain numeric series using positions `0..n` as x.
pub fn least_squares(values: &[f64]) -> Result<(LineEquation, f64), TrendError> {
    let series = IndexedSeries::from_positions(values.iter().copied().map(Some).collect());
    fit_segment(series.days(), series.values())
}

/// Fit positions `start..=end` of a series.
pub fn fit_range(series: &IndexedSeries, start: usize, end: usize) -> Result<SegmentFit, TrendError> {
    if start > end || end >= series.len() {
        return Err(TrendError::invalid_input(format!(
            "range {start}..={end} is outside a series of length {}",
            series.len()
        )));
    }

    let (equation, rss) = fit_segment(&series.days[start..=end], &series.values[start..=end])
        .map_err(|e| match e {
            TrendError::InsufficientData { needed, found, .. } => TrendError::InsufficientData {
                needed,
                found,
                at: Some((start, end)),
            },
            other => other,
        })?;

    Ok(SegmentFit {
        start,
        end,
        equation,
        rss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_matches_reference_values() {
        let (eqn, rss) = least_squares(&[1.0, 2.1, 3.0, 4.4, 4.7]).unwrap();
        assert!((eqn.slope - 0.97).abs() < 1e-9, "slope {}", eqn.slope);
        assert!((eqn.intercept - 1.10).abs() < 1e-9, "intercept {}", eqn.intercept);
        assert!((rss - 0.243).abs() < 1e-9, "rss {rss}");
    }

    #[test]
    fn missing_points_are_ignored() {
        let days = [0, 1, 2, 3, 4];
        let values = [Some(0.0), Some(1.0), None, Some(3.0), Some(4.0)];
        let (eqn, rss) = fit_segment(&days, &values).unwrap();
        assert!((eqn.slope - 1.0).abs() < 1e-12);
        assert!(eqn.intercept.abs() < 1e-12);
        assert!(rss < 1e-20);
    }

    #[test]
    fn single_valid_point_is_flat_with_zero_residual() {
        let (eqn, rss) = fit_segment(&[10, 20, 30], &[None, Some(6.0), None]).unwrap();
        assert_eq!(eqn, LineEquation::flat(6.0));
        assert_eq!(rss, 0.0);
    }

    #[test]
    fn no_valid_points_is_insufficient() {
        assert_eq!(
            fit_segment(&[0, 1], &[None, None]).unwrap_err(),
            TrendError::insufficient(1, 0)
        );

        let series = IndexedSeries::from_positions(vec![Some(1.0), None, None, Some(2.0)]);
        assert_eq!(
            fit_range(&series, 1, 2).unwrap_err(),
            TrendError::InsufficientData {
                needed: 1,
                found: 0,
                at: Some((1, 2)),
            }
        );
    }

    #[test]
    fn fit_range_rejects_out_of_bounds() {
        let series = IndexedSeries::from_positions(vec![Some(1.0), Some(2.0)]);
        assert!(matches!(
            fit_range(&series, 1, 2),
            Err(TrendError::InvalidInput { .. })
        ));
    }
}
