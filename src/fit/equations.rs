//! Expand a segmentation into per-point equations and fitted values.

use crate::domain::{IndexedSeries, LineEquation, SegmentFit, Segmentation};
use crate::error::TrendError;
use crate::fit::line::fit_range;

/// Evaluate `eqn` at `x`.
pub fn apply_equation(x: f64, eqn: LineEquation) -> f64 {
    eqn.apply(x)
}

/// Refit every segment of `segmentation` over `series`.
///
/// Each line is fitted from its segment's start through the next vertex, so
/// adjacent lines share that vertex. The returned `start..=end` is still the
/// disjoint range the segment owns; `rss` is over the fitted range.
pub fn segment_fits(series: &IndexedSeries, segmentation: &Segmentation) -> Result<Vec<SegmentFit>, TrendError> {
    if segmentation.series_len() != series.len() {
        return Err(TrendError::invalid_input(format!(
            "segmentation covers {} positions but the series has {}",
            segmentation.series_len(),
            series.len()
        )));
    }
    let last = series.len().saturating_sub(1);
    segmentation
        .segments()
        .into_iter()
        .map(|(start, end)| {
            let fit = fit_range(series, start, (end + 1).min(last))?;
            Ok(SegmentFit { end, ..fit })
        })
        .collect()
}

/// Assign each point the equation of the segment that owns it.
///
/// A vertex belongs to the segment on its right; the final point belongs to
/// the last segment.
pub fn vertices_to_equations(
    series: &IndexedSeries,
    segmentation: &Segmentation,
) -> Result<Vec<LineEquation>, TrendError> {
    Ok(expand_fits(&segment_fits(series, segmentation)?))
}

pub(crate) fn expand_fits(fits: &[SegmentFit]) -> Vec<LineEquation> {
    fits.iter()
        .flat_map(|f| std::iter::repeat_n(f.equation, f.end - f.start + 1))
        .collect()
}

/// Evaluate per-point equations, correcting at segment changes.
///
/// Where a point's equation differs from its predecessor's, the predecessor's
/// equation is tried as well and whichever lands closer to the observed value
/// is kept. Ties and missing observations keep the point's own equation.
///
/// Returns the fitted values and the equations actually used.
pub fn equations_to_fitted(
    series: &IndexedSeries,
    equations: &[LineEquation],
) -> Result<(Vec<f64>, Vec<LineEquation>), TrendError> {
    if equations.len() != series.len() {
        return Err(TrendError::invalid_input(format!(
            "{} equations for a series of length {}",
            equations.len(),
            series.len()
        )));
    }

    let mut fitted = Vec::with_capacity(series.len());
    let mut used = Vec::with_capacity(series.len());

    for (i, (&day, &own)) in series.days().iter().zip(equations).enumerate() {
        let x = day as f64;
        let mut chosen = own;

        if i > 0 && equations[i - 1] != own {
            if let Some(observed) = series.values()[i] {
                let previous = equations[i - 1];
                let err_own = (observed - own.apply(x)).abs();
                let err_previous = (observed - previous.apply(x)).abs();
                if err_previous < err_own {
                    chosen = previous;
                }
            }
        }

        fitted.push(chosen.apply(x));
        used.push(chosen);
    }

    Ok((fitted, used))
}
