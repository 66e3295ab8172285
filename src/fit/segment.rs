//! Optimal piecewise-linear segmentation.
//!
//! Minimizes
//!
//! ```text
//! segment_cost * (number of segments) + Σ rss(segment)
//! ```
//!
//! over all partitions of the series into contiguous, non-overlapping segments.
//! `opt[j + 1]` is the best cost of covering positions `0..=j` and `back[j + 1]`
//! the start of the last segment in that cover. For a fixed end `j` the start
//! walks leftwards, so each segment's residual is updated in O(1) from the one
//! before it.

use crate::domain::{IndexedSeries, Segmentation};
use crate::error::TrendError;

/// Candidates within this relative distance of the best cost are treated as
/// ties; the smallest start among them wins.
const TIE_TOLERANCE: f64 = 1e-9;

/// Running co-moments of the valid points in a segment.
#[derive(Debug, Clone, Copy, Default)]
struct SegmentMoments {
    n: usize,
    mean_x: f64,
    mean_y: f64,
    cxx: f64,
    cxy: f64,
    cyy: f64,
}

impl SegmentMoments {
    fn push(&mut self, x: f64, y: f64) {
        self.n += 1;
        let n = self.n as f64;
        let dx = x - self.mean_x;
        let dy = y - self.mean_y;
        self.mean_x += dx / n;
        self.mean_y += dy / n;
        self.cxx += dx * (x - self.mean_x);
        self.cxy += dx * (y - self.mean_y);
        self.cyy += dy * (y - self.mean_y);
    }

    /// Residual sum of squares of the least squares line.
    fn rss(&self) -> f64 {
        if self.n < 2 || self.cxx <= 0.0 {
            return self.cyy.max(0.0);
        }
        (self.cyy - self.cxy * self.cxy / self.cxx).max(0.0)
    }
}

/// Find the minimum-cost segmentation of a (despiked) series.
///
/// A missing position never opens a segment (except position 0), and a
/// segment must contain at least one valid point.
pub fn segment(series: &IndexedSeries, segment_cost: f64) -> Result<Segmentation, TrendError> {
    let n = series.len();
    if n < 2 {
        return Err(TrendError::insufficient(2, n));
    }
    if !(segment_cost.is_finite() && segment_cost >= 0.0) {
        return Err(TrendError::invalid_input(format!(
            "segment cost must be finite and >= 0, got {segment_cost}"
        )));
    }

    let days = series.days();
    let values = series.values();

    let mut opt = vec![f64::INFINITY; n + 1];
    let mut back = vec![0usize; n + 1];
    opt[0] = 0.0;

    let mut candidates = vec![f64::INFINITY; n];

    for end in 0..n {
        let mut moments = SegmentMoments::default();
        for start in (0..=end).rev() {
            if let Some(y) = values[start] {
                moments.push(days[start] as f64, y);
            }

            let opens_on_missing = start > 0 && values[start].is_none();
            candidates[start] = if moments.n == 0 || opens_on_missing || !opt[start].is_finite() {
                f64::INFINITY
            } else {
                opt[start] + segment_cost + moments.rss()
            };
        }

        let best = candidates[..=end]
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        if !best.is_finite() {
            continue;
        }

        let limit = best + TIE_TOLERANCE * best.abs().max(1.0);
        if let Some(start) = candidates[..=end].iter().position(|&c| c <= limit) {
            opt[end + 1] = candidates[start];
            back[end + 1] = start;
        }
    }

    if !opt[n].is_finite() {
        return Err(TrendError::insufficient(1, 0));
    }

    let mut starts = Vec::new();
    let mut cursor = n;
    while cursor > 0 {
        let start = back[cursor];
        starts.push(start);
        cursor = start;
    }
    starts.reverse();

    Ok(Segmentation { starts, len: n })
}

/// Segment a plain numeric series (positions as x) and return its vertices.
pub fn segment_values(values: &[f64], segment_cost: f64) -> Result<Vec<usize>, TrendError> {
    let series = IndexedSeries::from_positions(values.iter().copied().map(Some).collect());
    Ok(segment(&series, segment_cost)?.vertices())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::line::fit_segment;

    #[test]
    fn ramp_after_flat_start() {
        assert_eq!(
            segment_values(&[0.0, 0.0, 0.0, 1.0, 2.0, 3.0], 0.0001).unwrap(),
            vec![0, 2, 5]
        );
    }

    #[test]
    fn three_plateaus() {
        assert_eq!(
            segment_values(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 3.0, 3.0], 0.0001).unwrap(),
            vec![0, 3, 6, 7]
        );
    }

    #[test]
    fn straight_line_is_one_segment() {
        let values: Vec<f64> = (0..12).map(|i| 0.5 * i as f64 - 2.0).collect();
        assert_eq!(segment_values(&values, 0.5).unwrap(), vec![0, 11]);
    }

    #[test]
    fn high_cost_collapses_to_one_segment() {
        assert_eq!(
            segment_values(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 3.0, 3.0], 1e6).unwrap(),
            vec![0, 7]
        );
    }

    #[test]
    fn yearly_series_breaks_where_the_slope_changes() {
        let days = vec![0, 365, 731, 1096, 1461, 1826, 2192, 2557, 2922, 3287];
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 7.0, 9.0, 11.0, 13.0, 15.0]
            .iter()
            .copied()
            .map(Some)
            .collect();
        let series = IndexedSeries { days, values };
        assert_eq!(segment(&series, 2.0).unwrap().vertices(), vec![0, 4, 9]);
    }

    #[test]
    fn missing_point_never_opens_a_segment() {
        let days = vec![0, 365, 731, 1096, 1461, 1826, 2192, 2557, 2922, 3287];
        let values = vec![
            Some(1.0),
            Some(2.0),
            Some(3.0),
            Some(4.0),
            None,
            Some(7.0),
            Some(9.0),
            Some(11.0),
            Some(13.0),
            Some(15.0),
        ];
        let series = IndexedSeries { days, values };
        assert_eq!(segment(&series, 2.0).unwrap().vertices(), vec![0, 5, 9]);
    }

    #[test]
    fn cost_matches_direct_refit_of_each_segment() {
        let values = [3.0, 2.5, 2.7, 6.0, 6.2, 5.9, 6.1, 1.0, 0.5, 0.0, -0.4];
        let series = IndexedSeries::from_positions(values.iter().copied().map(Some).collect());
        let seg = segment(&series, 0.3).unwrap();

        let total: f64 = seg
            .segments()
            .iter()
            .map(|&(s, e)| {
                let (_, rss) = fit_segment(&series.days()[s..=e], &series.values()[s..=e]).unwrap();
                0.3 + rss
            })
            .sum();
        let one_segment = 0.3 + fit_segment(series.days(), series.values()).unwrap().1;
        assert!(total <= one_segment + 1e-9, "{total} > {one_segment}");
        assert_eq!(seg.vertices(), vec![0, 3, 7, 10]);
    }

    #[test]
    fn resegmenting_fitted_output_is_stable() {
        let values = [0.0, 1.0, 2.0, 3.0, 10.0, 10.0, 10.0, 10.0, 8.0, 6.0, 4.0];
        let series = IndexedSeries::from_positions(values.iter().copied().map(Some).collect());
        let seg = segment(&series, 1.0).unwrap();
        assert_eq!(seg.vertices(), vec![0, 4, 7, 10]);

        let fitted: Vec<f64> = seg
            .segments()
            .iter()
            .flat_map(|&(s, e)| {
                let (eqn, _) = fit_segment(&series.days()[s..=e], &series.values()[s..=e]).unwrap();
                (s..=e).map(move |i| eqn.apply(i as f64))
            })
            .collect();
        assert_eq!(segment_values(&fitted, 1.0).unwrap(), seg.vertices());
    }

    #[test]
    fn rejects_short_series_and_bad_cost() {
        assert_eq!(
            segment_values(&[1.0], 1.0).unwrap_err(),
            TrendError::insufficient(2, 1)
        );
        assert!(matches!(
            segment_values(&[1.0, 2.0], -1.0),
            Err(TrendError::InvalidInput { .. })
        ));
        assert!(matches!(
            segment_values(&[1.0, 2.0], f64::NAN),
            Err(TrendError::InvalidInput { .. })
        ));
    }

    #[test]
    fn all_missing_is_insufficient() {
        let series = IndexedSeries::from_positions(vec![None, None, None]);
        assert_eq!(
            segment(&series, 1.0).unwrap_err(),
            TrendError::insufficient(1, 0)
        );
    }
}
