//! Single-point spike removal.
//!
//! Spikes are blanked (`None`) rather than deleted so positions stay aligned
//! with the day index used by the fitter and segmenter.

use crate::domain::SpikeRule;

/// Blank isolated spikes in one left-to-right pass.
///
/// The first and last points are never flagged. The left neighbour of a point
/// is the nearest earlier value still present in the output, so a spike that
/// was just removed cannot mask the next one.
pub fn despike(values: &[Option<f64>], rule: &SpikeRule) -> Vec<Option<f64>> {
    let mut out = values.to_vec();
    let n = values.len();
    if n < 3 {
        return out;
    }

    let mut left = values[0];
    for p in 1..n - 1 {
        let Some(v) = values[p] else {
            continue;
        };
        let right = values[p + 1..].iter().find_map(|x| *x);

        if let (Some(l), Some(r)) = (left, right) {
            if is_spike(v, l, r, rule) {
                out[p] = None;
                continue;
            }
        }
        left = Some(v);
    }

    out
}

/// Positions that `despike` blanked.
pub fn spike_flags(original: &[Option<f64>], despiked: &[Option<f64>]) -> Vec<bool> {
    original
        .iter()
        .zip(despiked)
        .map(|(o, d)| o.is_some() && d.is_none())
        .collect()
}

fn is_spike(v: f64, left: f64, right: f64, rule: &SpikeRule) -> bool {
    let dl = v - left;
    let dr = v - right;
    let same_direction = (dl > 0.0 && dr > 0.0) || (dl < 0.0 && dr < 0.0);
    same_direction
        && dl.abs() > (rule.ratio * left.abs()).max(rule.min_delta)
        && dr.abs() > (rule.ratio * right.abs()).max(rule.min_delta)
}
