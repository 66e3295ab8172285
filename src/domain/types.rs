//! Shared domain types.
//!
//! These types are plain values, created fresh for each analysis call and
//! serializable so they can be exported to CSV/JSON without extra glue.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TrendError;

/// One input record as it arrives at the boundary (date still textual).
///
/// `val = None` marks a missing observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: String,
    #[serde(default)]
    pub val: Option<f64>,
}

impl RawRecord {
    pub fn new(date: impl Into<String>, val: f64) -> Self {
        Self {
            date: date.into(),
            val: Some(val),
        }
    }
}

/// A dated observation; `value = None` is the missing marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Observations ordered by date.
///
/// Construction sorts but never deduplicates: two observations on the same
/// day survive here and are rejected by [`OrderedSeries::to_indexed`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedSeries {
    pub(crate) observations: Vec<Observation>,
}

impl OrderedSeries {
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.observations.iter().map(|o| o.value).collect()
    }
}

/// A series keyed by whole-day offsets from its first observation.
///
/// Invariant: `days[0] == 0`, `days` strictly increasing, and
/// `days.len() == values.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedSeries {
    pub(crate) days: Vec<i64>,
    pub(crate) values: Vec<Option<f64>>,
}

impl IndexedSeries {
    pub fn days(&self) -> &[i64] {
        &self.days
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Same index, different values (e.g. after despiking).
    pub fn with_values(&self, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(values.len(), self.days.len());
        Self {
            days: self.days.clone(),
            values,
        }
    }
}

/// A straight line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineEquation {
    pub slope: f64,
    pub intercept: f64,
}

impl LineEquation {
    pub const fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// A zero-slope line at `level`.
    pub const fn flat(level: f64) -> Self {
        Self::new(0.0, level)
    }

    pub fn apply(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

impl From<(f64, f64)> for LineEquation {
    fn from((slope, intercept): (f64, f64)) -> Self {
        Self::new(slope, intercept)
    }
}

/// A piecewise-linear partition of a series.
///
/// Segment `k` owns positions `[starts[k], starts[k + 1])`; the final segment
/// runs through the last position. Segments never share points. The vertex
/// list is every segment start plus the final position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    pub(crate) starts: Vec<usize>,
    pub(crate) len: usize,
}

impl Segmentation {
    /// Build a partition from its segment starts over `len` positions.
    pub fn from_starts(starts: &[usize], len: usize) -> Result<Self, TrendError> {
        if starts.first() != Some(&0) {
            return Err(TrendError::invalid_input("first segment must start at 0"));
        }
        if let Some(w) = starts.windows(2).find(|w| w[1] <= w[0]) {
            return Err(TrendError::invalid_input(format!(
                "segment starts must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }
        if let Some(&last) = starts.last().filter(|&&s| s >= len) {
            return Err(TrendError::invalid_input(format!(
                "segment start {last} is outside a series of length {len}"
            )));
        }
        Ok(Self {
            starts: starts.to_vec(),
            len,
        })
    }

    /// Rebuild a partition from a vertex list (`0`, ..., `len - 1`).
    ///
    /// Every vertex but the last opens a segment; the last segment closes on the
    /// final vertex. A one-point final segment has no vertex of its own, so it
    /// cannot be expressed this way: `[0, 3]` is always the single segment
    /// `0..=3`. Use [`Segmentation::from_starts`] to rebuild such partitions.
    pub fn from_vertices(vertices: &[usize]) -> Result<Self, TrendError> {
        let (Some(&first), Some(&last)) = (vertices.first(), vertices.last()) else {
            return Err(TrendError::invalid_input("vertex list is empty"));
        };
        if first != 0 {
            return Err(TrendError::invalid_input(format!(
                "first vertex must be 0, got {first}"
            )));
        }
        if let Some(w) = vertices.windows(2).find(|w| w[1] <= w[0]) {
            return Err(TrendError::invalid_input(format!(
                "vertices must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }
        let starts = if vertices.len() == 1 {
            vec![0]
        } else {
            vertices[..vertices.len() - 1].to_vec()
        };
        Ok(Self {
            starts,
            len: last + 1,
        })
    }

    /// Segment starts plus the final position, strictly increasing.
    pub fn vertices(&self) -> Vec<usize> {
        let mut out = self.starts.clone();
        if let Some(last) = self.len.checked_sub(1) {
            if out.last() != Some(&last) {
                out.push(last);
            }
        }
        out
    }

    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Number of positions covered.
    pub fn series_len(&self) -> usize {
        self.len
    }

    pub fn segment_count(&self) -> usize {
        self.starts.len()
    }

    /// Inclusive `(start, end)` position ranges, one per segment.
    pub fn segments(&self) -> Vec<(usize, usize)> {
        self.starts
            .iter()
            .enumerate()
            .map(|(k, &start)| {
                let end = self.starts.get(k + 1).map_or(self.len - 1, |&next| next - 1);
                (start, end)
            })
            .collect()
    }

    /// Per-position vertex flags.
    pub fn vertex_flags(&self) -> Vec<bool> {
        let mut flags = vec![false; self.len];
        for v in self.vertices() {
            flags[v] = true;
        }
        flags
    }
}

/// The fitted line of one final segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentFit {
    pub start: usize,
    /// Inclusive.
    pub end: usize,
    pub equation: LineEquation,
    pub rss: f64,
}

/// One annotated output row per input observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRecord {
    pub index_date: NaiveDate,
    pub index_day: i64,
    pub val_raw: Option<f64>,
    pub val_fit: f64,
    /// Equation used to compute `val_fit`.
    pub eqn_fit: LineEquation,
    /// Equation of the segment that owns this point.
    pub eqn_right: LineEquation,
    pub vertex: bool,
    pub spike: bool,
}

/// Thresholds for the spike filter.
///
/// A point is a spike when it deviates from both valid neighbours in the same
/// direction, and each deviation exceeds `max(ratio * |neighbour|, min_delta)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeRule {
    pub ratio: f64,
    pub min_delta: f64,
}

impl Default for SpikeRule {
    fn default() -> Self {
        Self {
            ratio: 0.5,
            min_delta: 0.0,
        }
    }
}

/// Parameters of a single analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Penalty charged once per segment.
    pub segment_cost: f64,
    pub spike: SpikeRule,
}

impl AnalysisConfig {
    pub fn with_segment_cost(segment_cost: f64) -> Self {
        Self {
            segment_cost,
            ..Self::default()
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            segment_cost: 2.0,
            spike: SpikeRule::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_equation_is_slope_times_x_plus_intercept() {
        assert_eq!(LineEquation::new(3.0, 2.0).apply(5.0), 17.0);
        assert_eq!(LineEquation::flat(4.5).apply(100.0), 4.5);
    }

    #[test]
    fn segments_are_disjoint_and_last_owns_final_point() {
        let seg = Segmentation::from_vertices(&[0, 3, 6, 7]).unwrap();
        assert_eq!(seg.segments(), vec![(0, 2), (3, 5), (6, 7)]);
        assert_eq!(seg.series_len(), 8);
        assert_eq!(seg.vertices(), vec![0, 3, 6, 7]);
        assert_eq!(
            seg.vertex_flags(),
            vec![true, false, false, true, false, false, true, true]
        );
    }

    #[test]
    fn single_point_final_segment_keeps_its_own_start() {
        let seg = Segmentation {
            starts: vec![0, 3, 6],
            len: 7,
        };
        assert_eq!(seg.segments(), vec![(0, 2), (3, 5), (6, 6)]);
        assert_eq!(seg.vertices(), vec![0, 3, 6]);
    }

    #[test]
    fn one_point_final_segment_round_trips_through_starts_only() {
        let seg = Segmentation::from_starts(&[0, 3], 4).unwrap();
        assert_eq!(seg.segments(), vec![(0, 2), (3, 3)]);
        assert_eq!(seg.vertices(), vec![0, 3]);

        let from_vertices = Segmentation::from_vertices(&seg.vertices()).unwrap();
        assert_eq!(from_vertices.segments(), vec![(0, 3)]);

        let rebuilt = Segmentation::from_starts(seg.starts(), seg.series_len()).unwrap();
        assert_eq!(rebuilt, seg);
    }

    #[test]
    fn from_starts_rejects_bad_lists() {
        assert!(Segmentation::from_starts(&[], 4).is_err());
        assert!(Segmentation::from_starts(&[1, 2], 4).is_err());
        assert!(Segmentation::from_starts(&[0, 2, 2], 4).is_err());
        assert!(Segmentation::from_starts(&[0, 4], 4).is_err());
    }

    #[test]
    fn from_vertices_rejects_bad_lists() {
        assert!(Segmentation::from_vertices(&[]).is_err());
        assert!(Segmentation::from_vertices(&[1, 4]).is_err());
        assert!(Segmentation::from_vertices(&[0, 4, 4]).is_err());
        let one = Segmentation::from_vertices(&[0]).unwrap();
        assert_eq!(one.segments(), vec![(0, 0)]);
    }
}
