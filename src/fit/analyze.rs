//! End-to-end trend analysis of one dated series.
//!
//! Pipeline:
//! records -> ordered series -> day index -> despike -> segmentation ->
//! per-segment lines -> per-point equations and fitted values.
//!
//! Every stage must succeed; a failure anywhere fails the call and no records
//! are produced.

use chrono::NaiveDate;
use log::debug;

use crate::domain::{AnalysisConfig, FitRecord, LineEquation, OrderedSeries, RawRecord, SegmentFit};
use crate::error::TrendError;
use crate::fit::despike::{despike, spike_flags};
use crate::fit::equations::{equations_to_fitted, expand_fits, segment_fits};
use crate::fit::segment::segment;

/// Analyze textual `{date, val}` records.
pub fn analyze(records: &[RawRecord], config: &AnalysisConfig) -> Result<Analysis, TrendError> {
    analyze_series(&OrderedSeries::from_records(records)?, config)
}

/// Analyze an already-parsed series.
pub fn analyze_series(series: &OrderedSeries, config: &AnalysisConfig) -> Result<Analysis, TrendError> {
    let indexed = series.to_indexed()?;
    let despiked = indexed.with_values(despike(indexed.values(), &config.spike));
    let spikes = spike_flags(indexed.values(), despiked.values());

    let segmentation = segment(&despiked, config.segment_cost)?;
    let fits = segment_fits(&despiked, &segmentation)?;
    let eqn_right = expand_fits(&fits);
    let (fitted, eqn_fit) = equations_to_fitted(&despiked, &eqn_right)?;

    debug!(
        "analyzed {} points: {} segment(s), {} spike(s)",
        indexed.len(),
        fits.len(),
        spikes.iter().filter(|&&s| s).count()
    );

    Ok(Analysis {
        dates: series.observations().iter().map(|o| o.date).collect(),
        days: indexed.days().to_vec(),
        raw: indexed.values().to_vec(),
        fitted,
        eqn_fit,
        eqn_right,
        vertex: segmentation.vertex_flags(),
        spike: spikes,
        vertices: segmentation.vertices(),
        segments: fits,
        cursor: 0,
    })
}

/// The annotated result of one analysis, consumed as an iterator of
/// [`FitRecord`]s in date order.
///
/// Single pass: records are handed out once and the iterator cannot be
/// rewound. Collect it if you need the rows more than once.
#[derive(Debug)]
pub struct Analysis {
    dates: Vec<NaiveDate>,
    days: Vec<i64>,
    raw: Vec<Option<f64>>,
    fitted: Vec<f64>,
    eqn_fit: Vec<LineEquation>,
    eqn_right: Vec<LineEquation>,
    vertex: Vec<bool>,
    spike: Vec<bool>,
    vertices: Vec<usize>,
    segments: Vec<SegmentFit>,
    cursor: usize,
}

impl Analysis {
    /// Vertex positions of the chosen segmentation.
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// The fitted line of each segment.
    pub fn segments(&self) -> &[SegmentFit] {
        &self.segments
    }

    pub fn spike_count(&self) -> usize {
        self.spike.iter().filter(|&&s| s).count()
    }

    /// Drain the remaining records into a `Vec`.
    pub fn collect_records(self) -> Vec<FitRecord> {
        self.collect()
    }
}

impl Iterator for Analysis {
    type Item = FitRecord;

    fn next(&mut self) -> Option<FitRecord> {
        let i = self.cursor;
        if i >= self.dates.len() {
            return None;
        }
        self.cursor += 1;

        Some(FitRecord {
            index_date: self.dates[i],
            index_day: self.days[i],
            val_raw: self.raw[i],
            val_fit: self.fitted[i],
            eqn_fit: self.eqn_fit[i],
            eqn_right: self.eqn_right[i],
            vertex: self.vertex[i],
            spike: self.spike[i],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dates.len() - self.cursor;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Analysis {}
