//! Reporting utilities: per-segment summaries and deviations from the trend.

pub mod format;

pub use format::*;

use chrono::NaiveDate;

use crate::domain::{FitRecord, SegmentFit};

/// Average days per year, for converting per-day slopes.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// One fitted segment described in calendar terms.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub points: usize,
    pub slope_per_year: f64,
    pub rss: f64,
}

/// A valid, non-spike observation and its distance from the fitted trend.
#[derive(Debug, Clone, PartialEq)]
pub struct Deviation {
    pub record: FitRecord,
    pub residual: f64,
}

/// Largest deviations on each side of the trend (top-N each side).
#[derive(Debug, Clone)]
pub struct Deviations {
    pub above: Vec<Deviation>,
    pub below: Vec<Deviation>,
}

/// Describe each segment by the dates of the records it covers.
///
/// Segments reaching past the end of `records` are skipped.
pub fn summarize_segments(records: &[FitRecord], segments: &[SegmentFit]) -> Vec<SegmentSummary> {
    segments
        .iter()
        .filter_map(|s| {
            let first = records.get(s.start)?;
            let last = records.get(s.end)?;
            Some(SegmentSummary {
                start_date: first.index_date,
                end_date: last.index_date,
                points: s.end - s.start + 1,
                slope_per_year: s.equation.slope * DAYS_PER_YEAR,
                rss: s.rss,
            })
        })
        .collect()
}

/// Residuals (`val_raw - val_fit`) of every valid observation not flagged as a spike.
pub fn compute_deviations(records: &[FitRecord]) -> Vec<Deviation> {
    records
        .iter()
        .filter(|r| !r.spike)
        .filter_map(|r| {
            let raw = r.val_raw?;
            Some(Deviation {
                record: r.clone(),
                residual: raw - r.val_fit,
            })
        })
        .collect()
}

/// Rank the top deviations above and below the trend.
///
/// Zero residuals are never ranked.
pub fn rank_deviations(deviations: &[Deviation], top_n: usize) -> Deviations {
    let mut above: Vec<Deviation> = deviations.iter().filter(|d| d.residual > 0.0).cloned().collect();
    above.sort_by(|a, b| b.residual.total_cmp(&a.residual));
    above.truncate(top_n);

    let mut below: Vec<Deviation> = deviations.iter().filter(|d| d.residual < 0.0).cloned().collect();
    below.sort_by(|a, b| a.residual.total_cmp(&b.residual));
    below.truncate(top_n);

    Deviations { above, below }
}
