//! Formatted terminal output.
//!
//! Formatting lives here so the analysis code stays free of presentation and
//! output changes stay localized (the golden tests below pin them).

use crate::domain::{AnalysisConfig, FitRecord};
use crate::report::{Deviation, Deviations, SegmentSummary};

/// Where the analyzed records came from, for the summary header.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub source: String,
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// Format the run summary: input, parameters, and the chosen segmentation.
pub fn format_run_summary(
    context: &RunContext,
    config: &AnalysisConfig,
    records: &[FitRecord],
    segments: &[SegmentSummary],
) -> String {
    let mut out = String::new();

    out.push_str("=== trend - segmented trend analysis ===\n");
    out.push_str(&format!("Input: {}\n", context.source));
    out.push_str(&format!(
        "Rows: read={} skipped={} | points={} missing={}\n",
        context.rows_read,
        context.rows_skipped,
        records.len(),
        records.iter().filter(|r| r.val_raw.is_none()).count(),
    ));
    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        out.push_str(&format!(
            "Span: {} .. {} ({} days)\n",
            first.index_date, last.index_date, last.index_day
        ));
    }
    out.push_str(&format!(
        "Params: segment_cost={} spike_ratio={} spike_min_delta={}\n",
        config.segment_cost, config.spike.ratio, config.spike.min_delta
    ));

    let vertices: Vec<String> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.vertex)
        .map(|(i, _)| i.to_string())
        .collect();
    out.push_str(&format!("Vertices: [{}]\n", vertices.join(", ")));
    out.push_str(&format!("Spikes: {}\n", records.iter().filter(|r| r.spike).count()));

    out.push_str("\nSegments:\n");
    out.push_str(&format_segments(segments));
    out.push('\n');

    out
}

/// Format the segment table.
pub fn format_segments(segments: &[SegmentSummary]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:<10} {:>6} {:>12} {:>12}\n",
            "start", "end", "points", "slope/yr", "rss"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<10} {:-<6} {:-<12} {:-<12}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for s in segments {
        out.push_str(
            format!(
                "{:<10} {:<10} {:>6} {:>12.4} {:>12.4}\n",
                s.start_date.to_string(),
                s.end_date.to_string(),
                s.points,
                s.slope_per_year,
                s.rss
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the deviation tables.
pub fn format_deviations(deviations: &Deviations) -> String {
    let mut out = String::new();

    out.push_str("Largest above trend:\n");
    out.push_str(&format_table(&deviations.above));
    out.push('\n');

    out.push_str("Largest below trend:\n");
    out.push_str(&format_table(&deviations.below));

    out
}

fn format_table(rows: &[Deviation]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<10} {:>8} {:>12} {:>12} {:>12}\n", "date", "day", "raw", "fit", "residual").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<8} {:-<12} {:-<12} {:-<12}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for d in rows {
        let r = &d.record;
        out.push_str(
            format!(
                "{:<10} {:>8} {:>12} {:>12.4} {:>12.4}\n",
                r.index_date.to_string(),
                r.index_day,
                fmt_opt(r.val_raw),
                r.val_fit,
                d.residual
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::record;
    use crate::report::{compute_deviations, rank_deviations};
    use chrono::NaiveDate;

    #[test]
    fn segment_table_golden() {
        let segments = vec![SegmentSummary {
            start_date: NaiveDate::from_ymd_opt(2010, 12, 31).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2014, 12, 31).unwrap(),
            points: 5,
            slope_per_year: 1.0,
            rss: 0.0,
        }];
        let expected = concat!(
            "start      end        points     slope/yr          rss\n",
            "---------- ---------- ------ ------------ ------------\n",
            "2010-12-31 2014-12-31      5       1.0000       0.0000\n",
        );
        assert_eq!(format_segments(&segments), expected);
    }

    #[test]
    fn summary_lists_vertices_and_spikes() {
        let records = vec![
            record(0, Some(1.0), 1.0, false),
            record(365, None, 1.0, false),
            record(730, Some(8.0), 1.0, true),
            record(1095, Some(1.0), 1.0, false),
        ];
        let context = RunContext {
            source: "series.csv".to_string(),
            rows_read: 5,
            rows_skipped: 1,
        };
        let txt = format_run_summary(&context, &AnalysisConfig::default(), &records, &[]);
        assert!(txt.contains("Input: series.csv\n"));
        assert!(txt.contains("Rows: read=5 skipped=1 | points=4 missing=1\n"));
        assert!(txt.contains("Span: 2010-01-01 .. 2012-12-31 (1095 days)\n"));
        assert!(txt.contains("Vertices: [0]\n"));
        assert!(txt.contains("Spikes: 1\n"));
    }

    #[test]
    fn deviation_tables_show_each_side() {
        let records = vec![record(0, Some(1.5), 1.0, false), record(1, Some(0.5), 1.0, false)];
        let txt = format_deviations(&rank_deviations(&compute_deviations(&records), 3));
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "Largest above trend:");
        assert_eq!(lines[3], "2010-01-01        0       1.5000       1.0000       0.5000");
        assert_eq!(lines[5], "Largest below trend:");
        assert_eq!(lines[8], "2010-01-02        1       0.5000       1.0000      -0.5000");
    }
}
