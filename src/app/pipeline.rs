//! Shared "analysis pipeline" logic used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> analyze -> segment summaries -> deviation rankings
//!
//! The command handlers can then focus on presentation and exports.

use std::path::PathBuf;

use log::info;

use crate::domain::{AnalysisConfig, FitRecord, RawRecord};
use crate::error::AppError;
use crate::fit::analyze;
use crate::io::ingest::{IngestedRecords, InputFormat, load_records};
use crate::report::{Deviations, SegmentSummary, compute_deviations, rank_deviations, summarize_segments};

/// Everything `trend analyze` needs to know for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub format: InputFormat,
    pub analysis: AnalysisConfig,
    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedRecords,
    pub records: Vec<FitRecord>,
    pub vertices: Vec<usize>,
    pub segments: Vec<SegmentSummary>,
    pub deviations: Deviations,
}

/// Load the input file and run the analysis on it.
pub fn run_analysis(config: &RunConfig) -> Result<RunOutput, AppError> {
    let ingest = load_records(&config.input, config.format)?;
    run_analysis_on(ingest, &config.analysis, config.top_n)
}

/// Run the analysis on already-ingested records.
pub fn run_analysis_on(
    ingest: IngestedRecords,
    analysis: &AnalysisConfig,
    top_n: usize,
) -> Result<RunOutput, AppError> {
    let (records, vertices, fits) = analyze_records(&ingest.records, analysis)?;

    let segments = summarize_segments(&records, &fits);
    let deviations = rank_deviations(&compute_deviations(&records), top_n);

    info!(
        "{} record(s), {} segment(s), {} spike(s)",
        records.len(),
        segments.len(),
        records.iter().filter(|r| r.spike).count()
    );

    Ok(RunOutput {
        ingest,
        records,
        vertices,
        segments,
        deviations,
    })
}

type Analyzed = (Vec<FitRecord>, Vec<usize>, Vec<crate::domain::SegmentFit>);

fn analyze_records(records: &[RawRecord], config: &AnalysisConfig) -> Result<Analyzed, AppError> {
    let analysis = analyze(records, config)?;
    let vertices = analysis.vertices().to_vec();
    let fits = analysis.segments().to_vec();
    Ok((analysis.collect_records(), vertices, fits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::read_csv_records;

    const SERIES: &str = "date,val\n\
        2010-12-31,1\n2011-12-31,2\n2012-12-31,3\n2013-12-31,4\n2014-12-31,1000\n\
        2015-12-31,7\n2016-12-31,9\n2017-12-31,11\n2018-12-31,13\n2019-12-31,15\n";

    #[test]
    fn csv_to_records_end_to_end() {
        let ingest = read_csv_records(SERIES.as_bytes()).unwrap();
        let run = run_analysis_on(ingest, &AnalysisConfig::with_segment_cost(2.0), 3).unwrap();

        assert_eq!(run.records.len(), 10);
        assert_eq!(run.vertices, vec![0, 5, 9]);
        assert_eq!(run.segments.len(), 2);
        assert!(run.records[4].spike);
        assert!(
            run.deviations
                .above
                .iter()
                .chain(&run.deviations.below)
                .all(|d| d.record.index_day != 1461)
        );
    }

    #[test]
    fn engine_errors_keep_their_exit_codes() {
        let ingest = read_csv_records("date,val\n2010-12-31,1\n".as_bytes()).unwrap();
        let err = run_analysis_on(ingest, &AnalysisConfig::default(), 3).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let ingest = read_csv_records("date,val\n2010-31-12,1\n2011-12-31,2\n".as_bytes()).unwrap();
        let err = run_analysis_on(ingest, &AnalysisConfig::default(), 3).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
