//! Command-line parsing for the trend analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analysis code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{AnalysisConfig, SpikeRule};
use crate::io::ingest::InputFormat;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "trend", version, about = "Segmented trend analysis of dated observations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Despike, segment and fit a dated series; print a summary and optionally plot/export.
    Analyze(AnalyzeArgs),
    /// Segment a plain list of values (positions as x) and print the vertices.
    Segment(SegmentArgs),
    /// Generate a synthetic yearly series as `date,val` CSV.
    Sample(SampleArgs),
}

/// Analysis parameters shared by the subcommands.
///
/// Each falls back to a `TREND_*` environment variable (a `.env` file is read
/// at startup) before its default.
#[derive(Debug, Args, Clone, Copy)]
pub struct ParamArgs {
    /// Penalty added per segment; larger values give fewer segments.
    #[arg(long, env = "TREND_SEGMENT_COST", default_value_t = 2.0)]
    pub segment_cost: f64,

    /// Relative jump (vs. each neighbour) a point needs to count as a spike.
    #[arg(long, env = "TREND_SPIKE_RATIO", default_value_t = 0.5)]
    pub spike_ratio: f64,

    /// Absolute jump a point needs to count as a spike.
    #[arg(long, env = "TREND_SPIKE_MIN_DELTA", default_value_t = 0.0)]
    pub spike_min_delta: f64,
}

impl ParamArgs {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            segment_cost: self.segment_cost,
            spike: SpikeRule {
                ratio: self.spike_ratio,
                min_delta: self.spike_min_delta,
            },
        }
    }
}

/// Options for `trend analyze`.
#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Observation file (CSV with `date,val` columns, or a JSON array of `{date, val}`).
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: PathBuf,

    /// Input format.
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub format: InputFormat,

    #[command(flatten)]
    pub params: ParamArgs,

    /// Show the top-N deviations above and below the trend.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export fit records to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export fit records to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for `trend segment`.
#[derive(Debug, Args, Clone)]
pub struct SegmentArgs {
    /// Comma-separated values, e.g. `0,0,0,1,2,3`.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true, num_args = 1..)]
    pub values: Vec<f64>,

    /// Penalty added per segment.
    #[arg(long, env = "TREND_SEGMENT_COST", default_value_t = 2.0)]
    pub segment_cost: f64,
}

/// Options for `trend sample`.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of yearly observations.
    #[arg(long, default_value_t = 25)]
    pub years: usize,

    /// First year of the series.
    #[arg(long, default_value_t = 1990)]
    pub start_year: i32,

    /// Random seed.
    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    /// Number of injected spikes.
    #[arg(long, default_value_t = 2)]
    pub spikes: usize,

    /// Number of slope changes in the trend.
    #[arg(long, default_value_t = 2)]
    pub breaks: usize,

    /// Noise standard deviation.
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,

    /// Write to this file instead of stdout.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_args_parse() {
        let cli = Cli::try_parse_from([
            "trend",
            "analyze",
            "--input",
            "series.csv",
            "--segment-cost",
            "0.5",
            "--spike-ratio",
            "0.8",
            "--plot",
            "--export",
            "out.csv",
        ])
        .unwrap();

        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.input, PathBuf::from("series.csv"));
        assert_eq!(args.format, InputFormat::Auto);
        assert!(args.plot);
        assert_eq!(args.export, Some(PathBuf::from("out.csv")));

        let config = args.params.analysis_config();
        assert_eq!(config.segment_cost, 0.5);
        assert_eq!(config.spike.ratio, 0.8);
    }

    #[test]
    fn segment_values_are_comma_separated() {
        let cli = Cli::try_parse_from(["trend", "segment", "--values", "0,-1.5,2", "--segment-cost", "0.1"]).unwrap();
        let Command::Segment(args) = cli.command else {
            panic!("expected segment");
        };
        assert_eq!(args.values, vec![0.0, -1.5, 2.0]);
        assert_eq!(args.segment_cost, 0.1);
    }

    #[test]
    fn analyze_requires_input() {
        assert!(Cli::try_parse_from(["trend", "analyze"]).is_err());
    }
}
