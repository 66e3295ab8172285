//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - runs the analysis pipeline
//! - prints reports/plots
//! - writes optional exports

use std::fs::File;
use std::io::{BufWriter, Write};

use clap::Parser;
use log::debug;

use crate::cli::{AnalyzeArgs, Command, SampleArgs, SegmentArgs};
use crate::data::{SampleSpec, generate_sample};
use crate::domain::IndexedSeries;
use crate::error::AppError;
use crate::fit::{segment, segment_fits};
use crate::report::RunContext;

pub mod pipeline;

use pipeline::RunConfig;

/// Entry point for the `trend` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` only fills variables that are not already set.
    if let Ok(path) = dotenvy::dotenv() {
        debug!("loaded environment from {}", path.display());
    }
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Analyze(args) => handle_analyze(&args),
        Command::Segment(args) => handle_segment(&args),
        Command::Sample(args) => handle_sample(&args),
    }
}

fn handle_analyze(args: &AnalyzeArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args);
    let run = pipeline::run_analysis(&config)?;

    let context = RunContext {
        source: config.input.display().to_string(),
        rows_read: run.ingest.rows_read,
        rows_skipped: run.ingest.row_errors.len(),
    };
    println!(
        "{}",
        crate::report::format_run_summary(&context, &config.analysis, &run.records, &run.segments)
    );
    println!("{}", crate::report::format_deviations(&run.deviations));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&run.records, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export_csv {
        crate::io::export::write_records_csv(path, &run.records)?;
        debug!("wrote {} record(s) to {}", run.records.len(), path.display());
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_records_json(path, &run.records)?;
        debug!("wrote {} record(s) to {}", run.records.len(), path.display());
    }

    Ok(())
}

fn handle_segment(args: &SegmentArgs) -> Result<(), AppError> {
    let series = IndexedSeries::from_positions(args.values.iter().copied().map(Some).collect());
    let segmentation = segment(&series, args.segment_cost)?;
    let fits = segment_fits(&series, &segmentation)?;

    let parts: Vec<String> = segmentation.vertices().iter().map(|v| v.to_string()).collect();
    println!("vertices: [{}]", parts.join(", "));
    for f in &fits {
        println!(
            "{:>4}..={:<4} slope={:.6} intercept={:.6} rss={:.6}",
            f.start, f.end, f.equation.slope, f.equation.intercept, f.rss
        );
    }
    Ok(())
}

fn handle_sample(args: &SampleArgs) -> Result<(), AppError> {
    let spec = SampleSpec {
        start_year: args.start_year,
        years: args.years,
        seed: args.seed,
        spikes: args.spikes,
        breaks: args.breaks,
        noise_sd: args.noise,
        ..SampleSpec::default()
    };
    let sample = generate_sample(&spec)?;
    debug!("sample breaks at {:?}, spikes at {:?}", sample.breaks, sample.spikes);

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
            let mut out = BufWriter::new(file);
            crate::io::export::write_observations(&mut out, &sample.records)?;
            out.flush()
                .map_err(|e| AppError::new(2, format!("Failed to flush '{}': {e}", path.display())))
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            crate::io::export::write_observations(&mut out, &sample.records)
        }
    }
}

pub fn run_config_from_args(args: &AnalyzeArgs) -> RunConfig {
    RunConfig {
        input: args.input.clone(),
        format: args.format,
        analysis: args.params.analysis_config(),
        top_n: args.top,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}
