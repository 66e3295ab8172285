//! Synthetic yearly series generation.
//!
//! The generated series is a piecewise-linear trend (a few slope changes) plus
//! Gaussian noise, with isolated spikes injected at interior years. It is the
//! kind of input the analysis is meant for: a per-pixel yearly composite with
//! the occasional cloud or sensor glitch.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::domain::RawRecord;
use crate::error::AppError;

/// Day of the year every sample observation falls on.
const SAMPLE_MONTH_DAY: &str = "08-01";

/// Parameters for [`generate_sample`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSpec {
    pub start_year: i32,
    pub years: usize,
    pub seed: u64,
    /// Number of injected spikes.
    pub spikes: usize,
    /// Number of slope changes in the underlying trend.
    pub breaks: usize,
    /// Standard deviation of the Gaussian noise.
    pub noise_sd: f64,
    /// Distance of a spike from the trend.
    pub spike_height: f64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            start_year: 1990,
            years: 25,
            seed: 7,
            spikes: 2,
            breaks: 2,
            noise_sd: 0.01,
            spike_height: 0.6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub records: Vec<RawRecord>,
    /// Noise-free trend value at each year.
    pub baseline: Vec<f64>,
    /// Positions where the trend changes slope.
    pub breaks: Vec<usize>,
    /// Positions holding an injected spike.
    pub spikes: Vec<usize>,
}

pub fn generate_sample(spec: &SampleSpec) -> Result<SampleData, AppError> {
    if spec.years < 3 {
        return Err(AppError::new(2, "Sample needs at least 3 years."));
    }
    if !(spec.noise_sd.is_finite() && spec.noise_sd >= 0.0) {
        return Err(AppError::new(2, "Noise standard deviation must be finite and >= 0."));
    }
    if !(spec.spike_height.is_finite() && spec.spike_height > 0.0) {
        return Err(AppError::new(2, "Spike height must be finite and > 0."));
    }
    // Spikes sit on interior years and never touch each other.
    let max_spikes = (spec.years - 1) / 2;
    if spec.spikes > max_spikes {
        return Err(AppError::new(
            2,
            format!("At most {max_spikes} isolated spike(s) fit in {} years.", spec.years),
        ));
    }
    if spec.breaks > spec.years - 2 {
        return Err(AppError::new(2, "Too many slope changes for the sample length."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, spec.noise_sd)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut breaks = rand::seq::index::sample(&mut rng, spec.years - 2, spec.breaks)
        .into_iter()
        .map(|i| i + 1)
        .collect::<Vec<_>>();
    breaks.sort_unstable();

    let baseline = piecewise_trend(&mut rng, spec.years, &breaks);
    let spikes = pick_isolated(&mut rng, spec.years, spec.spikes);

    let records = baseline
        .iter()
        .enumerate()
        .map(|(i, &level)| {
            let mut value = level + normal.sample(&mut rng);
            if spikes.binary_search(&i).is_ok() {
                let sign = if rng.gen_range(0..2) == 0 { -1.0 } else { 1.0 };
                value += sign * spec.spike_height;
            }
            RawRecord::new(
                format!("{:04}-{SAMPLE_MONTH_DAY}", spec.start_year + i as i32),
                value,
            )
        })
        .collect();

    Ok(SampleData {
        records,
        baseline,
        breaks,
        spikes,
    })
}

/// A trend starting near 0.5 whose slope is redrawn at every break.
fn piecewise_trend(rng: &mut StdRng, years: usize, breaks: &[usize]) -> Vec<f64> {
    let mut level = rng.gen_range(0.4..0.6);
    let mut slope = rng.gen_range(-0.03..0.03);
    let mut out = Vec::with_capacity(years);

    for i in 0..years {
        if breaks.contains(&i) {
            slope = rng.gen_range(-0.03..0.03);
        }
        if i > 0 {
            level += slope;
        }
        out.push(level);
    }
    out
}

/// Choose `count` interior positions no two of which are adjacent.
fn pick_isolated(rng: &mut StdRng, years: usize, count: usize) -> Vec<usize> {
    // Choosing from `years - 1 - count` slots and spreading them by their rank
    // keeps at least one untouched year between neighbours.
    let slots = years - 1 - count;
    let mut picked = rand::seq::index::sample(rng, slots, count).into_vec();
    picked.sort_unstable();
    picked
        .into_iter()
        .enumerate()
        .map(|(rank, slot)| slot + rank + 1)
        .collect()
}
