//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records and dated observations (`RawRecord`, `Observation`, `OrderedSeries`)
//! - the day-indexed working series (`IndexedSeries`)
//! - fit outputs (`LineEquation`, `Segmentation`, `SegmentFit`, `FitRecord`)
//! - run configuration (`AnalysisConfig`, `SpikeRule`)

pub mod types;

pub use types::*;
