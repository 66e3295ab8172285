//! `trend-lines` library crate.
//!
//! The binary (`trend`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the engine (`series`, `fit`) is reusable by per-pixel raster drivers
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod raster;
pub mod report;
pub mod series;
