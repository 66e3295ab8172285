//! Trend fitting.
//!
//! Responsibilities:
//!
//! - blank single-point spikes (`despike`)
//! - fit one least squares line over a range (`line`)
//! - choose the optimal piecewise-linear segmentation (`segment`)
//! - expand segments into per-point equations and fitted values (`equations`)
//! - run the whole pipeline for one dated series (`analyze`)

pub mod analyze;
pub mod despike;
pub mod equations;
pub mod line;
pub mod segment;

pub use analyze::*;
pub use despike::*;
pub use equations::*;
pub use line::*;
pub use segment::*;
