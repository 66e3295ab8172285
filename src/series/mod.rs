//! Date handling and series normalization.
//!
//! - `dates`: boundary parsing of `YYYY-MM-DD` text
//! - `index`: ordering records by date and mapping dates to day offsets

pub mod dates;
pub mod index;

pub use dates::*;
pub use index::*;
