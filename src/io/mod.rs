//! Input/output helpers.
//!
//! - observation ingest from CSV/JSON (`ingest`)
//! - fit record exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
