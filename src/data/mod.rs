//! Input data sources other than user files.

pub mod sample;

pub use sample::{SampleData, SampleSpec, generate_sample};
