//! Raster-side helpers.
//!
//! The trend engine never touches rasters; these are the pieces a per-pixel
//! driver needs around it (pixel serialization, grid files, band expressions).

pub mod bands;
pub mod grid;

pub use bands::*;
pub use grid::*;
