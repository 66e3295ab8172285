//! Raster collaborator contract and an in-memory implementation.
//!
//! Decoding real raster files lives outside this crate. Anything that can hand
//! out a georeferenced value grid implements [`RasterSource`]; the helpers here
//! only need that.

use std::collections::BTreeMap;
use std::path::Path;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, TrendError};

/// Affine georeferencing of a raster.
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    /// Usually negative for north-up images.
    pub pixel_height: f64,
    pub row_rotation: f64,
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform (no rotation).
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// From the six GDAL coefficients
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Geographic coordinates of a pixel centre.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        let col_f = col as f64 + 0.5;
        let row_f = row as f64 + 0.5;
        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;
        (x, y)
    }
}

/// Well-known-text point for a coordinate pair.
pub fn wkt_point(x: f64, y: f64) -> String {
    format!("POINT({x} {y})")
}

/// A single-band georeferenced raster.
pub trait RasterSource {
    fn transform(&self) -> GeoTransform;

    /// The band values as a `rows x cols` matrix.
    fn to_array(&self) -> DMatrix<f64>;

    /// A raster with the same georeferencing holding `array` instead.
    ///
    /// Fails when `array` does not have this raster's shape.
    fn with_array(&self, array: DMatrix<f64>) -> Result<Self, TrendError>
    where
        Self: Sized;

    /// Every pixel as `(centre WKT, value)`, row by row.
    fn pixels(&self) -> Pixels {
        Pixels {
            transform: self.transform(),
            array: self.to_array(),
            next: 0,
        }
    }
}

/// Row-major iterator over the pixels of a [`RasterSource`].
#[derive(Debug)]
pub struct Pixels {
    transform: GeoTransform,
    array: DMatrix<f64>,
    next: usize,
}

impl Iterator for Pixels {
    type Item = (String, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let cols = self.array.ncols();
        if cols == 0 || self.next >= self.array.len() {
            return None;
        }
        let (row, col) = (self.next / cols, self.next % cols);
        self.next += 1;

        let (x, y) = self.transform.pixel_center(row, col);
        Some((wkt_point(x, y), self.array[(row, col)]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

/// In-memory raster.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    transform: GeoTransform,
    values: DMatrix<f64>,
}

impl PixelGrid {
    pub fn new(transform: GeoTransform, values: DMatrix<f64>) -> Self {
        Self { transform, values }
    }

    /// Build from row-major values.
    pub fn from_rows(transform: GeoTransform, rows: usize, cols: usize, values: &[f64]) -> Result<Self, TrendError> {
        if rows * cols != values.len() {
            return Err(TrendError::invalid_input(format!(
                "{} values do not fill a {rows}x{cols} grid",
                values.len()
            )));
        }
        Ok(Self::new(transform, DMatrix::from_row_slice(rows, cols, values)))
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }
}

impl RasterSource for PixelGrid {
    fn transform(&self) -> GeoTransform {
        self.transform
    }

    fn to_array(&self) -> DMatrix<f64> {
        self.values.clone()
    }

    fn with_array(&self, array: DMatrix<f64>) -> Result<Self, TrendError> {
        if array.shape() != self.values.shape() {
            return Err(TrendError::invalid_input(format!(
                "array shape {:?} does not match raster shape {:?}",
                array.shape(),
                self.values.shape()
            )));
        }
        Ok(Self::new(self.transform, array))
    }
}

/// Pixel attributes keyed by name.
pub type Attributes = BTreeMap<String, Value>;

/// Pair every pixel's centre WKT with its attributes: `extra` plus the pixel
/// value under `val`.
pub fn serialize_pixels<S: RasterSource + ?Sized>(
    source: &S,
    extra: &Attributes,
) -> impl Iterator<Item = (String, Attributes)> {
    source.pixels().map(move |(wkt, value)| {
        let mut attrs = extra.clone();
        attrs.insert("val".to_string(), Value::from(value));
        (wkt, attrs)
    })
}

/// Write one `pix_ctr_wkt` row per pixel to a CSV file. Returns the row count.
pub fn write_pixel_grid<S: RasterSource + ?Sized>(source: &S, path: &Path) -> Result<usize, AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create grid CSV '{}': {e}", path.display())))?;
    writer
        .write_record(["pix_ctr_wkt"])
        .map_err(|e| AppError::new(2, format!("Failed to write grid CSV header: {e}")))?;

    let mut rows = 0usize;
    for (wkt, _) in source.pixels() {
        writer
            .write_record([wkt.as_str()])
            .map_err(|e| AppError::new(2, format!("Failed to write grid CSV row: {e}")))?;
        rows += 1;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush grid CSV: {e}")))?;

    Ok(rows)
}
