//! Raster data model: an elevation grid with an affine geotransform, a
//! coordinate reference, and an explicit no-data sentinel.
//!
//! Every pipeline stage consumes a `&Raster` and produces a new `Raster`;
//! no stage mutates a shared grid across stage boundaries.
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::types::Crs;

/// Default no-data sentinel. NaN can never collide with a legitimate
/// elevation, including negative ones below sea level.
pub const DEFAULT_NODATA: f64 = f64::NAN;

/// Affine geotransform coefficients in GDAL order:
/// `[origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height]`.
/// `pixel_height` is negative for north-up grids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform(pub [f64; 6]);

impl GeoTransform {
    /// North-up transform from the top-left corner and absolute pixel sizes.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        GeoTransform([origin_x, pixel_width, 0.0, origin_y, 0.0, -pixel_height.abs()])
    }

    /// Map fractional pixel indices (col, row) to geographic coordinates.
    /// Integer indices address the top-left corner of a cell.
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        let g = self.0;
        (g[0] + col * g[1] + row * g[2], g[3] + col * g[4] + row * g[5])
    }

    /// Inverse of [`pixel_to_geo`] for rotation-free transforms.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let g = self.0;
        ((x - g[0]) / g[1], (y - g[3]) / g[5])
    }

    pub fn pixel_width(&self) -> f64 {
        self.0[1]
    }

    /// Signed pixel height; negative for north-up grids.
    pub fn pixel_height(&self) -> f64 {
        self.0[5]
    }
}

/// Geographic bounds. Degrees when attached to an angular grid, projection
/// units otherwise; the export record always carries degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn mid_latitude(&self) -> f64 {
        (self.north + self.south) / 2.0
    }

    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        GeoBounds {
            north: self.north.max(other.north),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            west: self.west.min(other.west),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// Summary statistics over the valid (non-no-data) cells of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// A 2-D elevation grid plus georeferencing.
///
/// `data` is indexed `[row, col]` with row 0 at the northern edge.
#[derive(Debug, Clone)]
pub struct Raster {
    pub data: Array2<f64>,
    pub transform: GeoTransform,
    pub crs: Crs,
    pub nodata: f64,
}

impl Raster {
    pub fn new(data: Array2<f64>, transform: GeoTransform, crs: Crs) -> Self {
        Raster {
            data,
            transform,
            crs,
            nodata: DEFAULT_NODATA,
        }
    }

    /// Allocate a raster with every cell set to the no-data sentinel.
    /// Destination buffers must start from this, never from uninitialized
    /// or zeroed memory.
    pub fn filled_nodata(rows: usize, cols: usize, transform: GeoTransform, crs: Crs) -> Self {
        Raster {
            data: Array2::from_elem((rows, cols), DEFAULT_NODATA),
            transform,
            crs,
            nodata: DEFAULT_NODATA,
        }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn is_nodata(&self, value: f64) -> bool {
        if self.nodata.is_nan() {
            value.is_nan()
        } else {
            value == self.nodata || value.is_nan()
        }
    }

    /// Bounds implied by the geotransform and grid dimensions.
    pub fn bounds(&self) -> GeoBounds {
        let (x0, y0) = self.transform.pixel_to_geo(0.0, 0.0);
        let (x1, y1) = self
            .transform
            .pixel_to_geo(self.width() as f64, self.height() as f64);
        GeoBounds {
            north: y0.max(y1),
            south: y0.min(y1),
            east: x0.max(x1),
            west: x0.min(x1),
        }
    }

    pub fn valid_fraction(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let valid = self.data.iter().filter(|&&v| !self.is_nodata(v)).count();
        valid as f64 / self.data.len() as f64
    }

    /// Min/max/mean over valid cells; `None` when every cell is no-data.
    pub fn stats(&self) -> Option<RasterStats> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;
        for &v in self.data.iter() {
            if self.is_nodata(v) {
                continue;
            }
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }
        if count == 0 {
            None
        } else {
            Some(RasterStats {
                min,
                max,
                mean: sum / count as f64,
            })
        }
    }

    /// Bilinear sample at fractional pixel-center coordinates.
    ///
    /// No-data neighbors are transparent: they contribute no weight instead
    /// of being interpolated from. Returns `None` outside the grid or when
    /// every contributing neighbor is no-data.
    pub fn sample_bilinear(&self, col: f64, row: f64) -> Option<f64> {
        let w = self.width();
        let h = self.height();
        if w == 0 || h == 0 {
            return None;
        }
        if col < -0.5 || row < -0.5 || col > w as f64 - 0.5 || row > h as f64 - 0.5 {
            return None;
        }

        let cf = col.floor();
        let rf = row.floor();
        let fx = col - cf;
        let fy = row - rf;
        let c0 = cf.max(0.0) as usize;
        let r0 = rf.max(0.0) as usize;
        let c1 = (c0 + 1).min(w - 1);
        let r1 = (r0 + 1).min(h - 1);

        let neighbors = [
            (r0, c0, (1.0 - fx) * (1.0 - fy)),
            (r0, c1, fx * (1.0 - fy)),
            (r1, c0, (1.0 - fx) * fy),
            (r1, c1, fx * fy),
        ];

        let mut acc = 0.0;
        let mut weight = 0.0;
        for (r, c, w) in neighbors {
            let v = self.data[[r, c]];
            if self.is_nodata(v) || w == 0.0 {
                continue;
            }
            acc += v * w;
            weight += w;
        }
        if weight > 0.0 { Some(acc / weight) } else { None }
    }
}
