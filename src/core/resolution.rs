//! Resolution selector: pick the output sampling interval for a display
//! pixel budget under the Nyquist oversampling floor, then resample.
//!
//! The displayed interval must be at least twice the source's native
//! interval before downsampling is allowed. A budget below the floor is a
//! policy violation reported to the caller, never a silent downgrade.
//! Resampling is area-weighted averaging; nearest-neighbor downsampling
//! aliases continuous elevation data and is disallowed.
use tracing::info;

use crate::core::reproject::geographic_bounds;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster};
use crate::types::Crs;

/// Nyquist safety margin: displayed interval / native interval.
pub const OVERSAMPLING_FLOOR: f64 = 2.0;

/// True-distance meters per degree of latitude.
pub const METERS_PER_DEG_LAT: f64 = 110_540.0;
/// True-distance meters per degree of longitude at the equator; shrinks
/// with the cosine of latitude away from it.
pub const METERS_PER_DEG_LON_EQUATOR: f64 = 111_320.0;

/// The chosen output sampling interval and the ratio that justified it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionDecision {
    pub native_interval_m: f64,
    pub display_interval_m: f64,
    pub oversampling_ratio: f64,
    pub width: usize,
    pub height: usize,
}

/// True-distance extent (width, height) of a raster in meters, derived
/// from its geographic bounds so angular and metric grids are measured
/// with the same yardstick.
pub fn metric_extent(raster: &Raster) -> Result<(f64, f64)> {
    let deg = geographic_bounds(raster)?;
    let mid_lat = deg.mid_latitude().to_radians();
    let width_m = deg.width() * METERS_PER_DEG_LON_EQUATOR * mid_lat.cos();
    let height_m = deg.height() * METERS_PER_DEG_LAT;
    Ok((width_m, height_m))
}

/// Decide the output grid for `pixel_budget` display pixels on the long
/// side, enforcing the oversampling floor.
pub fn select_resolution(
    raster: &Raster,
    native_interval_m: f64,
    pixel_budget: usize,
    floor: f64,
) -> Result<ResolutionDecision> {
    if pixel_budget == 0 {
        return Err(Error::Processing("pixel budget must be positive".into()));
    }
    let (width_m, height_m) = metric_extent(raster)?;
    let long_m = width_m.max(height_m);
    let display_interval_m = long_m / pixel_budget as f64;
    let oversampling_ratio = display_interval_m / native_interval_m;

    if oversampling_ratio < floor {
        return Err(Error::ResolutionPolicy {
            budget: pixel_budget,
            ratio: oversampling_ratio,
            floor,
        });
    }

    let (width, height) = if width_m >= height_m {
        (
            pixel_budget,
            ((height_m / display_interval_m).round() as usize).max(1),
        )
    } else {
        (
            ((width_m / display_interval_m).round() as usize).max(1),
            pixel_budget,
        )
    };

    info!(
        "resolution: {:.0}m native -> {:.0}m display (ratio {:.2}), {}x{} output",
        native_interval_m, display_interval_m, oversampling_ratio, width, height
    );

    Ok(ResolutionDecision {
        native_interval_m,
        display_interval_m,
        oversampling_ratio,
        width,
        height,
    })
}

/// Downsample with area-weighted averaging. Each output cell averages the
/// source cells it covers, weighted by overlap; no-data source cells
/// contribute nothing, and a cell with no valid contributors stays no-data.
pub fn resample_area(src: &Raster, width: usize, height: usize) -> Raster {
    let (src_rows, src_cols) = src.data.dim();
    let scale_x = src_cols as f64 / width as f64;
    let scale_y = src_rows as f64 / height as f64;

    let g = src.transform.0;
    let transform = GeoTransform([
        g[0],
        g[1] * scale_x,
        0.0,
        g[3],
        0.0,
        g[5] * scale_y,
    ]);
    let mut out = Raster::filled_nodata(height, width, transform, src.crs);

    for row in 0..height {
        let y0 = row as f64 * scale_y;
        let y1 = y0 + scale_y;
        let r0 = y0.floor() as usize;
        let r1 = (y1.ceil() as usize).min(src_rows);
        for col in 0..width {
            let x0 = col as f64 * scale_x;
            let x1 = x0 + scale_x;
            let c0 = x0.floor() as usize;
            let c1 = (x1.ceil() as usize).min(src_cols);

            let mut acc = 0.0;
            let mut weight = 0.0;
            for r in r0..r1 {
                let wy = overlap(r, y0, y1);
                if wy <= 0.0 {
                    continue;
                }
                for c in c0..c1 {
                    let v = src.data[[r, c]];
                    if src.is_nodata(v) {
                        continue;
                    }
                    let w = wy * overlap(c, x0, x1);
                    acc += v * w;
                    weight += w;
                }
            }
            if weight > 0.0 {
                out.data[[row, col]] = acc / weight;
            }
        }
    }

    out
}

/// Overlap length of source cell `idx` (spanning idx..idx+1) with [a, b).
fn overlap(idx: usize, a: f64, b: f64) -> f64 {
    (((idx + 1) as f64).min(b) - (idx as f64).max(a)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::GeoBounds;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn equatorial_raster(width_deg: f64, height_deg: f64, cols: usize, rows: usize) -> Raster {
        let bounds = GeoBounds {
            north: height_deg / 2.0,
            south: -height_deg / 2.0,
            east: width_deg,
            west: 0.0,
        };
        Raster::new(
            Array2::from_elem((rows, cols), 1.0),
            GeoTransform::north_up(
                bounds.west,
                bounds.north,
                width_deg / cols as f64,
                height_deg / rows as f64,
            ),
            Crs::Geographic,
        )
    }

    #[test]
    fn rejects_budget_below_oversampling_floor() {
        // Extent chosen so 1024 pixels imply a 40m display interval on
        // 30m native data: ratio 1.33, rejected.
        let width_deg = 40.0 * 1024.0 / METERS_PER_DEG_LON_EQUATOR;
        let raster = equatorial_raster(width_deg, width_deg / 4.0, 64, 16);
        let err = select_resolution(&raster, 30.0, 1024, OVERSAMPLING_FLOOR).unwrap_err();
        match err {
            Error::ResolutionPolicy { ratio, floor, .. } => {
                assert_relative_eq!(ratio, 40.0 / 30.0, epsilon = 0.01);
                assert_relative_eq!(floor, 2.0);
            }
            other => panic!("expected ResolutionPolicy, got {other}"),
        }
    }

    #[test]
    fn accepts_budget_at_or_above_floor() {
        // Same extent, coarser budget: 512 pixels imply 80m, ratio 2.67.
        let width_deg = 40.0 * 1024.0 / METERS_PER_DEG_LON_EQUATOR;
        let raster = equatorial_raster(width_deg, width_deg / 4.0, 64, 16);
        let decision = select_resolution(&raster, 30.0, 512, OVERSAMPLING_FLOOR).unwrap();
        assert!(decision.oversampling_ratio >= 2.0);
        assert_eq!(decision.width, 512);
        // Short side scales by the true aspect ratio (the lat/lon meter
        // constants differ slightly, so just under a quarter of the budget).
        assert_eq!(decision.height, 127);
    }

    #[test]
    fn portrait_extent_gets_budget_on_height() {
        let raster = equatorial_raster(0.5, 2.0, 32, 128);
        let decision = select_resolution(&raster, 30.0, 256, OVERSAMPLING_FLOOR).unwrap();
        assert_eq!(decision.height, 256);
        assert!(decision.width < 256);
    }

    #[test]
    fn resample_averages_uniform_blocks() {
        let mut src = equatorial_raster(4.0, 4.0, 4, 4);
        // Left half 10, right half 30.
        for r in 0..4 {
            for c in 0..4 {
                src.data[[r, c]] = if c < 2 { 10.0 } else { 30.0 };
            }
        }
        let out = resample_area(&src, 2, 2);
        assert_relative_eq!(out.data[[0, 0]], 10.0);
        assert_relative_eq!(out.data[[0, 1]], 30.0);
        assert_relative_eq!(out.data[[1, 0]], 10.0);
        assert_relative_eq!(out.data[[1, 1]], 30.0);
    }

    #[test]
    fn resample_handles_fractional_overlap() {
        let mut src = equatorial_raster(3.0, 1.0, 3, 1);
        src.data[[0, 0]] = 0.0;
        src.data[[0, 1]] = 10.0;
        src.data[[0, 2]] = 20.0;
        let out = resample_area(&src, 2, 1);
        // First output cell covers src cell 0 fully and half of cell 1.
        assert_relative_eq!(out.data[[0, 0]], (0.0 + 10.0 * 0.5) / 1.5);
        assert_relative_eq!(out.data[[0, 1]], (10.0 * 0.5 + 20.0) / 1.5);
    }

    #[test]
    fn resample_skips_nodata_and_preserves_empty_cells() {
        let mut src = equatorial_raster(4.0, 4.0, 4, 4);
        for r in 0..4 {
            for c in 0..4 {
                // Right half entirely no-data.
                src.data[[r, c]] = if c < 2 { 5.0 } else { f64::NAN };
            }
        }
        let out = resample_area(&src, 2, 2);
        assert_relative_eq!(out.data[[0, 0]], 5.0);
        assert!(out.is_nodata(out.data[[0, 1]]));
        assert!(out.is_nodata(out.data[[1, 1]]));
    }

    #[test]
    fn resample_keeps_origin_and_scales_pixel_size() {
        let src = equatorial_raster(4.0, 2.0, 8, 4);
        let out = resample_area(&src, 4, 2);
        let sb = src.bounds();
        let ob = out.bounds();
        assert_relative_eq!(sb.west, ob.west);
        assert_relative_eq!(sb.north, ob.north);
        assert_relative_eq!(sb.east, ob.east, epsilon = 1e-9);
        assert_relative_eq!(sb.south, ob.south, epsilon = 1e-9);
        assert_relative_eq!(out.transform.pixel_width(), 1.0);
    }
}
