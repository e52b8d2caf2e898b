//! Export validator: statistical checks on the final grid before it may
//! be persisted.
//!
//! The geographic truth comes from the boundary polygon's own extents,
//! never from the raster under validation; a masking or merge failure
//! cannot vouch for itself.
use tracing::debug;

use crate::core::resolution::{METERS_PER_DEG_LAT, METERS_PER_DEG_LON_EQUATOR};
use crate::error::{Error, Result};
use crate::raster::{GeoBounds, Raster};

/// Maximum relative deviation between the raster's pixel aspect ratio and
/// the geographic truth.
pub const ASPECT_TOLERANCE: f64 = 0.30;

/// Minimum fraction of valid (non-no-data) pixels.
pub const MIN_VALID_FRACTION: f64 = 0.20;

/// True-distance aspect ratio (width/height) of a degree-space bounding
/// box, independent of any raster.
pub fn geographic_aspect_ratio(bounds_deg: &GeoBounds) -> f64 {
    let mid_lat = bounds_deg.mid_latitude().to_radians();
    let width_m = bounds_deg.width() * METERS_PER_DEG_LON_EQUATOR * mid_lat.cos();
    let height_m = bounds_deg.height() * METERS_PER_DEG_LAT;
    width_m / height_m
}

/// Check the final raster against the region's independently derived
/// geographic truth. A failure blocks export; the region's prior valid
/// artifact (if any) stays authoritative.
pub fn validate_export(
    raster: &Raster,
    boundary_bounds_deg: &GeoBounds,
    aspect_tolerance: f64,
    min_valid_fraction: f64,
) -> Result<()> {
    let geographic = geographic_aspect_ratio(boundary_bounds_deg);
    let pixel = raster.width() as f64 / raster.height() as f64;
    let deviation = (pixel - geographic).abs() / geographic;
    debug!(
        "validation: pixel aspect {:.3} vs geographic {:.3} (deviation {:.1}%)",
        pixel,
        geographic,
        deviation * 100.0
    );
    if deviation > aspect_tolerance {
        return Err(Error::AspectRatio {
            raster: pixel,
            geographic,
            tolerance: aspect_tolerance * 100.0,
        });
    }

    let fraction = raster.valid_fraction();
    if fraction < min_valid_fraction {
        return Err(Error::Coverage {
            fraction,
            floor: min_valid_fraction,
        });
    }

    Ok(())
}
