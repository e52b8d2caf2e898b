//! Boundary masker: clip a raster to a region polygon.
//!
//! The output is cropped to the polygon's minimal bounding box; cells
//! outside the polygon become no-data, cells inside keep their source
//! value. Emitting the full source dimensions padded with no-data margins
//! is forbidden: those margins corrupt the aspect ratio of every
//! downstream stage.
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::geometry::BoundaryPolygon;
use crate::raster::{GeoTransform, Raster};

/// Clip `raster` to `boundary`, producing a new raster whose pixel
/// dimensions reflect only the polygon's true extent.
pub fn mask_to_boundary(
    raster: &Raster,
    boundary: &BoundaryPolygon,
    region: &str,
) -> Result<Raster> {
    let bbox = boundary.bounding_box();

    // Pixel window of the polygon bbox, clamped to the source grid.
    let (c0f, r0f) = raster.transform.geo_to_pixel(bbox.west, bbox.north);
    let (c1f, r1f) = raster.transform.geo_to_pixel(bbox.east, bbox.south);
    let col0 = c0f.floor().max(0.0) as usize;
    let row0 = r0f.floor().max(0.0) as usize;
    let col1 = (c1f.ceil().max(0.0) as usize).min(raster.width());
    let row1 = (r1f.ceil().max(0.0) as usize).min(raster.height());

    if col1 <= col0 || row1 <= row0 {
        return Err(Error::geometry(
            region,
            "boundary does not intersect the source raster",
        ));
    }

    let (origin_x, origin_y) = raster.transform.pixel_to_geo(col0 as f64, row0 as f64);
    let transform = GeoTransform::north_up(
        origin_x,
        origin_y,
        raster.transform.pixel_width(),
        raster.transform.pixel_height(),
    );

    let mut out = Raster::filled_nodata(row1 - row0, col1 - col0, transform, raster.crs);
    for row in 0..out.height() {
        for col in 0..out.width() {
            let (lon, lat) = raster
                .transform
                .pixel_to_geo((col0 + col) as f64 + 0.5, (row0 + row) as f64 + 0.5);
            if !boundary.contains(lon, lat) {
                continue;
            }
            let value = raster.data[[row0 + row, col0 + col]];
            if !raster.is_nodata(value) {
                out.data[[row, col]] = value;
            }
        }
    }

    debug!(
        "masked {}x{} raster to {}x{} boundary window for '{}'",
        raster.width(),
        raster.height(),
        out.width(),
        out.height(),
        region
    );

    Ok(out)
}
