//! Distortion corrector: reproject an angular (degree) raster onto the
//! true-distance Web Mercator grid.
//!
//! One degree of longitude shrinks with the cosine of latitude, so an
//! angular grid badly overstates a region's true width away from the
//! equator. Reprojection restores the real-world aspect ratio. Three rules
//! are load-bearing, each one a fix for a previously shipped corruption bug:
//! the destination buffer is fully initialized to the no-data sentinel
//! before the transform, no-data source cells are transparent to the
//! resampler, and interpolation is bilinear (nearest-neighbor is not
//! acceptable for continuous elevation data).
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::raster::{GeoBounds, GeoTransform, Raster};
use crate::types::Crs;

/// Latitude band around the equator (degrees) inside which angular
/// distortion is negligible and reprojection may be skipped.
pub const EQUATOR_SKIP_BAND_DEG: f64 = 5.0;

/// Whether a raster covering `bounds` (degrees) must be reprojected before
/// export. Regions entirely within the skip band keep angular coordinates.
pub fn needs_reprojection(bounds: &GeoBounds, skip_band_deg: f64) -> bool {
    bounds.north.abs().max(bounds.south.abs()) > skip_band_deg
}

fn proj_for(crs: Crs) -> Result<Proj> {
    let def = crs_definitions::from_code(crs.epsg()).ok_or_else(|| {
        Error::reprojection("<crs>", format!("EPSG:{} is not in the CRS database", crs.epsg()))
    })?;
    Proj::from_proj_string(def.proj4).map_err(|e| {
        Error::reprojection("<crs>", format!("invalid projection EPSG:{}: {e:?}", crs.epsg()))
    })
}

/// Project a single point between the two supported references.
/// proj4rs works in radians for angular coordinates; degree conversion is
/// handled here so callers stay in degrees/meters.
pub fn project_point(from: Crs, to: Crs, x: f64, y: f64) -> Result<(f64, f64)> {
    if from == to {
        return Ok((x, y));
    }
    let source = proj_for(from)?;
    let target = proj_for(to)?;

    let (x_in, y_in) = if from.is_angular() {
        (x.to_radians(), y.to_radians())
    } else {
        (x, y)
    };
    let mut point = (x_in, y_in, 0.0);
    transform(&source, &target, &mut point)
        .map_err(|e| Error::reprojection("<point>", format!("{from} -> {to} failed: {e:?}")))?;

    if to.is_angular() {
        Ok((point.0.to_degrees(), point.1.to_degrees()))
    } else {
        Ok((point.0, point.1))
    }
}

/// Geographic (degree) bounds of a raster, back-transformed from the
/// working projection when necessary. Downstream consumers always receive
/// lat/long bounds even when the grid itself is metric.
pub fn geographic_bounds(raster: &Raster) -> Result<GeoBounds> {
    let b = raster.bounds();
    match raster.crs {
        Crs::Geographic => Ok(b),
        Crs::WebMercator => {
            let (west, south) = project_point(Crs::WebMercator, Crs::Geographic, b.west, b.south)?;
            let (east, north) = project_point(Crs::WebMercator, Crs::Geographic, b.east, b.north)?;
            Ok(GeoBounds {
                north,
                south,
                east,
                west,
            })
        }
    }
}

/// Reproject an angular raster to Web Mercator via inverse per-pixel
/// mapping with nodata-aware bilinear sampling.
pub fn reproject_to_mercator(src: &Raster, region: &str) -> Result<Raster> {
    if src.crs != Crs::Geographic {
        return Err(Error::reprojection(
            region,
            format!("source must be angular, got {}", src.crs),
        ));
    }
    if src.width() == 0 || src.height() == 0 {
        return Err(Error::reprojection(region, "source raster is empty"));
    }

    let deg = src.bounds();
    // Mercator x depends only on longitude and y only on latitude, so the
    // corner points bound the projected footprint exactly.
    let (x_min, y_min) = project_point(Crs::Geographic, Crs::WebMercator, deg.west, deg.south)?;
    let (x_max, y_max) = project_point(Crs::Geographic, Crs::WebMercator, deg.east, deg.north)?;
    if !(x_min < x_max && y_min < y_max) {
        return Err(Error::reprojection(region, "projected footprint is empty"));
    }

    // Keep the native column count; the row count follows from near-square
    // metric pixels, then the row height is fitted so the grid covers the
    // projected footprint exactly rather than overshooting south.
    let cols = src.width();
    let pixel_x = (x_max - x_min) / cols as f64;
    let rows = (((y_max - y_min) / pixel_x).round() as usize).max(1);
    let pixel_y = (y_max - y_min) / rows as f64;

    let dst_transform = GeoTransform::north_up(x_min, y_max, pixel_x, pixel_y);
    // Fully initialized destination: any cell the transform does not reach
    // must read as no-data, never as leftover buffer contents.
    let mut dst = Raster::filled_nodata(rows, cols, dst_transform, Crs::WebMercator);

    // Build the projection pair once; constructing a Proj per pixel turns
    // continent-scale rasters into parse-bound loops.
    let source = proj_for(Crs::WebMercator)?;
    let target = proj_for(Crs::Geographic)?;

    for row in 0..rows {
        let y = y_max - (row as f64 + 0.5) * pixel_y;
        for col in 0..cols {
            let x = x_min + (col as f64 + 0.5) * pixel_x;
            let mut point = (x, y, 0.0);
            if transform(&source, &target, &mut point).is_err() {
                continue;
            }
            let (lon, lat) = (point.0.to_degrees(), point.1.to_degrees());
            let (pcol, prow) = src.transform.geo_to_pixel(lon, lat);
            if let Some(value) = src.sample_bilinear(pcol - 0.5, prow - 0.5) {
                dst.data[[row, col]] = value;
            }
        }
    }

    let mid_lat = deg.mid_latitude();
    info!(
        "reprojected '{}' to mercator: {}x{} -> {}x{} ({}m/px at lat {:.1})",
        region,
        src.width(),
        src.height(),
        cols,
        rows,
        pixel_x.round(),
        mid_lat
    );
    debug!(
        "mercator footprint x {:.0}..{:.0} y {:.0}..{:.0}",
        x_min, x_max, y_min, y_max
    );

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    const WEB_MERCATOR_SCALE: f64 = 6378137.0; // meters per radian of longitude

    fn geographic_raster(bounds: GeoBounds, cols: usize, rows: usize, fill: f64) -> Raster {
        Raster::new(
            Array2::from_elem((rows, cols), fill),
            GeoTransform::north_up(
                bounds.west,
                bounds.north,
                bounds.width() / cols as f64,
                bounds.height() / rows as f64,
            ),
            Crs::Geographic,
        )
    }

    #[test]
    fn project_point_round_trip() {
        let (x, y) = project_point(Crs::Geographic, Crs::WebMercator, 10.0, 51.5).unwrap();
        let (lon, lat) = project_point(Crs::WebMercator, Crs::Geographic, x, y).unwrap();
        assert_relative_eq!(lon, 10.0, epsilon = 1e-6);
        assert_relative_eq!(lat, 51.5, epsilon = 1e-6);
    }

    #[test]
    fn mercator_origin_is_zero() {
        let (x, y) = project_point(Crs::Geographic, Crs::WebMercator, 0.0, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn mercator_x_is_linear_in_longitude() {
        let (x, _) = project_point(Crs::Geographic, Crs::WebMercator, 45.0, 20.0).unwrap();
        assert_relative_eq!(
            x,
            45f64.to_radians() * WEB_MERCATOR_SCALE,
            epsilon = 1.0
        );
    }

    #[test]
    fn skip_band_rule() {
        let equatorial = GeoBounds {
            north: 3.0,
            south: -2.0,
            east: 10.0,
            west: 8.0,
        };
        let temperate = GeoBounds {
            north: 48.0,
            south: 44.0,
            east: 10.0,
            west: 8.0,
        };
        let straddling = GeoBounds {
            north: 6.0,
            south: -1.0,
            east: 10.0,
            west: 8.0,
        };
        assert!(!needs_reprojection(&equatorial, EQUATOR_SKIP_BAND_DEG));
        assert!(needs_reprojection(&temperate, EQUATOR_SKIP_BAND_DEG));
        assert!(needs_reprojection(&straddling, EQUATOR_SKIP_BAND_DEG));
    }

    #[test]
    fn output_preserves_true_distance_aspect() {
        // 2 degrees of longitude at 60N spans half the true distance of
        // 2 degrees at the equator: the region looks 2:1 in angular terms
        // but is roughly square in true distance. The mercator grid must
        // reflect the corrected proportions.
        let bounds = GeoBounds {
            north: 60.5,
            south: 59.5,
            east: 11.0,
            west: 9.0,
        };
        let src = geographic_raster(bounds, 200, 100, 1.0);
        let out = reproject_to_mercator(&src, "test").unwrap();
        // Mercator inflates both axes by sec(lat) equally, so width/height
        // in mercator meters matches the angular ratio scaled by the
        // latitude stretch of y.
        let b = out.bounds();
        let expected = {
            let (_, y0) =
                project_point(Crs::Geographic, Crs::WebMercator, 10.0, bounds.south).unwrap();
            let (_, y1) =
                project_point(Crs::Geographic, Crs::WebMercator, 10.0, bounds.north).unwrap();
            (bounds.width().to_radians() * WEB_MERCATOR_SCALE) / (y1 - y0)
        };
        assert_relative_eq!(b.width() / b.height(), expected, epsilon = 0.05);
        // Square pixels in the working grid.
        let px_aspect = (out.width() as f64 / out.height() as f64) / (b.width() / b.height());
        assert!((px_aspect - 1.0).abs() < 0.05, "pixel aspect {px_aspect}");
    }

    #[test]
    fn destination_fully_covered_for_full_source() {
        let bounds = GeoBounds {
            north: 41.0,
            south: 40.0,
            east: 1.0,
            west: 0.0,
        };
        let src = geographic_raster(bounds, 64, 64, 7.5);
        let out = reproject_to_mercator(&src, "full").unwrap();
        // The grid covers the footprint exactly, so every destination cell
        // center maps inside the source.
        assert!(out.valid_fraction() > 0.999);
        for &v in out.data.iter() {
            assert!(out.is_nodata(v) || (v - 7.5).abs() < 1e-9);
        }
    }

    #[test]
    fn uncovered_destination_cells_read_nodata_never_zero() {
        // Mask the northern half of the source; destination cells mapping
        // there must come out as the sentinel, not as 0 or leftovers.
        let bounds = GeoBounds {
            north: 50.0,
            south: 48.0,
            east: 2.0,
            west: 0.0,
        };
        let mut src = geographic_raster(bounds, 80, 80, 100.0);
        for row in 0..40 {
            for col in 0..80 {
                src.data[[row, col]] = f64::NAN;
            }
        }
        let out = reproject_to_mercator(&src, "half").unwrap();
        let fraction = out.valid_fraction();
        assert!(fraction > 0.3 && fraction < 0.7, "fraction {fraction}");
        // Top rows (north) are uncovered; they must be the sentinel.
        for col in 0..out.width() {
            assert!(out.is_nodata(out.data[[0, col]]));
        }
        // No zero ever leaks in: every valid cell is exactly the fill.
        for &v in out.data.iter() {
            assert!(out.is_nodata(v) || (v - 100.0).abs() < 1e-9, "leaked {v}");
        }
    }

    #[test]
    fn output_matches_pointwise_inverse_mapping() {
        // Each destination cell must equal the value obtained by inverse
        // projecting its center independently and sampling the source. A
        // swapped or stale projection pair in the pixel loop fails this on
        // any non-constant grid.
        let bounds = GeoBounds {
            north: 47.0,
            south: 46.0,
            east: 12.0,
            west: 11.0,
        };
        let mut src = geographic_raster(bounds, 48, 48, 0.0);
        for row in 0..48 {
            for col in 0..48 {
                src.data[[row, col]] = 10.0 * row as f64 + col as f64;
            }
        }
        let out = reproject_to_mercator(&src, "pointwise").unwrap();
        for row in (0..out.height()).step_by(7) {
            for col in (0..out.width()).step_by(7) {
                let (x, y) = out.transform.pixel_to_geo(col as f64 + 0.5, row as f64 + 0.5);
                let (lon, lat) =
                    project_point(Crs::WebMercator, Crs::Geographic, x, y).unwrap();
                let (pcol, prow) = src.transform.geo_to_pixel(lon, lat);
                let expected = src.sample_bilinear(pcol - 0.5, prow - 0.5);
                match expected {
                    Some(e) => {
                        assert_relative_eq!(out.data[[row, col]], e, epsilon = 1e-9)
                    }
                    None => assert!(out.is_nodata(out.data[[row, col]])),
                }
            }
        }
    }

    #[test]
    fn metric_source_rejected() {
        let src = Raster::filled_nodata(
            4,
            4,
            GeoTransform::north_up(0.0, 1000.0, 10.0, 10.0),
            Crs::WebMercator,
        );
        assert!(matches!(
            reproject_to_mercator(&src, "already-metric"),
            Err(Error::Reprojection { .. })
        ));
    }

    #[test]
    fn geographic_bounds_back_transform() {
        let bounds = GeoBounds {
            north: 46.0,
            south: 45.0,
            east: 8.0,
            west: 7.0,
        };
        let src = geographic_raster(bounds, 32, 32, 0.0);
        let out = reproject_to_mercator(&src, "back").unwrap();
        let back = geographic_bounds(&out).unwrap();
        assert_relative_eq!(back.west, 7.0, epsilon = 1e-6);
        assert_relative_eq!(back.east, 8.0, epsilon = 1e-6);
        assert_relative_eq!(back.south, 45.0, epsilon = 1e-6);
        assert_relative_eq!(back.north, 46.0, epsilon = 1e-6);
    }
}
