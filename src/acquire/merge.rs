//! Tile merger: stitch tiles sharing one native resolution and coordinate
//! reference into a single seamless raster covering the union extent.
use tracing::debug;

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster};

/// Relative tolerance when checking that tiles agree on pixel size.
const PIXEL_SIZE_TOLERANCE: f64 = 1e-6;

/// Merge tiles into one raster over the union of their bounds.
///
/// The destination starts fully no-data. Tiles are scanned in append
/// order and a destination cell takes the first valid sample it sees;
/// overlaps are never averaged, keeping the result deterministic.
pub fn merge_tiles(tiles: &[Raster]) -> Result<Raster> {
    let first = tiles
        .first()
        .ok_or_else(|| Error::Processing("no tiles to merge".into()))?;
    let px_w = first.transform.pixel_width();
    let px_h = first.transform.pixel_height();

    let mut union = first.bounds();
    for tile in &tiles[1..] {
        if tile.crs != first.crs {
            return Err(Error::Processing(format!(
                "cannot merge tiles across coordinate references ({} vs {})",
                tile.crs, first.crs
            )));
        }
        if relative_differs(tile.transform.pixel_width(), px_w)
            || relative_differs(tile.transform.pixel_height(), px_h)
        {
            return Err(Error::Processing(
                "cannot merge tiles with differing native resolutions".into(),
            ));
        }
        union = union.union(&tile.bounds());
    }

    let cols = (union.width() / px_w).round() as usize;
    let rows = (union.height() / px_h.abs()).round() as usize;
    let transform = GeoTransform::north_up(union.west, union.north, px_w, px_h.abs());
    let mut out = Raster::filled_nodata(rows, cols, transform, first.crs);

    for tile in tiles {
        let b = tile.bounds();
        // Offsets snap to the shared grid; rounding kills the half-pixel
        // drift that used to open a gap seam between adjoining tiles.
        let col_off = ((b.west - union.west) / px_w).round() as usize;
        let row_off = ((union.north - b.north) / px_h.abs()).round() as usize;
        for row in 0..tile.height() {
            let out_row = row_off + row;
            if out_row >= rows {
                continue;
            }
            for col in 0..tile.width() {
                let out_col = col_off + col;
                if out_col >= cols {
                    continue;
                }
                let value = tile.data[[row, col]];
                if tile.is_nodata(value) || !out.is_nodata(out.data[[out_row, out_col]]) {
                    continue;
                }
                out.data[[out_row, out_col]] = value;
            }
        }
    }

    debug!(
        "merged {} tiles into {}x{} raster",
        tiles.len(),
        cols,
        rows
    );

    Ok(out)
}

fn relative_differs(a: f64, b: f64) -> bool {
    (a - b).abs() > b.abs() * PIXEL_SIZE_TOLERANCE
}
