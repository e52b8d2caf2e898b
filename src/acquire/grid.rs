//! Extent splitting: partition a region's bounding extent into a grid of
//! sub-extents honoring the provider's per-request angular span limit.
use crate::raster::GeoBounds;
use crate::types::Dataset;

/// A requested sub-extent: bounding box in degrees plus the dataset it is
/// fetched from. Created by [`split_extent`], consumed by the merger.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDescriptor {
    pub bounds: GeoBounds,
    pub dataset: Dataset,
}

impl TileDescriptor {
    /// Content-addressed identity derived from the rounded bounds and the
    /// dataset's native resolution; doubles as the cache key.
    pub fn id(&self) -> String {
        let spec = self.dataset.spec();
        format!(
            "{}_n{:.4}_s{:.4}_e{:.4}_w{:.4}_{}m",
            spec.id,
            self.bounds.north,
            self.bounds.south,
            self.bounds.east,
            self.bounds.west,
            spec.native_resolution_m as u32
        )
    }
}

/// Partition `bounds` into the minimal grid of sub-extents, each no wider
/// or taller than the dataset's span limit: `ceil(extent / limit)` tiles
/// per axis, evenly split so edges meet exactly.
pub fn split_extent(bounds: &GeoBounds, dataset: Dataset) -> Vec<TileDescriptor> {
    let span = dataset.spec().max_request_span_deg;
    let cols = (bounds.width() / span).ceil().max(1.0) as usize;
    let rows = (bounds.height() / span).ceil().max(1.0) as usize;
    let step_x = bounds.width() / cols as f64;
    let step_y = bounds.height() / rows as f64;

    let mut tiles = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        let north = bounds.north - row as f64 * step_y;
        let south = if row + 1 == rows {
            bounds.south
        } else {
            bounds.north - (row + 1) as f64 * step_y
        };
        for col in 0..cols {
            let west = bounds.west + col as f64 * step_x;
            let east = if col + 1 == cols {
                bounds.east
            } else {
                bounds.west + (col + 1) as f64 * step_x
            };
            tiles.push(TileDescriptor {
                bounds: GeoBounds {
                    north,
                    south,
                    east,
                    west,
                },
                dataset,
            });
        }
    }
    tiles
}
