//! Tile fetching: a provider abstraction with bounded per-tile retries and
//! a parallel batch driver.
//!
//! Fetches are independent network or disk reads with no shared mutable
//! raster, so the batch runs on a bounded worker pool. The merge stage is
//! the synchronization barrier: it only proceeds once every tile's result
//! is known, and a single exhausted tile fails the whole region's
//! acquisition rather than producing a silent partial region.
use std::path::PathBuf;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use crate::acquire::grid::TileDescriptor;
use crate::error::{Error, Result};
use crate::io::geotiff::{self, GeoTiffError};
use crate::raster::Raster;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("tile not available: {0}")]
    NotFound(String),
    #[error("GeoTIFF error: {0}")]
    GeoTiff(#[from] GeoTiffError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of raw elevation tiles. Network retrieval lives behind this seam;
/// the pipeline only sees descriptors going in and rasters coming out.
pub trait TileFetcher: Sync {
    fn fetch(&self, tile: &TileDescriptor) -> std::result::Result<Raster, FetchError>;
}

/// The known outcome of one tile's acquisition, success or exhausted
/// failure. Collected into a batch before merging; never consumed early.
#[derive(Debug)]
pub struct TileOutcome {
    pub tile: TileDescriptor,
    pub attempts: u32,
    pub result: std::result::Result<Raster, FetchError>,
}

fn fetch_with_retry(
    fetcher: &dyn TileFetcher,
    tile: &TileDescriptor,
    max_attempts: u32,
) -> TileOutcome {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match fetcher.fetch(tile) {
            Ok(raster) => {
                debug!("fetched tile {} on attempt {}", tile.id(), attempts);
                return TileOutcome {
                    tile: tile.clone(),
                    attempts,
                    result: Ok(raster),
                };
            }
            Err(e) if attempts < max_attempts => {
                warn!(
                    "tile {} attempt {}/{} failed: {}",
                    tile.id(),
                    attempts,
                    max_attempts,
                    e
                );
            }
            Err(e) => {
                return TileOutcome {
                    tile: tile.clone(),
                    attempts,
                    result: Err(e),
                };
            }
        }
    }
}

/// Fetch every tile, retrying each independently. A failure for one tile
/// never discards tiles already acquired; the batch always contains one
/// outcome per descriptor, in descriptor order.
pub fn fetch_all(
    fetcher: &dyn TileFetcher,
    tiles: &[TileDescriptor],
    max_attempts: u32,
) -> Vec<TileOutcome> {
    tiles
        .par_iter()
        .map(|tile| fetch_with_retry(fetcher, tile, max_attempts))
        .collect()
}

/// Turn a complete batch into rasters, or the region-fatal acquisition
/// error for the first exhausted tile.
pub fn collect_tiles(outcomes: Vec<TileOutcome>) -> Result<Vec<Raster>> {
    let mut rasters = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome.result {
            Ok(raster) => rasters.push(raster),
            Err(e) => {
                return Err(Error::Acquisition {
                    tile_id: outcome.tile.id(),
                    attempts: outcome.attempts,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(rasters)
}

/// Fetcher over an on-disk tile cache keyed by descriptor identity:
/// `<root>/<tile_id>.tif`. Cache population (the actual download) is an
/// external collaborator; a missing file is a fetch failure.
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryFetcher { root: root.into() }
    }

    pub fn tile_path(&self, tile: &TileDescriptor) -> PathBuf {
        self.root.join(format!("{}.tif", tile.id()))
    }
}

impl TileFetcher for DirectoryFetcher {
    fn fetch(&self, tile: &TileDescriptor) -> std::result::Result<Raster, FetchError> {
        let path = self.tile_path(tile);
        if !path.exists() {
            return Err(FetchError::NotFound(path.display().to_string()));
        }
        Ok(geotiff::read_geotiff(&path)?)
    }
}
