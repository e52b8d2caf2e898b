//! End-to-end region processing.
//!
//! Stages run in a fixed order: grid the boundary's extent, fetch tiles,
//! merge, mask to the boundary, reproject when latitude demands it,
//! select the output resolution, resample, validate. Every stage hands a
//! raster to the next; nothing writes to disk here.
use tracing::{debug, info, warn};

use crate::acquire::fetch::{collect_tiles, fetch_all, TileFetcher};
use crate::acquire::grid::split_extent;
use crate::acquire::merge::merge_tiles;
use crate::core::mask::mask_to_boundary;
use crate::core::params::PipelineParams;
use crate::core::reproject::{needs_reprojection, reproject_to_mercator};
use crate::core::resolution::{resample_area, select_resolution, ResolutionDecision};
use crate::core::validate::validate_export;
use crate::error::Result;
use crate::io::geometry::RegionBoundary;
use crate::raster::Raster;

/// A fully processed region, ready for export.
#[derive(Debug)]
pub struct PipelineOutput {
    pub raster: Raster,
    pub decision: ResolutionDecision,
    pub tiles_fetched: usize,
}

pub fn process_region(
    region: &RegionBoundary,
    fetcher: &dyn TileFetcher,
    params: &PipelineParams,
) -> Result<PipelineOutput> {
    let spec = params.dataset.spec();
    let bbox = region.boundary.bounding_box();
    info!(
        "processing {}: bbox {:.4}..{:.4}N {:.4}..{:.4}E, dataset {}",
        region.region_id, bbox.south, bbox.north, bbox.west, bbox.east, spec.id
    );

    let tiles = split_extent(&bbox, params.dataset);
    debug!("{}: extent split into {} tile(s)", region.region_id, tiles.len());

    let outcomes = fetch_all(fetcher, &tiles, spec.fetch_attempts);
    let rasters = collect_tiles(outcomes)?;
    let tiles_fetched = rasters.len();

    let merged = merge_tiles(&rasters)?;
    let masked = mask_to_boundary(&merged, &region.boundary, &region.region_id)?;
    debug!(
        "{}: masked to {}x{} ({:.1}% valid)",
        region.region_id,
        masked.width(),
        masked.height(),
        masked.valid_fraction() * 100.0
    );

    let working = if needs_reprojection(&masked.bounds(), params.equator_skip_band_deg) {
        reproject_to_mercator(&masked, &region.region_id)?
    } else {
        debug!(
            "{}: within {:.1} deg of the equator, skipping reprojection",
            region.region_id, params.equator_skip_band_deg
        );
        masked
    };

    let decision = select_resolution(
        &working,
        spec.native_resolution_m,
        params.pixel_budget,
        params.oversampling_floor,
    )?;
    debug!(
        "{}: {}x{} at {:.1} m/sample (oversampling {:.2}x)",
        region.region_id,
        decision.width,
        decision.height,
        decision.display_interval_m,
        decision.oversampling_ratio
    );
    let resampled = resample_area(&working, decision.width, decision.height);

    if params.validate {
        validate_export(
            &resampled,
            &bbox,
            params.aspect_tolerance,
            params.min_valid_fraction,
        )?;
    } else {
        warn!(
            "{}: export validation disabled, artifact is unchecked",
            region.region_id
        );
    }

    Ok(PipelineOutput {
        raster: resampled,
        decision,
        tiles_fetched,
    })
}
