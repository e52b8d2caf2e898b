//! High-level, ergonomic library API: process regions from a boundary
//! collection to versioned artifacts on disk, with batch helpers. Prefer
//! these entrypoints over the low-level pipeline modules when embedding
//! DEMGRID in another application.
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::acquire::fetch::TileFetcher;
use crate::core::params::PipelineParams;
use crate::core::pipeline::{process_region, PipelineOutput};
use crate::error::Result;
use crate::io::geometry::RegionBoundary;
use crate::io::writers::{Manifest, ManifestEntry, RegionExportRecord};

/// Outcome counters for a batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub errors: usize,
}

/// Process one region and write its versioned artifact under `output_dir`.
/// Returns the artifact path and the pipeline output for inspection.
pub fn process_region_to_path(
    region: &RegionBoundary,
    fetcher: &dyn TileFetcher,
    params: &PipelineParams,
    output_dir: &Path,
) -> Result<(PathBuf, PipelineOutput)> {
    let out = process_region(region, fetcher, params)?;
    let record =
        RegionExportRecord::from_raster(&region.region_id, &region.name, params.dataset, &out.raster)?;
    let path = record.write_versioned(output_dir, params.generation)?;
    info!("{}: wrote {:?}", region.region_id, path);
    Ok((path, out))
}

/// Process every region in `regions` into `output_dir`, then rewrite the
/// run manifest wholesale. Entries from a prior manifest carry over for
/// regions that did not succeed this run: a failed region's prior valid
/// artifact stays authoritative until reprocessing succeeds. If
/// `continue_on_error` is true, per-region failures are logged and
/// counted; otherwise the first failure is returned (the manifest is
/// still written for the regions that succeeded before it).
pub fn process_regions(
    regions: &[RegionBoundary],
    fetcher: &dyn TileFetcher,
    params: &PipelineParams,
    output_dir: &Path,
    continue_on_error: bool,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    let mut manifest = match Manifest::read(output_dir) {
        Ok(prior) => {
            let mut m = Manifest::new(params.generation);
            m.regions = prior.regions;
            m
        }
        Err(_) => Manifest::new(params.generation),
    };
    let mut first_error = None;

    for region in regions {
        match process_region_to_path(region, fetcher, params, output_dir) {
            Ok((path, out)) => {
                report.processed += 1;
                let artifact = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                manifest.insert(
                    &region.region_id,
                    ManifestEntry {
                        artifact,
                        dataset: params.dataset.spec().id.to_owned(),
                        width: out.raster.width(),
                        height: out.raster.height(),
                        display_interval_m: out.decision.display_interval_m,
                    },
                );
            }
            Err(e) => {
                report.errors += 1;
                error!("{}: {}", region.region_id, e);
                if !continue_on_error {
                    first_error = Some(e);
                    break;
                }
            }
        }
    }

    manifest.write(output_dir)?;
    match first_error {
        Some(e) => Err(e),
        None => Ok(report),
    }
}
