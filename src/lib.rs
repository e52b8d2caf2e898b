#![doc = r#"
DEMGRID — a boundary-aware elevation grid processing toolkit.

This crate turns region boundaries (GeoJSON) plus cached elevation tiles
(GeoTIFF) into compact, display-ready elevation grids: tiles are fetched
and mosaicked, clipped to the region's true boundary, reprojected to a
metric grid away from the equator, downsampled to a display budget, and
exported as versioned JSON artifacts. It powers the DEMGRID CLI and can
be embedded in your own Rust applications.

Quick start: process a boundary collection
------------------------------------------
```rust,no_run
use std::path::Path;
use demgrid::{DirectoryFetcher, PipelineParams};
use demgrid::io::load_regions;
use demgrid::types::Dataset;

fn main() -> demgrid::Result<()> {
    let regions = load_regions("regions.geojson")
        .map_err(|e| demgrid::Error::Processing(e.to_string()))?;
    let params = PipelineParams {
        dataset: Dataset::Srtm90,
        pixel_budget: 512,
        generation: 1,
        ..PipelineParams::default()
    };
    let fetcher = DirectoryFetcher::new("/data/tiles");
    let report = demgrid::process_regions(
        &regions,
        &fetcher,
        &params,
        Path::new("/out"),
        true, // continue_on_error
    )?;
    println!("processed={} errors={}", report.processed, report.errors);
    Ok(())
}
```

Error handling
--------------
All public functions return `demgrid::Result<T>`; match on
`demgrid::Error` to handle specific cases, e.g. acquisition failures or
export validation rejections.

Useful modules
--------------
- [`api`] — high-level, ergonomic entry points.
- [`core`] — masking, reprojection, resolution policy, validation.
- [`acquire`] — tile gridding, fetching, and mosaic merging.
- [`io`] — GeoTIFF/GeoJSON readers and artifact writers.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod acquire;
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod raster;
pub mod types;

// Curated public API surface
// Types
pub use core::params::PipelineParams;
pub use error::{Error, Result};
pub use raster::{GeoBounds, GeoTransform, Raster};
pub use types::{Crs, Dataset, DatasetSpec};

// Acquisition seam
pub use acquire::{DirectoryFetcher, TileDescriptor, TileFetcher};

// Writers
pub use io::writers::{ExportStats, Manifest, ManifestEntry, RegionExportRecord};

// High-level API re-exports
pub use api::{process_region_to_path, process_regions, BatchReport};
