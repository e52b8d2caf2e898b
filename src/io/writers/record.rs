//! Versioned region export records.
//!
//! The format generation lives in the artifact *name* only. The JSON body
//! carries data and provenance, never a version field, so two generations
//! of the same region can coexist side by side and stale readers simply
//! never see names they do not ask for.
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::reproject::geographic_bounds;
use crate::error::Result;
use crate::raster::{GeoBounds, Raster, RasterStats};
use crate::types::Dataset;

/// Summary statistics over the valid pixels of an exported grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExportStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub valid_fraction: f64,
}

/// The persisted artifact a viewer consumes. `bounds` is always in
/// degrees, back-transformed from the working projection, so the viewer
/// never re-transforms proportions itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionExportRecord {
    pub region_id: String,
    /// Dataset identifier, e.g. "srtm_30m".
    pub source: String,
    pub name: String,
    pub width: usize,
    pub height: usize,
    /// Row-major elevation grid, north row first. `null` marks no-data.
    pub elevation: Vec<Vec<Option<f64>>>,
    pub bounds: GeoBounds,
    pub stats: ExportStats,
}

impl RegionExportRecord {
    pub fn from_raster(
        region_id: &str,
        name: &str,
        dataset: Dataset,
        raster: &Raster,
    ) -> Result<Self> {
        let stats = raster.stats().unwrap_or(RasterStats {
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
        });
        let elevation = raster
            .data
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|&v| if raster.is_nodata(v) { None } else { Some(v) })
                    .collect()
            })
            .collect();
        Ok(Self {
            region_id: region_id.to_owned(),
            source: dataset.spec().id.to_owned(),
            name: name.to_owned(),
            width: raster.width(),
            height: raster.height(),
            elevation,
            bounds: geographic_bounds(raster)?,
            stats: ExportStats {
                min: stats.min,
                max: stats.max,
                mean: stats.mean,
                valid_fraction: raster.valid_fraction(),
            },
        })
    }

    /// `<region_id>_<source>_<pixels>px_v<generation>.json`, where
    /// `pixels` is the long side of the grid.
    pub fn artifact_name(&self, generation: u32) -> String {
        let pixels = self.width.max(self.height);
        format!(
            "{}_{}_{}px_v{}.json",
            self.region_id, self.source, pixels, generation
        )
    }

    /// Writes the record under `dir` with its generation-versioned name.
    ///
    /// The write goes through a temp file in the same directory and a
    /// rename, so readers never observe a half-written artifact.
    pub fn write_versioned(&self, dir: &Path, generation: u32) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.artifact_name(generation));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, self)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    }
}
