//! Pipeline parameters suitable for config files and presets.
//!
//! Everything that used to be ambient process state lives here: the
//! format-generation counter is a run parameter, and a generation bump is
//! a new run, not a side-effecting global mutation.
use serde::{Deserialize, Serialize};

use crate::core::reproject::EQUATOR_SKIP_BAND_DEG;
use crate::core::resolution::OVERSAMPLING_FLOOR;
use crate::core::validate::{ASPECT_TOLERANCE, MIN_VALID_FRACTION};
use crate::types::Dataset;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Elevation source dataset.
    pub dataset: Dataset,
    /// Display pixel budget for the long side of the exported grid.
    pub pixel_budget: usize,
    /// Format-generation counter encoded in artifact names.
    pub generation: u32,
    /// Maximum relative aspect-ratio deviation tolerated at export.
    pub aspect_tolerance: f64,
    /// Minimum valid-pixel fraction tolerated at export.
    pub min_valid_fraction: f64,
    /// Oversampling floor for the resolution selector.
    pub oversampling_floor: f64,
    /// Latitude band within which reprojection may be skipped.
    pub equator_skip_band_deg: f64,
    /// Run export validation (disabling is for diagnostics only and is
    /// logged loudly).
    pub validate: bool,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            dataset: Dataset::Srtm30,
            pixel_budget: 512,
            generation: 1,
            aspect_tolerance: ASPECT_TOLERANCE,
            min_valid_fraction: MIN_VALID_FRACTION,
            oversampling_floor: OVERSAMPLING_FLOOR,
            equator_skip_band_deg: EQUATOR_SKIP_BAND_DEG,
            validate: true,
        }
    }
}
