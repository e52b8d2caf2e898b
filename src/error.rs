//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, GeoTIFF, and geometry errors, and provides semantic
//! variants for each pipeline stage failure mode.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoTIFF reader error: {0}")]
    GeoTiff(#[from] crate::io::GeoTiffError),

    #[error("geometry error for region '{region}': {reason}")]
    Geometry { region: String, reason: String },

    #[error("acquisition failed for tile {tile_id} after {attempts} attempts: {reason}")]
    Acquisition {
        tile_id: String,
        attempts: u32,
        reason: String,
    },

    #[error("reprojection failed for region '{region}': {reason}")]
    Reprojection { region: String, reason: String },

    #[error("pixel budget {budget} violates the oversampling floor: ratio {ratio:.2} < {floor:.1}")]
    ResolutionPolicy {
        budget: usize,
        ratio: f64,
        floor: f64,
    },

    #[error(
        "raster aspect ratio {raster:.3} deviates from geographic truth {geographic:.3} beyond {tolerance:.0}% tolerance"
    )]
    AspectRatio {
        raster: f64,
        geographic: f64,
        tolerance: f64,
    },

    #[error("valid-pixel coverage {fraction:.3} below minimum {floor:.3}")]
    Coverage { fraction: f64, floor: f64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("processing error: {0}")]
    Processing(String),
}

impl Error {
    pub fn geometry(region: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Geometry {
            region: region.into(),
            reason: reason.into(),
        }
    }

    pub fn reprojection(region: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Reprojection {
            region: region.into(),
            reason: reason.into(),
        }
    }
}
