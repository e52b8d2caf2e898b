use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Pixel budget must be greater than 0")]
    ZeroPixelBudget,

    #[error("Region not found in boundary collection: {region}")]
    UnknownRegion { region: String },

    #[error("Boundary collection is empty: {path}")]
    EmptyCollection { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Boundary error: {0}")]
    Geometry(#[from] demgrid::io::GeometryError),
}
