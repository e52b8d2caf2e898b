pub mod manifest;
pub mod record;

pub use manifest::{Manifest, ManifestEntry};
pub use record::{ExportStats, RegionExportRecord};
