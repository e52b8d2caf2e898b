//! I/O layer for reading GeoTIFF tiles and GeoJSON boundaries, and
//! `writers` for versioned JSON artifacts and the run manifest.
pub mod geotiff;
pub use geotiff::{read_geotiff, GeoTiffError};

pub mod geometry;
pub use geometry::{load_regions, BoundaryPolygon, GeometryError, RegionBoundary};

pub mod writers;
