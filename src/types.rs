//! Shared types and enums used across demgrid.
//! Includes the coordinate-reference identifier (`Crs`), the elevation
//! source catalogue (`Dataset`, `DatasetSpec`), and their CLI/serde glue.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Coordinate reference of a raster grid.
///
/// Only the two references in active use are supported: geographic degrees
/// (EPSG:4326) for provider tiles and boundaries, and Web Mercator meters
/// (EPSG:3857) as the true-distance working projection.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Crs {
    Geographic,
    WebMercator,
}

impl Crs {
    pub fn epsg(self) -> u16 {
        match self {
            Crs::Geographic => 4326,
            Crs::WebMercator => 3857,
        }
    }

    pub fn from_epsg(code: u16) -> Option<Self> {
        match code {
            4326 => Some(Crs::Geographic),
            3857 => Some(Crs::WebMercator),
            _ => None,
        }
    }

    /// True for degree-based references whose real-world distance per unit
    /// varies with latitude.
    pub fn is_angular(self) -> bool {
        matches!(self, Crs::Geographic)
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Elevation source dataset selector.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum Dataset {
    Srtm30,
    Srtm90,
    Cop90,
}

/// Capabilities of one elevation provider, consumed uniformly by the
/// tile acquirer instead of per-provider branching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetSpec {
    /// Stable identifier used in artifact names and tile cache keys.
    pub id: &'static str,
    /// Native sampling interval in meters.
    pub native_resolution_m: f64,
    /// Hard per-request angular span limit in degrees (both axes).
    pub max_request_span_deg: f64,
    /// Bounded retry budget per tile fetch.
    pub fetch_attempts: u32,
}

impl Dataset {
    pub fn spec(self) -> DatasetSpec {
        match self {
            Dataset::Srtm30 => DatasetSpec {
                id: "srtm_30m",
                native_resolution_m: 30.0,
                max_request_span_deg: 1.0,
                fetch_attempts: 3,
            },
            Dataset::Srtm90 => DatasetSpec {
                id: "srtm_90m",
                native_resolution_m: 90.0,
                max_request_span_deg: 5.0,
                fetch_attempts: 3,
            },
            Dataset::Cop90 => DatasetSpec {
                id: "cop_90m",
                native_resolution_m: 90.0,
                max_request_span_deg: 5.0,
                fetch_attempts: 3,
            },
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.spec().id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crs_epsg_round_trip() {
        assert_eq!(Crs::from_epsg(4326), Some(Crs::Geographic));
        assert_eq!(Crs::from_epsg(3857), Some(Crs::WebMercator));
        assert_eq!(Crs::from_epsg(32633), None);
        assert_eq!(Crs::Geographic.to_string(), "EPSG:4326");
    }

    #[test]
    fn dataset_specs_are_sane() {
        for dataset in [Dataset::Srtm30, Dataset::Srtm90, Dataset::Cop90] {
            let spec = dataset.spec();
            assert!(spec.native_resolution_m > 0.0);
            assert!(spec.max_request_span_deg > 0.0);
            assert!(spec.fetch_attempts >= 1);
        }
        assert_eq!(Dataset::Srtm30.to_string(), "srtm_30m");
    }
}
