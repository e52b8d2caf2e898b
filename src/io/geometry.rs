//! Boundary polygon provider: region shapes in geographic degrees,
//! parsed from GeoJSON `Polygon`/`MultiPolygon` geometries.
use std::path::Path;
use thiserror::Error;

use geojson::{GeoJson, Value as GeoJsonValue};

use crate::raster::GeoBounds;

/// Rings with a signed area smaller than this are considered degenerate.
const MIN_RING_AREA_DEG2: f64 = 1e-12;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("I/O error reading boundary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("boundary for region '{region}' is missing")]
    Missing { region: String },
    #[error("boundary for region '{region}' is empty")]
    Empty { region: String },
    #[error("boundary for region '{region}' has zero area")]
    Degenerate { region: String },
    #[error("unsupported geometry type for region '{region}': {kind}")]
    UnsupportedGeometry { region: String, kind: String },
}

/// One region's true shape: an ordered list of rings in (lon, lat) degrees.
///
/// Outer rings and holes are not distinguished; containment uses the
/// even-odd rule, which handles holes and disjoint parts (islands)
/// uniformly. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    rings: Vec<Vec<(f64, f64)>>,
}

impl BoundaryPolygon {
    /// Build from raw rings, rejecting empty or zero-area boundaries.
    pub fn new(rings: Vec<Vec<(f64, f64)>>, region: &str) -> Result<Self, GeometryError> {
        let rings: Vec<Vec<(f64, f64)>> = rings.into_iter().filter(|r| r.len() >= 3).collect();
        if rings.is_empty() {
            return Err(GeometryError::Empty {
                region: region.to_string(),
            });
        }
        let total_area: f64 = rings.iter().map(|r| ring_area(r).abs()).sum();
        if total_area < MIN_RING_AREA_DEG2 {
            return Err(GeometryError::Degenerate {
                region: region.to_string(),
            });
        }
        Ok(BoundaryPolygon { rings })
    }

    /// Build from a GeoJSON geometry value.
    pub fn from_geojson(value: &GeoJsonValue, region: &str) -> Result<Self, GeometryError> {
        let mut rings = Vec::new();
        match value {
            GeoJsonValue::Polygon(polygon) => collect_rings(polygon, &mut rings),
            GeoJsonValue::MultiPolygon(polygons) => {
                for polygon in polygons {
                    collect_rings(polygon, &mut rings);
                }
            }
            other => {
                return Err(GeometryError::UnsupportedGeometry {
                    region: region.to_string(),
                    kind: other.type_name().to_string(),
                });
            }
        }
        BoundaryPolygon::new(rings, region)
    }

    /// Minimal bounding box spanning every ring, disjoint parts included.
    pub fn bounding_box(&self) -> GeoBounds {
        let mut north = f64::NEG_INFINITY;
        let mut south = f64::INFINITY;
        let mut east = f64::NEG_INFINITY;
        let mut west = f64::INFINITY;
        for ring in &self.rings {
            for &(lon, lat) in ring {
                north = north.max(lat);
                south = south.min(lat);
                east = east.max(lon);
                west = west.min(lon);
            }
        }
        GeoBounds {
            north,
            south,
            east,
            west,
        }
    }

    /// Even-odd point-in-polygon test across all rings.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            let n = ring.len();
            let mut j = n - 1;
            for i in 0..n {
                let (xi, yi) = ring[i];
                let (xj, yj) = ring[j];
                if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

fn collect_rings(polygon: &[Vec<Vec<f64>>], out: &mut Vec<Vec<(f64, f64)>>) {
    for ring in polygon {
        out.push(
            ring.iter()
                .filter(|pos| pos.len() >= 2)
                .map(|pos| (pos[0], pos[1]))
                .collect(),
        );
    }
}

/// Signed shoelace area of a ring in square degrees.
fn ring_area(ring: &[(f64, f64)]) -> f64 {
    let n = ring.len();
    let mut sum = 0.0;
    for i in 0..n {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % n];
        sum += x0 * y1 - x1 * y0;
    }
    sum / 2.0
}

/// A named region parsed from a boundary file.
#[derive(Debug, Clone)]
pub struct RegionBoundary {
    pub region_id: String,
    pub name: String,
    pub boundary: BoundaryPolygon,
}

/// Load every region boundary from a GeoJSON FeatureCollection.
///
/// A feature's region id comes from its `id` property, falling back to
/// `name`; features without either (or without supported geometry) are
/// rejected rather than silently skipped.
pub fn load_regions<P: AsRef<Path>>(path: P) -> Result<Vec<RegionBoundary>, GeometryError> {
    let text = std::fs::read_to_string(path)?;
    parse_regions(&text)
}

pub fn parse_regions(text: &str) -> Result<Vec<RegionBoundary>, GeometryError> {
    let geojson: GeoJson = text.parse()?;
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(GeometryError::Missing {
                region: "<bare geometry>".to_string(),
            });
        }
    };

    let mut regions = Vec::with_capacity(features.len());
    for feature in features {
        let region_id = string_property(&feature, "id")
            .or_else(|| string_property(&feature, "name"))
            .ok_or_else(|| GeometryError::Missing {
                region: "<unnamed feature>".to_string(),
            })?;
        let name = string_property(&feature, "name").unwrap_or_else(|| region_id.clone());
        let geometry = feature.geometry.as_ref().ok_or_else(|| GeometryError::Missing {
            region: region_id.clone(),
        })?;
        let boundary = BoundaryPolygon::from_geojson(&geometry.value, &region_id)?;
        regions.push(RegionBoundary {
            region_id,
            name,
            boundary,
        });
    }
    Ok(regions)
}

fn string_property(feature: &geojson::Feature, key: &str) -> Option<String> {
    feature
        .properties
        .as_ref()
        .and_then(|props| props.get(key))
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(west: f64, south: f64, east: f64, north: f64) -> Vec<(f64, f64)> {
        vec![
            (west, south),
            (east, south),
            (east, north),
            (west, north),
            (west, south),
        ]
    }

    #[test]
    fn contains_simple_square() {
        let poly = BoundaryPolygon::new(vec![square(0.0, 0.0, 10.0, 10.0)], "sq").unwrap();
        assert!(poly.contains(5.0, 5.0));
        assert!(!poly.contains(15.0, 5.0));
        assert!(!poly.contains(5.0, -1.0));
    }

    #[test]
    fn holes_are_excluded_by_even_odd_rule() {
        let poly = BoundaryPolygon::new(
            vec![square(0.0, 0.0, 10.0, 10.0), square(4.0, 4.0, 6.0, 6.0)],
            "donut",
        )
        .unwrap();
        assert!(poly.contains(2.0, 2.0));
        assert!(!poly.contains(5.0, 5.0));
    }

    #[test]
    fn disjoint_parts_share_one_bounding_box() {
        let poly = BoundaryPolygon::new(
            vec![square(0.0, 0.0, 1.0, 1.0), square(8.0, 8.0, 9.0, 9.0)],
            "islands",
        )
        .unwrap();
        let bbox = poly.bounding_box();
        assert_eq!(bbox.west, 0.0);
        assert_eq!(bbox.east, 9.0);
        assert_eq!(bbox.south, 0.0);
        assert_eq!(bbox.north, 9.0);
        // The gap between the parts is outside the polygon.
        assert!(!poly.contains(5.0, 5.0));
        assert!(poly.contains(0.5, 0.5));
        assert!(poly.contains(8.5, 8.5));
    }

    #[test]
    fn degenerate_boundary_rejected() {
        let line = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 0.0)];
        let err = BoundaryPolygon::new(vec![line], "line").unwrap_err();
        assert!(matches!(err, GeometryError::Degenerate { .. }));

        let err = BoundaryPolygon::new(vec![], "void").unwrap_err();
        assert!(matches!(err, GeometryError::Empty { .. }));
    }

    #[test]
    fn parse_feature_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "id": "andorra", "name": "Andorra" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[1.4, 42.4], [1.8, 42.4], [1.8, 42.7], [1.4, 42.7], [1.4, 42.4]]]
                }
            }]
        }"#;
        let regions = parse_regions(text).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region_id, "andorra");
        assert_eq!(regions[0].name, "Andorra");
        assert!(regions[0].boundary.contains(1.5, 42.5));
    }

    #[test]
    fn feature_without_geometry_is_an_error() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "id": "ghost" },
                "geometry": null
            }]
        }"#;
        assert!(matches!(
            parse_regions(text),
            Err(GeometryError::Missing { .. })
        ));
    }
}
