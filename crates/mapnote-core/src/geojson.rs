//! Minimal GeoJSON geometry, as exchanged with the map engine and storage.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::geometry::{AreaGeometry, Coordinate, Polygon};

/// GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Coordinate,
    },
    LineString {
        coordinates: Vec<Coordinate>,
    },
    Polygon {
        coordinates: Vec<Vec<Coordinate>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Coordinate>>>,
    },
}

impl Geometry {
    pub fn point(c: Coordinate) -> Self {
        Geometry::Point { coordinates: c }
    }

    /// An open path through the given vertices.
    pub fn line(vertices: &[Coordinate]) -> Self {
        Geometry::LineString {
            coordinates: vertices.to_vec(),
        }
    }

    /// Empty geometry used to blank a source without removing it.
    pub fn empty() -> Self {
        Geometry::LineString {
            coordinates: Vec::new(),
        }
    }

    /// GeoJSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::LineString { .. } => "LineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// The coordinate of a `Point`.
    pub fn as_point(&self) -> Option<Coordinate> {
        match self {
            Geometry::Point { coordinates } => Some(*coordinates),
            _ => None,
        }
    }
}

impl From<&Polygon> for Geometry {
    fn from(p: &Polygon) -> Self {
        Geometry::Polygon {
            coordinates: p.rings().to_vec(),
        }
    }
}

impl From<&AreaGeometry> for Geometry {
    fn from(area: &AreaGeometry) -> Self {
        match area {
            AreaGeometry::Polygon(p) => p.into(),
            AreaGeometry::MultiPolygon(set) => Geometry::MultiPolygon {
                coordinates: set.iter().map(|p| p.rings().to_vec()).collect(),
            },
        }
    }
}

impl TryFrom<&Geometry> for AreaGeometry {
    type Error = GeometryError;

    fn try_from(g: &Geometry) -> Result<Self, Self::Error> {
        match g {
            Geometry::Polygon { coordinates } => {
                Ok(AreaGeometry::Polygon(Polygon::new(coordinates.clone())?))
            }
            Geometry::MultiPolygon { coordinates } => {
                let polygons = coordinates
                    .iter()
                    .map(|rings| Polygon::new(rings.clone()))
                    .collect::<Result<Vec<_>, _>>()?;
                AreaGeometry::from_polygons(polygons)
            }
            other => Err(GeometryError::UnsupportedGeometry {
                kind: other.type_name().to_string(),
            }),
        }
    }
}
