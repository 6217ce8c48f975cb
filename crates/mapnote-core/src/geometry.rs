//! Coordinates, polygon rings and bounding boxes.
//!
//! Coordinates follow the GeoJSON convention: longitude first, then
//! latitude. Rings are stored closed (last vertex repeats the first).
//! A [`Polygon`] can only be built through validating constructors, so any
//! value of the type has a closed outer ring with at least three distinct
//! vertices. A [`PolygonSet`] always holds at least one polygon.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GeometryError;

/// A WGS84 position, serialized as `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    /// Creates a coordinate from longitude and latitude.
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Checks that both components are finite and within WGS84 bounds.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let ok = self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat);
        if ok {
            Ok(())
        } else {
            Err(GeometryError::InvalidCoordinate {
                lng: self.lng,
                lat: self.lat,
            })
        }
    }

    /// Formats as `"lat, lng"`, the last-resort address text.
    pub fn lat_lng_label(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lng)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lng, c.lat]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}]", self.lng, self.lat)
    }
}

/// Axis-aligned bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Bounds of a set of coordinates, `None` when empty.
    pub fn from_coordinates<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first.lng, first.lat, first.lng, first.lat);
        for c in iter {
            bbox.extend(c);
        }
        Some(bbox)
    }

    /// Grows the box to include a coordinate.
    pub fn extend(&mut self, c: &Coordinate) {
        self.west = self.west.min(c.lng);
        self.south = self.south.min(c.lat);
        self.east = self.east.max(c.lng);
        self.north = self.north.max(c.lat);
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.west.min(other.west),
            self.south.min(other.south),
            self.east.max(other.east),
            self.north.max(other.north),
        )
    }

    /// Whether the coordinate lies inside (edges inclusive).
    pub fn contains(&self, c: &Coordinate) -> bool {
        c.lng >= self.west && c.lng <= self.east && c.lat >= self.south && c.lat <= self.north
    }

    /// Center of the box.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    /// Returns `[west, south, east, north]`, the provider query order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

/// Counts distinct vertices of an open vertex list.
fn distinct_vertex_count(vertices: &[Coordinate]) -> usize {
    let mut seen: Vec<&Coordinate> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if !seen.iter().any(|s| *s == v) {
            seen.push(v);
        }
    }
    seen.len()
}

/// Validates a closed ring.
fn validate_ring(ring: &[Coordinate]) -> Result<(), GeometryError> {
    if ring.len() < 2 || ring.first() != ring.last() {
        return Err(GeometryError::UnclosedRing);
    }
    for c in ring {
        c.validate()?;
    }
    let count = distinct_vertex_count(&ring[..ring.len() - 1]);
    if count < 3 {
        return Err(GeometryError::TooFewVertices { count });
    }
    Ok(())
}

/// A polygon: first ring is the outer boundary, the rest are holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Coordinate>>", into = "Vec<Vec<Coordinate>>")]
pub struct Polygon {
    rings: Vec<Vec<Coordinate>>,
}

impl Polygon {
    /// Builds a polygon from closed rings, validating every ring.
    pub fn new(rings: Vec<Vec<Coordinate>>) -> Result<Self, GeometryError> {
        if rings.is_empty() {
            return Err(GeometryError::EmptyGeometry);
        }
        for ring in &rings {
            validate_ring(ring)?;
        }
        Ok(Self { rings })
    }

    /// Builds a single-ring polygon from an open vertex list, closing it.
    ///
    /// A list that already ends on its first vertex is not closed twice.
    pub fn from_vertices(vertices: &[Coordinate]) -> Result<Self, GeometryError> {
        let mut ring = vertices.to_vec();
        match (ring.first().copied(), ring.last().copied()) {
            (Some(first), Some(last)) if ring.len() > 1 && first == last => {}
            (Some(first), Some(_)) => ring.push(first),
            _ => return Err(GeometryError::TooFewVertices { count: 0 }),
        }
        Self::new(vec![ring])
    }

    /// The closed outer ring.
    pub fn outer_ring(&self) -> &[Coordinate] {
        &self.rings[0]
    }

    /// All rings, outer first.
    pub fn rings(&self) -> &[Vec<Coordinate>] {
        &self.rings
    }

    /// Outer ring vertices without the closing duplicate.
    pub fn vertices(&self) -> &[Coordinate] {
        let ring = self.outer_ring();
        &ring[..ring.len() - 1]
    }

    /// Average of the outer ring's vertices; holes are ignored.
    ///
    /// Not an area centroid. Only used to pick a representative address.
    pub fn centroid(&self) -> Coordinate {
        let vertices = self.vertices();
        let n = vertices.len() as f64;
        let (sum_lng, sum_lat) = vertices
            .iter()
            .fold((0.0, 0.0), |(x, y), c| (x + c.lng, y + c.lat));
        Coordinate::new(sum_lng / n, sum_lat / n)
    }

    /// Bounds of the outer ring.
    pub fn bounding_box(&self) -> BoundingBox {
        // Outer ring is non-empty by construction
        BoundingBox::from_coordinates(self.outer_ring())
            .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }
}

impl TryFrom<Vec<Vec<Coordinate>>> for Polygon {
    type Error = GeometryError;

    fn try_from(rings: Vec<Vec<Coordinate>>) -> Result<Self, Self::Error> {
        Polygon::new(rings)
    }
}

impl From<Polygon> for Vec<Vec<Coordinate>> {
    fn from(p: Polygon) -> Self {
        p.rings
    }
}

/// Two or more polygons making up one area. Never empty: the first polygon
/// is held apart from the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonSet {
    first: Polygon,
    rest: Vec<Polygon>,
}

impl PolygonSet {
    pub fn new(polygons: Vec<Polygon>) -> Result<Self, GeometryError> {
        let mut polygons = polygons.into_iter();
        let first = polygons.next().ok_or(GeometryError::EmptyGeometry)?;
        Ok(Self {
            first,
            rest: polygons.collect(),
        })
    }

    pub fn first(&self) -> &Polygon {
        &self.first
    }

    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Polygon> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    pub fn into_vec(self) -> Vec<Polygon> {
        let mut polygons = Vec::with_capacity(self.len());
        polygons.push(self.first);
        polygons.extend(self.rest);
        polygons
    }
}

/// The area part of an annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaGeometry {
    Polygon(Polygon),
    MultiPolygon(PolygonSet),
}

impl AreaGeometry {
    /// Wraps a list of polygons, collapsing a single one to `Polygon`.
    pub fn from_polygons(mut polygons: Vec<Polygon>) -> Result<Self, GeometryError> {
        match polygons.len() {
            0 => Err(GeometryError::EmptyGeometry),
            1 => Ok(AreaGeometry::Polygon(polygons.remove(0))),
            _ => PolygonSet::new(polygons).map(AreaGeometry::MultiPolygon),
        }
    }

    /// The first polygon, whose outer ring drives centroid and fit.
    pub fn primary(&self) -> &Polygon {
        match self {
            AreaGeometry::Polygon(p) => p,
            AreaGeometry::MultiPolygon(set) => set.first(),
        }
    }

    /// All member polygons.
    pub fn polygons(&self) -> Vec<&Polygon> {
        match self {
            AreaGeometry::Polygon(p) => vec![p],
            AreaGeometry::MultiPolygon(set) => set.iter().collect(),
        }
    }

    /// Outer ring of the primary polygon.
    pub fn outer_ring(&self) -> &[Coordinate] {
        self.primary().outer_ring()
    }

    /// Vertex average of the primary outer ring.
    pub fn centroid(&self) -> Coordinate {
        self.primary().centroid()
    }

    /// Bounds covering every outer ring.
    pub fn bounding_box(&self) -> BoundingBox {
        self.polygons()
            .into_iter()
            .skip(1)
            .fold(self.primary().bounding_box(), |bbox, p| {
                bbox.union(&p.bounding_box())
            })
    }
}

impl From<Polygon> for AreaGeometry {
    fn from(p: Polygon) -> Self {
        AreaGeometry::Polygon(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Coordinate> {
        vec![
            Coordinate::new(-93.30, 44.95),
            Coordinate::new(-93.20, 44.95),
            Coordinate::new(-93.20, 45.00),
            Coordinate::new(-93.30, 45.00),
        ]
    }

    #[test]
    fn test_from_vertices_closes_ring() {
        let polygon = Polygon::from_vertices(&square()).unwrap();
        assert_eq!(polygon.outer_ring().len(), 5);
        assert_eq!(polygon.outer_ring()[0], polygon.outer_ring()[4]);
        assert_eq!(polygon.vertices().len(), 4);
    }

    #[test]
    fn test_from_vertices_already_closed() {
        let mut ring = square();
        ring.push(ring[0]);
        let polygon = Polygon::from_vertices(&ring).unwrap();
        assert_eq!(polygon.outer_ring().len(), 5);
    }

    #[test]
    fn test_too_few_distinct_vertices() {
        let a = Coordinate::new(1.0, 1.0);
        let b = Coordinate::new(2.0, 2.0);
        let err = Polygon::from_vertices(&[a, b, a, b]).unwrap_err();
        assert_eq!(err, GeometryError::TooFewVertices { count: 2 });
        assert!(Polygon::from_vertices(&[]).is_err());
    }

    #[test]
    fn test_unclosed_ring_rejected() {
        let err = Polygon::new(vec![square()]).unwrap_err();
        assert_eq!(err, GeometryError::UnclosedRing);
    }

    #[test]
    fn test_invalid_coordinate_rejected() {
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(200.0, 0.0),
            Coordinate::new(0.0, 1.0),
        ];
        assert!(matches!(
            Polygon::from_vertices(&ring),
            Err(GeometryError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_centroid_ignores_holes_and_closure() {
        let outer = Polygon::from_vertices(&square()).unwrap();
        let hole = vec![
            Coordinate::new(-93.26, 44.96),
            Coordinate::new(-93.25, 44.96),
            Coordinate::new(-93.25, 44.97),
            Coordinate::new(-93.26, 44.96),
        ];
        let polygon = Polygon::new(vec![outer.outer_ring().to_vec(), hole]).unwrap();
        let c = polygon.centroid();
        assert!((c.lng - -93.25).abs() < 1e-9);
        assert!((c.lat - 44.975).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box() {
        let polygon = Polygon::from_vertices(&square()).unwrap();
        let bbox = polygon.bounding_box();
        assert_eq!(bbox.to_array(), [-93.30, 44.95, -93.20, 45.00]);
        assert!(bbox.contains(&polygon.centroid()));
    }

    #[test]
    fn test_multipolygon_bounds_cover_all() {
        let a = Polygon::from_vertices(&square()).unwrap();
        let shifted: Vec<Coordinate> = square()
            .iter()
            .map(|c| Coordinate::new(c.lng + 1.0, c.lat + 1.0))
            .collect();
        let b = Polygon::from_vertices(&shifted).unwrap();
        let area = AreaGeometry::from_polygons(vec![a.clone(), b]).unwrap();
        let bbox = area.bounding_box();
        assert!((bbox.east - -92.20).abs() < 1e-9);
        assert!((bbox.north - 46.00).abs() < 1e-9);
        assert_eq!(bbox.west, -93.30);
        assert_eq!(area.centroid(), a.centroid());
    }

    #[test]
    fn test_polygon_set_is_never_empty() {
        assert_eq!(
            PolygonSet::new(Vec::new()).unwrap_err(),
            GeometryError::EmptyGeometry
        );

        let a = Polygon::from_vertices(&square()).unwrap();
        let b = Polygon::from_vertices(&[
            Coordinate::new(-92.0, 44.0),
            Coordinate::new(-91.9, 44.0),
            Coordinate::new(-91.9, 44.1),
        ])
        .unwrap();
        let set = PolygonSet::new(vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.first(), &a);

        let area = AreaGeometry::MultiPolygon(set);
        assert_eq!(area.primary(), &a);
        assert_eq!(area.centroid(), a.centroid());
        assert_eq!(area.bounding_box().east, -91.9);
        match area {
            AreaGeometry::MultiPolygon(set) => assert_eq!(set.into_vec(), vec![a, b]),
            other => panic!("expected multipolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_coordinate_serializes_as_pair() {
        let c = Coordinate::new(-93.265, 44.9778);
        assert_eq!(serde_json::to_string(&c).unwrap(), "[-93.265,44.9778]");
        let back: Coordinate = serde_json::from_str("[-93.265,44.9778]").unwrap();
        assert_eq!(back, c);
        assert_eq!(c.lat_lng_label(), "44.977800, -93.265000");
    }
}
