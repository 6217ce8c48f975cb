//! The unified annotation record.
//!
//! A [`MapAnnotation`] bundles an optional pin, an optional area, resolved
//! address fields, the last resolution attempt and an optional preview.
//! Values are never patched in place: every `with_*` method returns a new
//! record, and the kind is always derived from the geometry present, so a
//! pin-only record cannot carry an area and vice versa.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use image::{ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

use crate::error::AnnotationError;
use crate::geometry::{AreaGeometry, Coordinate};

/// Which geometry an annotation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Pin,
    Area,
    Both,
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pin => write!(f, "pin"),
            Self::Area => write!(f, "area"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Resolved postal address parts. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub county: Option<String>,
}

impl Address {
    /// True when no part is set.
    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.county.is_none()
    }
}

/// What triggered an address resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Pin,
    PolygonCentroid,
    Manual,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pin => write!(f, "pin"),
            Self::PolygonCentroid => write!(f, "polygon_centroid"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Diagnostic record of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionDebug {
    pub source: ResolutionSource,
    pub input: Coordinate,
    pub timestamp: DateTime<Utc>,
    /// Raw provider response, when one was received.
    pub response: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Outcome of a resolution: address parts plus the attempt record.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub address: Address,
    pub debug: ResolutionDebug,
}

impl Resolution {
    /// A failed attempt: empty address, error recorded.
    pub fn failed(source: ResolutionSource, input: Coordinate, error: impl Into<String>) -> Self {
        Self {
            address: Address::default(),
            debug: ResolutionDebug {
                source,
                input,
                timestamp: Utc::now(),
                response: None,
                error: Some(error.into()),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.debug.error.is_some()
    }
}

/// Where a preview bitmap came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewSource {
    /// Read back from the map engine's drawing surface.
    Captured,
    /// Synthesized locally because capture failed.
    Placeholder,
}

/// A still RGBA image of the map view.
#[derive(Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
    pub source: PreviewSource,
}

impl fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .field("source", &self.source)
            .finish()
    }
}

impl PreviewImage {
    /// Encodes the pixels as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, AnnotationError> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.rgba.clone())
                .ok_or_else(|| AnnotationError::Screenshot("Invalid image dimensions".into()))?;

        let mut png_bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
            .map_err(|e| AnnotationError::Screenshot(format!("PNG encoding failed: {}", e)))?;
        Ok(png_bytes)
    }

    /// Encodes as a `data:image/png;base64,...` URI.
    pub fn to_data_uri(&self) -> Result<String, AnnotationError> {
        let png = self.encode_png()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }

    /// Decodes a PNG data URI produced by [`PreviewImage::to_data_uri`].
    pub fn from_data_uri(uri: &str) -> Result<Self, AnnotationError> {
        let payload = uri
            .strip_prefix("data:image/png;base64,")
            .ok_or_else(|| AnnotationError::Screenshot("not a PNG data URI".into()))?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| AnnotationError::Screenshot(format!("base64: {}", e)))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| AnnotationError::Screenshot(format!("PNG decoding failed: {}", e)))?
            .to_rgba8();
        Ok(Self {
            width: img.width(),
            height: img.height(),
            rgba: img.into_raw(),
            source: PreviewSource::Captured,
        })
    }
}

/// The unit handed to the embedding form on save.
#[derive(Debug, Clone, PartialEq)]
pub struct MapAnnotation {
    kind: AnnotationKind,
    point: Option<Coordinate>,
    area: Option<AreaGeometry>,
    hide_pin: bool,
    address: Address,
    resolution_debug: Option<ResolutionDebug>,
    preview_image: Option<PreviewImage>,
}

impl MapAnnotation {
    fn new(kind: AnnotationKind, point: Option<Coordinate>, area: Option<AreaGeometry>) -> Self {
        Self {
            kind,
            point,
            area,
            hide_pin: false,
            address: Address::default(),
            resolution_debug: None,
            preview_image: None,
        }
    }

    /// Builds an annotation from whichever geometry is present.
    ///
    /// Returns `None` when both are absent: "no annotation".
    pub fn from_geometry(point: Option<Coordinate>, area: Option<AreaGeometry>) -> Option<Self> {
        let kind = match (&point, &area) {
            (Some(_), Some(_)) => AnnotationKind::Both,
            (Some(_), None) => AnnotationKind::Pin,
            (None, Some(_)) => AnnotationKind::Area,
            (None, None) => return None,
        };
        Some(Self::new(kind, point, area))
    }

    /// Pin-only annotation.
    pub fn pin(point: Coordinate) -> Self {
        Self::new(AnnotationKind::Pin, Some(point), None)
    }

    /// Area-only annotation.
    pub fn area(area: AreaGeometry) -> Self {
        Self::new(AnnotationKind::Area, None, Some(area))
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// The pin coordinate, if any.
    pub fn point(&self) -> Option<Coordinate> {
        self.point
    }

    /// Display copy of the pin coordinate; always equal to [`Self::point`].
    pub fn pin_center(&self) -> Option<Coordinate> {
        self.point
    }

    pub fn area_geometry(&self) -> Option<&AreaGeometry> {
        self.area.as_ref()
    }

    /// True only when a pin exists and is hidden.
    pub fn hide_pin(&self) -> bool {
        self.point.is_some() && self.hide_pin
    }

    /// Whether the pin should be drawn.
    pub fn pin_visible(&self) -> bool {
        self.point.is_some() && !self.hide_pin
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn resolution_debug(&self) -> Option<&ResolutionDebug> {
        self.resolution_debug.as_ref()
    }

    pub fn preview_image(&self) -> Option<&PreviewImage> {
        self.preview_image.as_ref()
    }

    /// Replaces (or removes) the pin. Address and area carry over;
    /// the preview is dropped since it no longer depicts the geometry.
    pub fn with_point(&self, point: Option<Coordinate>) -> Option<Self> {
        let mut next = Self::from_geometry(point, self.area.clone())?;
        next.hide_pin = self.hide_pin;
        next.address = self.address.clone();
        next.resolution_debug = self.resolution_debug.clone();
        Some(next)
    }

    /// Replaces (or removes) the area. The pin is untouched.
    pub fn with_area(&self, area: Option<AreaGeometry>) -> Option<Self> {
        let mut next = Self::from_geometry(self.point, area)?;
        next.hide_pin = self.hide_pin;
        next.address = self.address.clone();
        next.resolution_debug = self.resolution_debug.clone();
        Some(next)
    }

    /// Sets the hide-pin flag. Never affects the area.
    pub fn with_hide_pin(&self, hide_pin: bool) -> Self {
        let mut next = self.clone();
        next.hide_pin = hide_pin;
        next
    }

    /// Applies a resolution: address fields and debug record are replaced
    /// wholesale, geometry is left alone.
    pub fn with_resolution(&self, resolution: &Resolution) -> Self {
        let mut next = self.clone();
        next.address = resolution.address.clone();
        next.resolution_debug = Some(resolution.debug.clone());
        next
    }

    /// Attaches (or removes) the preview image.
    pub fn with_preview(&self, preview: Option<PreviewImage>) -> Self {
        let mut next = self.clone();
        next.preview_image = preview;
        next
    }

    /// Overrides the address parts directly, e.g. when seeding from storage.
    pub fn with_address(&self, address: Address) -> Self {
        let mut next = self.clone();
        next.address = address;
        next
    }

    /// Coordinate used to describe the annotation: the pin, else the area centroid.
    pub fn representative_point(&self) -> Coordinate {
        match (&self.point, &self.area) {
            (Some(p), _) => *p,
            (None, Some(area)) => area.centroid(),
            // from_geometry never builds an empty annotation
            (None, None) => Coordinate::new(0.0, 0.0),
        }
    }

    /// One-line description of type and location.
    pub fn describe(&self) -> String {
        let at = self.representative_point();
        match (&self.kind, &self.area) {
            (AnnotationKind::Pin, _) => format!("Pin at {}", at.lat_lng_label()),
            (AnnotationKind::Area, Some(area)) => format!(
                "Area of {} points near {}",
                area.primary().vertices().len(),
                at.lat_lng_label()
            ),
            (AnnotationKind::Both, Some(area)) => format!(
                "Pin and area of {} points at {}",
                area.primary().vertices().len(),
                at.lat_lng_label()
            ),
            _ => format!("Location {}", at.lat_lng_label()),
        }
    }

    /// Checks the kind/geometry agreement.
    pub fn check_invariants(&self) -> Result<(), AnnotationError> {
        let mismatch = |reason: &str| AnnotationError::KindMismatch {
            kind: self.kind.to_string(),
            reason: reason.to_string(),
        };
        match self.kind {
            AnnotationKind::Pin if self.area.is_some() => Err(mismatch("pin carries an area")),
            AnnotationKind::Pin if self.point.is_none() => Err(mismatch("pin without point")),
            AnnotationKind::Area if self.point.is_some() => Err(mismatch("area carries a point")),
            AnnotationKind::Area if self.area.is_none() => Err(mismatch("area without polygon")),
            AnnotationKind::Both if self.point.is_none() || self.area.is_none() => {
                Err(mismatch("both requires point and polygon"))
            }
            _ => {
                if let Some(p) = &self.point {
                    p.validate()?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;

    fn area() -> AreaGeometry {
        Polygon::from_vertices(&[
            Coordinate::new(-93.30, 44.95),
            Coordinate::new(-93.20, 44.95),
            Coordinate::new(-93.20, 45.00),
        ])
        .unwrap()
        .into()
    }

    #[test]
    fn test_kind_follows_geometry() {
        let pin = MapAnnotation::pin(Coordinate::new(-93.265, 44.9778));
        assert_eq!(pin.kind(), AnnotationKind::Pin);
        assert!(pin.area_geometry().is_none());

        let both = pin.with_area(Some(area())).unwrap();
        assert_eq!(both.kind(), AnnotationKind::Both);
        assert_eq!(both.point(), pin.point());

        let area_only = both.with_point(None).unwrap();
        assert_eq!(area_only.kind(), AnnotationKind::Area);
        assert!(area_only.point().is_none());

        assert!(area_only.with_area(None).is_none());
        assert!(MapAnnotation::from_geometry(None, None).is_none());
    }

    #[test]
    fn test_pin_center_tracks_point() {
        let a = MapAnnotation::pin(Coordinate::new(1.0, 2.0));
        let b = a.with_point(Some(Coordinate::new(3.0, 4.0))).unwrap();
        assert_eq!(b.pin_center(), b.point());
    }

    #[test]
    fn test_hide_pin_needs_a_pin() {
        let a = MapAnnotation::area(area()).with_hide_pin(true);
        assert!(!a.hide_pin());
        assert!(a.area_geometry().is_some());

        let p = MapAnnotation::pin(Coordinate::new(1.0, 2.0)).with_hide_pin(true);
        assert!(p.hide_pin());
        assert!(!p.pin_visible());
    }

    #[test]
    fn test_resolution_overwrites_debug() {
        let c = Coordinate::new(1.0, 2.0);
        let a = MapAnnotation::pin(c)
            .with_resolution(&Resolution::failed(ResolutionSource::Pin, c, "first"));
        let b = a.with_resolution(&Resolution::failed(
            ResolutionSource::Manual,
            c,
            "second",
        ));
        let debug = b.resolution_debug().unwrap();
        assert_eq!(debug.source, ResolutionSource::Manual);
        assert_eq!(debug.error.as_deref(), Some("second"));
    }

    #[test]
    fn test_geometry_change_drops_preview() {
        let preview = PreviewImage {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255],
            source: PreviewSource::Placeholder,
        };
        let a = MapAnnotation::pin(Coordinate::new(1.0, 2.0)).with_preview(Some(preview));
        assert!(a.preview_image().is_some());
        let b = a.with_point(Some(Coordinate::new(1.5, 2.0))).unwrap();
        assert!(b.preview_image().is_none());
    }

    #[test]
    fn test_data_uri_round_trip() {
        let preview = PreviewImage {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 0, 255, 255],
            source: PreviewSource::Captured,
        };
        let uri = preview.to_data_uri().unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        let back = PreviewImage::from_data_uri(&uri).unwrap();
        assert_eq!(back.rgba, preview.rgba);
        assert!(PreviewImage::from_data_uri("https://example.com/a.png").is_err());
    }

    #[test]
    fn test_describe() {
        let pin = MapAnnotation::pin(Coordinate::new(-93.265, 44.9778));
        assert_eq!(pin.describe(), "Pin at 44.977800, -93.265000");
        let a = MapAnnotation::area(area());
        assert!(a.describe().starts_with("Area of 3 points"));
    }
}
