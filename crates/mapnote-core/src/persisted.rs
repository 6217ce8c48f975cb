//! Stored form of an annotation.
//!
//! Layout consumed by whatever reads saved posts/listings:
//! `type`, `geometry` (Point for pin and both, Polygon/MultiPolygon for area),
//! `center`, `hidePin`, `polygon` (only for both), `screenshot`, and the
//! address strings.

use serde::{Deserialize, Serialize};

use crate::annotation::{Address, AnnotationKind, MapAnnotation, PreviewImage};
use crate::error::AnnotationError;
use crate::geojson::Geometry;
use crate::geometry::{AreaGeometry, Coordinate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAnnotation {
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_pin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Geometry>,
    /// Data URI or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
}

impl From<&MapAnnotation> for PersistedAnnotation {
    fn from(a: &MapAnnotation) -> Self {
        let area_geometry = a.area_geometry().map(Geometry::from);
        let (geometry, polygon) = match (a.point(), area_geometry) {
            (Some(p), Some(area)) => (Geometry::point(p), Some(area)),
            (Some(p), None) => (Geometry::point(p), None),
            (None, Some(area)) => (area, None),
            // MapAnnotation always carries one of the two
            (None, None) => (Geometry::empty(), None),
        };

        let screenshot = a.preview_image().and_then(|img| match img.to_data_uri() {
            Ok(uri) => Some(uri),
            Err(e) => {
                tracing::warn!("Dropping screenshot from persisted annotation: {}", e);
                None
            }
        });

        let address = a.address().clone();
        Self {
            kind: a.kind(),
            geometry,
            center: Some(a.pin_center().unwrap_or_else(|| a.representative_point())),
            hide_pin: a.point().map(|_| a.hide_pin()),
            polygon,
            screenshot,
            address: address.address,
            city: address.city,
            state: address.state,
            zip: address.zip,
            county: address.county,
        }
    }
}

impl TryFrom<PersistedAnnotation> for MapAnnotation {
    type Error = AnnotationError;

    fn try_from(p: PersistedAnnotation) -> Result<Self, Self::Error> {
        let mismatch = |reason: &str| AnnotationError::KindMismatch {
            kind: p.kind.to_string(),
            reason: reason.to_string(),
        };

        let (point, area) = match p.kind {
            AnnotationKind::Pin => {
                let point = p
                    .geometry
                    .as_point()
                    .or(p.center)
                    .ok_or_else(|| mismatch("pin geometry must be a Point"))?;
                (Some(point), None)
            }
            AnnotationKind::Area => (None, Some(AreaGeometry::try_from(&p.geometry)?)),
            AnnotationKind::Both => {
                let point = p
                    .geometry
                    .as_point()
                    .or(p.center)
                    .ok_or_else(|| mismatch("both requires a Point geometry or center"))?;
                let polygon = p
                    .polygon
                    .as_ref()
                    .ok_or_else(|| mismatch("both requires a polygon"))?;
                (Some(point), Some(AreaGeometry::try_from(polygon)?))
            }
        };

        if let Some(point) = &point {
            point.validate()?;
        }

        let annotation = MapAnnotation::from_geometry(point, area)
            .ok_or(AnnotationError::Empty)?
            .with_hide_pin(p.hide_pin.unwrap_or(false))
            .with_address(Address {
                address: p.address.clone(),
                city: p.city.clone(),
                state: p.state.clone(),
                zip: p.zip.clone(),
                county: p.county.clone(),
            });

        // Only inline PNGs are restored; remote URLs are not fetched
        let preview = match p.screenshot.as_deref() {
            Some(uri) if uri.starts_with("data:") => match PreviewImage::from_data_uri(uri) {
                Ok(img) => Some(img),
                Err(e) => {
                    tracing::debug!("Ignoring unreadable screenshot: {}", e);
                    None
                }
            },
            _ => None,
        };

        Ok(annotation.with_preview(preview))
    }
}
