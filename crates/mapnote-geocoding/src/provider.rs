//! Provider seam and the place-feature model it returns.

use async_trait::async_trait;
use mapnote_core::{BoundingBox, Coordinate};
use serde::{Deserialize, Serialize};

use crate::error::GeocodeError;

/// One entry of a feature's context hierarchy, e.g. `place.123` / "Minneapolis".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceContext {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
}

impl PlaceContext {
    /// Context layer name: the id up to the first dot.
    pub fn layer(&self) -> &str {
        self.id.split('.').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceFeature {
    pub id: String,
    #[serde(default)]
    pub place_type: Vec<String>,
    /// Name of the place itself; the street name for address results.
    #[serde(default)]
    pub text: String,
    /// Full free-form label.
    #[serde(default)]
    pub place_name: String,
    /// House number for address results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub center: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    #[serde(default)]
    pub properties: PlaceProperties,
    #[serde(default)]
    pub context: Vec<PlaceContext>,
}

impl PlaceFeature {
    /// First context entry on the given layer.
    pub fn context_entry(&self, layer: &str) -> Option<&PlaceContext> {
        self.context.iter().find(|c| c.layer() == layer)
    }

    pub fn has_type(&self, place_type: &str) -> bool {
        self.place_type.iter().any(|t| t == place_type)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bbox
            .map(|[west, south, east, north]| BoundingBox::new(west, south, east, north))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<PlaceFeature>,
}

/// Decoded features together with the raw body, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub features: Vec<PlaceFeature>,
    pub raw: serde_json::Value,
}

impl ProviderResponse {
    /// Decodes a feature collection body.
    pub fn from_json(raw: serde_json::Value) -> Result<Self, GeocodeError> {
        let collection: FeatureCollection = serde_json::from_value(raw.clone())?;
        Ok(Self {
            features: collection.features,
            raw,
        })
    }
}

/// Reverse lookup parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseQuery {
    /// Comma-separated result types, e.g. `address`.
    pub types: String,
    pub limit: usize,
}

impl Default for ReverseQuery {
    fn default() -> Self {
        Self {
            types: "address".to_string(),
            limit: 1,
        }
    }
}

/// Forward lookup parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardQuery {
    pub text: String,
    pub bbox: Option<BoundingBox>,
    pub limit: usize,
}

/// A forward/reverse geocoding backend.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Places at or near a coordinate.
    async fn reverse(
        &self,
        coordinate: Coordinate,
        query: &ReverseQuery,
    ) -> Result<ProviderResponse, GeocodeError>;

    /// Places matching free text.
    async fn forward(&self, query: &ForwardQuery) -> Result<ProviderResponse, GeocodeError>;
}
