//! Mapbox-compatible places API over HTTP.
//!
//! Reverse: `GET {base}/geocoding/v5/mapbox.places/{lng},{lat}.json?types=..&limit=..`
//! Forward: `GET {base}/geocoding/v5/mapbox.places/{text}.json?bbox=..&limit=..`

use async_trait::async_trait;
use mapnote_core::Coordinate;
use mapnote_settings::GeocodingSettings;
use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::provider::{ForwardQuery, GeocodingProvider, ProviderResponse, ReverseQuery};

const PLACES_PATH: [&str; 3] = ["geocoding", "v5", "mapbox.places"];

/// HTTP geocoding provider.
#[derive(Debug, Clone)]
pub struct MapboxProvider {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl MapboxProvider {
    pub fn new(base_url: &str, access_token: impl Into<String>) -> Result<Self, GeocodeError> {
        let base_url =
            Url::parse(base_url).map_err(|e| GeocodeError::Url(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GeocodeError::Url(format!("{} cannot be a base URL", base_url)));
        }
        let client = Client::builder()
            .user_agent(concat!("mapnote/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url,
            access_token: access_token.into(),
        })
    }

    /// Builds a provider when a token is configured.
    pub fn from_settings(settings: &GeocodingSettings) -> Result<Self, GeocodeError> {
        let token = settings
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(GeocodeError::NotConfigured)?;
        Self::new(&settings.base_url, token)
    }

    /// URL for a search term, which is a single path segment ending in `.json`.
    pub(crate) fn places_url(&self, term: &str) -> Result<Url, GeocodeError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GeocodeError::Url(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(PLACES_PATH);
            segments.push(&format!("{}.json", term));
        }
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<ProviderResponse, GeocodeError> {
        tracing::debug!("GET {}", redact(&url));
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        let raw: serde_json::Value = response.json().await?;
        ProviderResponse::from_json(raw)
    }
}

/// Pulls `message` out of an error body, else a short excerpt.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_token" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

#[async_trait]
impl GeocodingProvider for MapboxProvider {
    fn name(&self) -> &str {
        "mapbox"
    }

    async fn reverse(
        &self,
        coordinate: Coordinate,
        query: &ReverseQuery,
    ) -> Result<ProviderResponse, GeocodeError> {
        let mut url = self.places_url(&format!("{},{}", coordinate.lng, coordinate.lat))?;
        url.query_pairs_mut()
            .append_pair("types", &query.types)
            .append_pair("limit", &query.limit.to_string());
        self.fetch(url).await
    }

    async fn forward(&self, query: &ForwardQuery) -> Result<ProviderResponse, GeocodeError> {
        let mut url = self.places_url(query.text.trim())?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(bbox) = &query.bbox {
                let bbox = bbox
                    .to_array()
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                pairs.append_pair("bbox", &bbox);
            }
            pairs.append_pair("limit", &query.limit.to_string());
        }
        self.fetch(url).await
    }
}
