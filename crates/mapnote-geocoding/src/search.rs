//! Region-confined forward search.
//!
//! The provider receives the region's bounding box as a hint, but may still
//! return matches outside it, so results are filtered again on their
//! region-level context.

use mapnote_core::{BoundingBox, Coordinate};
use mapnote_settings::SearchSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::GeocodeError;
use crate::provider::{ForwardQuery, GeocodingProvider, PlaceFeature};

/// Target region for search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRegion {
    pub bbox: BoundingBox,
    /// e.g. `US-MN`, compared case-insensitively.
    pub code: String,
    /// e.g. `Minnesota`, compared case-insensitively.
    pub name: String,
}

impl SearchRegion {
    /// Whether the feature's region context (or the feature itself, when it
    /// is a region) names this region.
    pub fn matches(&self, feature: &PlaceFeature) -> bool {
        let same = |code: Option<&str>, name: &str| {
            code.is_some_and(|c| c.eq_ignore_ascii_case(&self.code))
                || name.eq_ignore_ascii_case(&self.name)
        };

        if feature.has_type("region") {
            return same(feature.properties.short_code.as_deref(), &feature.text);
        }
        feature
            .context
            .iter()
            .filter(|c| c.layer() == "region")
            .any(|c| same(c.short_code.as_deref(), &c.text))
    }
}

/// A candidate location for re-centering the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub id: String,
    pub label: String,
    pub center: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl From<&PlaceFeature> for SearchSuggestion {
    fn from(f: &PlaceFeature) -> Self {
        Self {
            id: f.id.clone(),
            label: if f.place_name.is_empty() {
                f.text.clone()
            } else {
                f.place_name.clone()
            },
            center: f.center,
            bbox: f.bounding_box(),
        }
    }
}

/// Forward geocoding with a minimum query length and a region filter.
#[derive(Clone)]
pub struct LocationSearch {
    provider: Arc<dyn GeocodingProvider>,
    region: SearchRegion,
    limit: usize,
    min_query_len: usize,
}

impl LocationSearch {
    pub fn new(provider: Arc<dyn GeocodingProvider>, region: SearchRegion) -> Self {
        Self {
            provider,
            region,
            limit: mapnote_core::constants::SEARCH_RESULT_LIMIT,
            min_query_len: mapnote_core::constants::MIN_SEARCH_QUERY_LEN,
        }
    }

    pub fn from_settings(provider: Arc<dyn GeocodingProvider>, settings: &SearchSettings) -> Self {
        let region = SearchRegion {
            bbox: settings.region.bounding_box(),
            code: settings.region.region_code.clone(),
            name: settings.region.region_name.clone(),
        };
        Self {
            provider,
            region,
            limit: settings.limit,
            min_query_len: settings.min_query_len,
        }
    }

    pub fn region(&self) -> &SearchRegion {
        &self.region
    }

    /// True when the trimmed query is long enough to send.
    pub fn accepts(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_len
    }

    /// Suggestions for a query; empty without a request when too short.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchSuggestion>, GeocodeError> {
        if !self.accepts(query) {
            return Ok(Vec::new());
        }

        let response = self
            .provider
            .forward(&ForwardQuery {
                text: query.trim().to_string(),
                bbox: Some(self.region.bbox),
                limit: self.limit,
            })
            .await?;

        let total = response.features.len();
        let suggestions: Vec<SearchSuggestion> = response
            .features
            .iter()
            .filter(|f| self.region.matches(f))
            .map(SearchSuggestion::from)
            .collect();
        if suggestions.len() < total {
            tracing::debug!(
                "Dropped {} out-of-region results for {:?}",
                total - suggestions.len(),
                query
            );
        }
        Ok(suggestions)
    }
}

impl std::fmt::Debug for LocationSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSearch")
            .field("provider", &self.provider.name())
            .field("region", &self.region)
            .field("limit", &self.limit)
            .field("min_query_len", &self.min_query_len)
            .finish()
    }
}
