//! Reverse geocoding for pins and polygon centroids.
//!
//! [`GeocodingCoordinator::resolve`] always produces a [`Resolution`]. When
//! the provider fails, finds no match or is not configured, the address is
//! empty and `debug.error` carries the reason, so callers never branch on
//! failure.

use chrono::Utc;
use mapnote_core::{AreaGeometry, Coordinate, Resolution, ResolutionDebug, ResolutionSource};
use mapnote_settings::GeocodingSettings;
use std::sync::Arc;

use crate::address::assemble_address;
use crate::error::GeocodeError;
use crate::mapbox::MapboxProvider;
use crate::provider::{GeocodingProvider, ReverseQuery};

/// Error text recorded when no provider is available.
pub const NOT_CONFIGURED: &str = "geocoding not configured";

/// Error text recorded when the provider returns no candidates.
pub const NO_MATCH: &str = "no match";

/// Uniform address resolution for every annotation source.
#[derive(Clone)]
pub struct GeocodingCoordinator {
    provider: Option<Arc<dyn GeocodingProvider>>,
    query: ReverseQuery,
}

impl GeocodingCoordinator {
    pub fn new(provider: Arc<dyn GeocodingProvider>) -> Self {
        Self {
            provider: Some(provider),
            query: ReverseQuery::default(),
        }
    }

    /// A coordinator whose every resolution reports "geocoding not configured".
    pub fn unconfigured() -> Self {
        Self {
            provider: None,
            query: ReverseQuery::default(),
        }
    }

    /// Builds the HTTP provider from settings; falls back to unconfigured
    /// when no token is set or the base URL is unusable.
    pub fn from_settings(settings: &GeocodingSettings) -> Self {
        let query = ReverseQuery {
            types: settings.reverse_types.clone(),
            limit: settings.reverse_limit,
        };
        match MapboxProvider::from_settings(settings) {
            Ok(provider) => Self::new(Arc::new(provider)).with_query(query),
            Err(GeocodeError::NotConfigured) => {
                tracing::info!("No geocoding token configured; addresses will not resolve");
                Self::unconfigured().with_query(query)
            }
            Err(e) => {
                tracing::warn!("Geocoding provider unavailable: {}", e);
                Self::unconfigured().with_query(query)
            }
        }
    }

    pub fn with_query(mut self, query: ReverseQuery) -> Self {
        self.query = query;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Resolves a coordinate. Never fails.
    pub async fn resolve(&self, coordinate: Coordinate, source: ResolutionSource) -> Resolution {
        let Some(provider) = &self.provider else {
            return Resolution::failed(source, coordinate, NOT_CONFIGURED);
        };

        match provider.reverse(coordinate, &self.query).await {
            Ok(response) => {
                let Some(best) = response.features.first() else {
                    tracing::warn!("Reverse geocoding {} found no match", coordinate);
                    let mut resolution = Resolution::failed(source, coordinate, NO_MATCH);
                    resolution.debug.response = Some(response.raw);
                    return resolution;
                };
                let address = assemble_address(best, coordinate);
                tracing::debug!(
                    "Resolved {} via {}: {:?}",
                    coordinate,
                    provider.name(),
                    address.address
                );
                Resolution {
                    address,
                    debug: ResolutionDebug {
                        source,
                        input: coordinate,
                        timestamp: Utc::now(),
                        response: Some(response.raw),
                        error: None,
                    },
                }
            }
            Err(e) => {
                tracing::warn!("Reverse geocoding {} failed: {}", coordinate, e);
                Resolution::failed(source, coordinate, e.to_string())
            }
        }
    }

    /// Resolves an area from the vertex average of its outer ring.
    pub async fn resolve_area(&self, area: &AreaGeometry) -> Resolution {
        self.resolve(area.centroid(), ResolutionSource::PolygonCentroid)
            .await
    }
}

impl std::fmt::Debug for GeocodingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingCoordinator")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("query", &self.query)
            .finish()
    }
}
