//! # Mapnote Geocoding
//!
//! Turns coordinates into address fields and free text into candidate
//! locations.
//!
//! - [`GeocodingProvider`]: async provider seam, with [`MapboxProvider`] as
//!   the HTTP implementation
//! - [`GeocodingCoordinator`]: reverse lookups that never fail; errors are
//!   folded into the returned [`mapnote_core::Resolution`]
//! - [`LocationSearch`]: forward lookups confined to a configured region

pub mod address;
pub mod coordinator;
pub mod error;
pub mod mapbox;
pub mod provider;
pub mod search;

pub use address::{assemble_address, county_from_context, format_full_address};
pub use coordinator::{GeocodingCoordinator, NOT_CONFIGURED, NO_MATCH};
pub use error::GeocodeError;
pub use mapbox::MapboxProvider;
pub use provider::{
    ForwardQuery, GeocodingProvider, PlaceContext, PlaceFeature, PlaceProperties,
    ProviderResponse, ReverseQuery,
};
pub use search::{LocationSearch, SearchRegion, SearchSuggestion};
