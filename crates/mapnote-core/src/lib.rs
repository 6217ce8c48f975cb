//! # Mapnote Core
//!
//! Core types for the map annotation editor: coordinates and polygons,
//! the unified [`MapAnnotation`] record, its GeoJSON/persisted forms, the
//! error taxonomy and the per-editor event bus.
//!
//! Everything in this crate is plain data. Behaviour that talks to a map
//! engine or a geocoding service lives in the editor and geocoding crates.

pub mod annotation;
pub mod constants;
pub mod error;
pub mod event_bus;
pub mod geojson;
pub mod geometry;
pub mod persisted;
pub mod state;

pub use annotation::{
    Address, AnnotationKind, MapAnnotation, PreviewImage, PreviewSource, Resolution,
    ResolutionDebug, ResolutionSource,
};
pub use error::{AnnotationError, EngineError, Error, GeometryError, Result};
pub use event_bus::{
    AnnotationEvent, CaptureEvent, DrawingEvent, EditorEvent, EventBus, EventCategory,
    EventFilter, GeocodingEvent, SearchEvent, SubscriptionId,
};
pub use geojson::Geometry;
pub use geometry::{AreaGeometry, BoundingBox, Coordinate, Polygon, PolygonSet};
pub use persisted::PersistedAnnotation;
pub use state::DrawingState;
