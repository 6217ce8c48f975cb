//! # Mapnote
//!
//! Pin and area annotations on a map, with address lookup, location search
//! and preview capture.
//!
//! ## Architecture
//!
//! Mapnote is organized as a workspace with multiple crates:
//!
//! 1. **mapnote-core** - Coordinates, polygons, the annotation record, events
//! 2. **mapnote-settings** - Configuration files and environment overrides
//! 3. **mapnote-geocoding** - Reverse lookups and region-limited search
//! 4. **mapnote-editor** - Engine contract, overlays, drawing workflow, capture
//! 5. **mapnote** - Logging setup and a diagnostic command line

pub mod cli;

pub use mapnote_core::{
    Address, AnnotationKind, AreaGeometry, BoundingBox, Coordinate, DrawingState, EditorEvent,
    Error, EventBus, EventFilter, MapAnnotation, PersistedAnnotation, Polygon, PreviewImage,
    Resolution, Result,
};

pub use mapnote_editor::{
    AnnotationEditor, EditorServices, EngineEvent, MapEngine, MemoryEngine, PreviewCapture,
};

pub use mapnote_geocoding::{GeocodingCoordinator, LocationSearch, MapboxProvider, SearchSuggestion};

pub use mapnote_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr, so command output stays clean
/// - RUST_LOG environment variable support, `info` otherwise
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
