//! Error handling for Mapnote
//!
//! Error types for the layers of the editor core:
//! - Geometry errors (invalid coordinates, rings, polygons)
//! - Annotation errors (inconsistent or unconvertible records)
//! - Engine errors (map engine collaborator failures)
//!
//! None of these ever escape the editor's public operations; they are
//! used internally and at conversion boundaries.

use thiserror::Error;

/// Geometry error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Coordinate is non-finite or outside WGS84 bounds
    #[error("Invalid coordinate ({lng}, {lat})")]
    InvalidCoordinate {
        /// Longitude in degrees.
        lng: f64,
        /// Latitude in degrees.
        lat: f64,
    },

    /// Ring has fewer than three distinct vertices
    #[error("Ring needs at least 3 distinct vertices, got {count}")]
    TooFewVertices {
        /// Number of distinct vertices found.
        count: usize,
    },

    /// Ring does not end on its first vertex
    #[error("Ring is not closed")]
    UnclosedRing,

    /// Polygon or multi-polygon has no rings
    #[error("Geometry is empty")]
    EmptyGeometry,

    /// GeoJSON geometry of a type that cannot be used here
    #[error("Unsupported geometry type: {kind}")]
    UnsupportedGeometry {
        /// The GeoJSON type name.
        kind: String,
    },
}

/// Annotation error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotationError {
    /// Neither a pin nor an area was supplied
    #[error("Annotation has no geometry")]
    Empty,

    /// Declared kind does not match the geometry carried
    #[error("Annotation kind {kind} does not match geometry: {reason}")]
    KindMismatch {
        /// The declared kind.
        kind: String,
        /// What is missing or extra.
        reason: String,
    },

    /// Screenshot data could not be decoded
    #[error("Invalid screenshot: {0}")]
    Screenshot(String),

    /// Underlying geometry is invalid
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Map engine error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Data source does not exist
    #[error("Source not found: {id}")]
    SourceNotFound {
        /// The source identifier.
        id: String,
    },

    /// Layer does not exist
    #[error("Layer not found: {id}")]
    LayerNotFound {
        /// The layer identifier.
        id: String,
    },

    /// Drawing surface is missing or lost
    #[error("Drawing surface unavailable")]
    SurfaceUnavailable,

    /// Pixel read-back produced something unusable
    #[error("Invalid frame: {reason}")]
    InvalidFrame {
        /// Why the frame was rejected.
        reason: String,
    },

    /// Anything else the engine reports
    #[error("Engine error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

impl EngineError {
    /// True for "layer/source not found", which tear-down code ignores.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::SourceNotFound { .. } | EngineError::LayerNotFound { .. }
        )
    }
}

/// Main error type for Mapnote
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Annotation error
    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
