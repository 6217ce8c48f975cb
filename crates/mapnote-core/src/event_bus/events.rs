//! What the editor reports, grouped by the part of the editor that emits it.
//!
//! Events are cloneable and serializable so an embedding UI can forward
//! them across a process or log them verbatim.

use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationKind, PreviewSource, ResolutionSource};
use crate::geometry::Coordinate;
use crate::state::DrawingState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    /// Annotation record changes
    Annotation(AnnotationEvent),
    /// Drawing workflow transitions
    Drawing(DrawingEvent),
    /// Address resolution
    Geocoding(GeocodingEvent),
    /// Location search
    Search(SearchEvent),
    /// Preview capture
    Capture(CaptureEvent),
}

impl EditorEvent {
    pub fn category(&self) -> EventCategory {
        match self {
            EditorEvent::Annotation(_) => EventCategory::Annotation,
            EditorEvent::Drawing(_) => EventCategory::Drawing,
            EditorEvent::Geocoding(_) => EventCategory::Geocoding,
            EditorEvent::Search(_) => EventCategory::Search,
            EditorEvent::Capture(_) => EventCategory::Capture,
        }
    }

    /// One-line summary for trace logs.
    pub fn description(&self) -> String {
        match self {
            EditorEvent::Annotation(e) => e.description(),
            EditorEvent::Drawing(e) => e.description(),
            EditorEvent::Geocoding(e) => e.description(),
            EditorEvent::Search(e) => e.description(),
            EditorEvent::Capture(e) => e.description(),
        }
    }
}

/// Coarse grouping used by [`super::EventFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Annotation record events.
    Annotation,
    /// Drawing state events.
    Drawing,
    /// Address resolution events.
    Geocoding,
    /// Location search events.
    Search,
    /// Preview capture events.
    Capture,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Annotation => write!(f, "Annotation"),
            EventCategory::Drawing => write!(f, "Drawing"),
            EventCategory::Geocoding => write!(f, "Geocoding"),
            EventCategory::Search => write!(f, "Search"),
            EventCategory::Capture => write!(f, "Capture"),
        }
    }
}

/// Annotation record events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationEvent {
    /// The annotation was replaced with a new value.
    Changed {
        /// Kind of the new annotation.
        kind: AnnotationKind,
    },
    /// The annotation was cleared.
    Cleared,
    /// The annotation was handed to the embedding form.
    Saved {
        /// Kind of the saved annotation.
        kind: AnnotationKind,
        /// Where its preview came from.
        preview: PreviewSource,
    },
}

impl AnnotationEvent {
    fn description(&self) -> String {
        match self {
            AnnotationEvent::Changed { kind } => format!("Annotation changed ({})", kind),
            AnnotationEvent::Cleared => "Annotation cleared".to_string(),
            AnnotationEvent::Saved { kind, preview } => {
                format!("Annotation saved ({}, {:?} preview)", kind, preview)
            }
        }
    }
}

/// Drawing workflow events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawingEvent {
    /// State machine moved between states.
    StateChanged {
        /// Previous state.
        from: DrawingState,
        /// New state.
        to: DrawingState,
    },
    /// An engine callback was ignored as stale or duplicate.
    CallbackIgnored {
        /// What was ignored.
        reason: String,
    },
}

impl DrawingEvent {
    fn description(&self) -> String {
        match self {
            DrawingEvent::StateChanged { from, to } => format!("Drawing: {} -> {}", from, to),
            DrawingEvent::CallbackIgnored { reason } => format!("Ignored callback: {}", reason),
        }
    }
}

/// Address resolution events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeocodingEvent {
    /// A resolution request was issued.
    Requested {
        /// What triggered it.
        source: ResolutionSource,
        /// Coordinate being resolved.
        input: Coordinate,
    },
    /// A resolution was merged into the annotation.
    Applied {
        /// What triggered it.
        source: ResolutionSource,
        /// Formatted address, if any.
        address: Option<String>,
        /// Provider error, if the attempt failed.
        error: Option<String>,
    },
    /// A resolution arrived after the annotation was cleared.
    Dropped {
        /// Coordinate that had been resolved.
        input: Coordinate,
    },
}

impl GeocodingEvent {
    fn description(&self) -> String {
        match self {
            GeocodingEvent::Requested { source, input } => {
                format!("Resolving {} from {}", input, source)
            }
            GeocodingEvent::Applied {
                address, error, ..
            } => match (address, error) {
                (_, Some(error)) => format!("Resolution failed: {}", error),
                (Some(address), None) => format!("Resolved: {}", address),
                (None, None) => "Resolved with no address".to_string(),
            },
            GeocodingEvent::Dropped { input } => format!("Dropped resolution for {}", input),
        }
    }
}

/// Location search events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchEvent {
    /// The suggestion list was replaced.
    SuggestionsUpdated {
        /// Query the suggestions answer.
        query: String,
        /// Number of suggestions.
        count: usize,
    },
    /// A suggestion was selected and the camera moved.
    Selected {
        /// Suggestion label.
        label: String,
        /// Where the camera flew to.
        center: Coordinate,
    },
}

impl SearchEvent {
    fn description(&self) -> String {
        match self {
            SearchEvent::SuggestionsUpdated { query, count } => {
                format!("{} suggestions for \"{}\"", count, query)
            }
            SearchEvent::Selected { label, .. } => format!("Selected: {}", label),
        }
    }
}

/// Preview capture events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaptureEvent {
    /// A preview was produced.
    Captured {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Whether it was read back or synthesized.
        source: PreviewSource,
    },
    /// Read-back failed and the placeholder was used.
    Fallback {
        /// Why read-back failed.
        reason: String,
    },
}

impl CaptureEvent {
    fn description(&self) -> String {
        match self {
            CaptureEvent::Captured {
                width,
                height,
                source,
            } => format!("Preview {}x{} ({:?})", width, height, source),
            CaptureEvent::Fallback { reason } => format!("Capture fell back: {}", reason),
        }
    }
}
