//! # Mapnote Editor
//!
//! Interactive editing of a single pin/area annotation on top of a map
//! engine.
//!
//! ## Components
//!
//! - **Engine contract**: [`MapEngine`] and [`EngineEvent`], with the
//!   headless [`MemoryEngine`]
//! - **Drawing state machine**: idle, drawing, completed
//! - **Overlays**: the draggable pin and the committed polygon, drawn as
//!   ordinary layers so they survive drawing-tool mode changes
//! - **Live edit debouncer**: one model write and lookup per pause
//! - **Preview capture**: surface read-back with a synthesized fallback
//! - **Orchestrator**: [`AnnotationEditor`], the only writer of the model
//!
//! ## Architecture
//!
//! ```text
//! EngineEvent ─┐                     ┌─ PinOverlay
//!              ├─> AnnotationEditor ─┼─ PolygonOverlay ──> MapEngine
//! messages ────┘        │            └─ PreviewCapture
//!    ^                  v
//!    └──── timers, GeocodingCoordinator, LocationSearch
//! ```

pub mod capture;
pub mod debounce;
pub mod editor;
pub mod engine;
pub mod glyphs;
mod message;
pub mod pin_overlay;
pub mod placeholder;
pub mod polygon_overlay;
mod search;
pub mod state_machine;

pub use capture::{CaptureOutcome, PreviewCapture};
pub use debounce::Debouncer;
pub use editor::{AnnotationEditor, EditorServices};
pub use engine::{
    Cursor, DrawMode, EngineEvent, Frame, LayerKind, LayerPaint, LayerSpec, MapEngine,
    MemoryEngine, PointerEvent, PointerKind, PointerSubscription,
};
pub use pin_overlay::{PinIntent, PinOverlay};
pub use placeholder::{render_placeholder, PLACEHOLDER_TITLE};
pub use polygon_overlay::PolygonOverlay;
pub use state_machine::{CancelOutcome, DrawingStateMachine, Transition};
