//! Map engine contract.
//!
//! The editor never talks to a renderer directly. Everything it needs from
//! one (data sources, styled layers, pointer subscriptions, the polygon
//! drawing tool, camera moves and pixel read-back) goes through
//! [`MapEngine`]. Callbacks flow the other way as [`EngineEvent`] values
//! that the embedding code forwards to the editor.

pub mod memory;

use async_trait::async_trait;
use mapnote_core::{BoundingBox, Coordinate, EngineError, Geometry};
use std::fmt;

pub use memory::MemoryEngine;

/// Geometry class a layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Circle,
    Fill,
    Line,
}

/// Paint properties for a layer. Unset values use engine defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPaint {
    /// CSS color, e.g. `#e53935`.
    pub color: String,
    pub opacity: f32,
    /// Circle radius (px).
    pub radius: Option<f32>,
    /// Line width (px).
    pub width: Option<f32>,
    /// Circle blur, 0..1.
    pub blur: Option<f32>,
    /// Screen-space offset (px).
    pub translate: Option<[f32; 2]>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f32>,
    /// Line dash pattern, in line widths.
    pub dash: Option<Vec<f32>>,
}

impl LayerPaint {
    fn base(color: &str) -> Self {
        Self {
            color: color.to_string(),
            opacity: 1.0,
            radius: None,
            width: None,
            blur: None,
            translate: None,
            stroke_color: None,
            stroke_width: None,
            dash: None,
        }
    }

    pub fn circle(color: &str, radius: f32) -> Self {
        Self {
            radius: Some(radius),
            ..Self::base(color)
        }
    }

    pub fn fill(color: &str, opacity: f32) -> Self {
        Self {
            opacity,
            ..Self::base(color)
        }
    }

    pub fn line(color: &str, width: f32) -> Self {
        Self {
            width: Some(width),
            ..Self::base(color)
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_blur(mut self, blur: f32) -> Self {
        self.blur = Some(blur);
        self
    }

    pub fn with_translate(mut self, dx: f32, dy: f32) -> Self {
        self.translate = Some([dx, dy]);
        self
    }

    pub fn with_stroke(mut self, color: &str, width: f32) -> Self {
        self.stroke_color = Some(color.to_string());
        self.stroke_width = Some(width);
        self
    }

    pub fn with_dash(mut self, dash: Vec<f32>) -> Self {
        self.dash = Some(dash);
        self
    }
}

/// A styled layer bound to a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    pub paint: LayerPaint,
    pub visible: bool,
}

impl LayerSpec {
    pub fn new(id: &str, source: &str, kind: LayerKind, paint: LayerPaint) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            kind,
            paint,
            visible: true,
        }
    }
}

/// Mouse cursor affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Grab,
    Grabbing,
    Crosshair,
}

/// Mode of the engine's polygon drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Idle,
    Drawing,
    Selecting,
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawMode::Idle => write!(f, "idle"),
            DrawMode::Drawing => write!(f, "drawing"),
            DrawMode::Selecting => write!(f, "selecting"),
        }
    }
}

/// Handle for a pointer subscription scoped to one data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerSubscription(pub u64);

impl fmt::Display for PointerSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointer({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Enter,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub coordinate: Coordinate,
}

/// Pixels read back from the drawing surface, tightly packed RGBA8.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Callbacks from the engine, forwarded to the editor in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Pointer activity on a subscribed source.
    Pointer {
        subscription: PointerSubscription,
        event: PointerEvent,
    },
    /// Plain click on the map.
    Click { coordinate: Coordinate },
    /// The drawing tool switched modes.
    DrawModeChanged { mode: DrawMode },
    /// The drawing tool completed a shape.
    DrawCreated { features: Vec<Geometry> },
    /// The drawing tool changed vertices of its features.
    DrawUpdated { features: Vec<Geometry> },
    /// The drawing tool deleted its features.
    DrawDeleted,
    /// Rendering settled.
    Idle,
}

/// Operations the editor requires from a map renderer.
///
/// Synchronous calls mirror the imperative style of browser and native map
/// SDKs; only waiting for a settled frame is asynchronous.
#[async_trait]
pub trait MapEngine: Send {
    fn add_source(&mut self, id: &str, data: Geometry) -> Result<(), EngineError>;
    fn set_source_data(&mut self, id: &str, data: Geometry) -> Result<(), EngineError>;
    fn remove_source(&mut self, id: &str) -> Result<(), EngineError>;
    fn has_source(&self, id: &str) -> bool;

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), EngineError>;
    fn remove_layer(&mut self, id: &str) -> Result<(), EngineError>;
    fn has_layer(&self, id: &str) -> bool;
    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<(), EngineError>;

    /// Starts delivering pointer events for features of `source_id`.
    fn subscribe_pointer(&mut self, source_id: &str) -> Result<PointerSubscription, EngineError>;
    /// Returns false when the subscription was not active.
    fn unsubscribe_pointer(&mut self, subscription: PointerSubscription) -> bool;

    fn set_cursor(&mut self, cursor: Cursor);
    fn set_pan_enabled(&mut self, enabled: bool);

    fn set_draw_mode(&mut self, mode: DrawMode);
    fn draw_mode(&self) -> DrawMode;
    /// Removes the drawing tool's own features.
    fn clear_draw_features(&mut self);

    fn fly_to(&mut self, center: Coordinate, zoom: Option<f64>);
    fn fit_bounds(&mut self, bounds: BoundingBox, padding: f64);

    fn is_idle(&self) -> bool;
    /// Resolves once the current frame has finished rendering.
    async fn wait_for_idle(&mut self);
    fn read_pixels(&mut self) -> Result<Frame, EngineError>;
}

/// Removes a layer, treating "not found" as success.
pub(crate) fn remove_layer_quietly<E: MapEngine + ?Sized>(engine: &mut E, id: &str) {
    if let Err(e) = engine.remove_layer(id) {
        if !e.is_not_found() {
            tracing::warn!("Failed to remove layer {}: {}", id, e);
        }
    }
}

/// Removes a source, treating "not found" as success.
pub(crate) fn remove_source_quietly<E: MapEngine + ?Sized>(engine: &mut E, id: &str) {
    if let Err(e) = engine.remove_source(id) {
        if !e.is_not_found() {
            tracing::warn!("Failed to remove source {}: {}", id, e);
        }
    }
}

/// Sets source data, creating the source when it does not exist yet.
pub(crate) fn upsert_source<E: MapEngine + ?Sized>(
    engine: &mut E,
    id: &str,
    data: Geometry,
) -> Result<(), EngineError> {
    if engine.has_source(id) {
        engine.set_source_data(id, data)
    } else {
        engine.add_source(id, data)
    }
}
