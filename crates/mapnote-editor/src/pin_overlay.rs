//! Draggable pin marker drawn as three stacked circle layers.
//!
//! The controller only tracks engine bookkeeping (its pointer subscription
//! and whether a drag is in progress). It never writes the annotation; a
//! finished drag is reported as a [`PinIntent`] for the editor to apply.

use mapnote_core::constants::{
    PIN_BODY_LAYER_ID, PIN_HIGHLIGHT_LAYER_ID, PIN_SHADOW_LAYER_ID, PIN_SOURCE_ID,
};
use mapnote_core::{Coordinate, EngineError, Geometry};

use crate::engine::{
    remove_layer_quietly, remove_source_quietly, Cursor, LayerKind, LayerPaint, LayerSpec,
    MapEngine, PointerEvent, PointerKind, PointerSubscription,
};

const PIN_COLOR: &str = "#e53935";

/// Layer ids bottom to top.
pub const PIN_LAYER_IDS: [&str; 3] = [
    PIN_SHADOW_LAYER_ID,
    PIN_BODY_LAYER_ID,
    PIN_HIGHLIGHT_LAYER_ID,
];

/// What a pointer event means for the editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinIntent {
    /// Nothing to apply.
    None,
    /// A drag ended here. Emitted once per drag.
    Moved(Coordinate),
}

fn pin_layers() -> [LayerSpec; 3] {
    [
        LayerSpec::new(
            PIN_SHADOW_LAYER_ID,
            PIN_SOURCE_ID,
            LayerKind::Circle,
            LayerPaint::circle("#000000", 10.0)
                .with_opacity(0.25)
                .with_blur(0.6)
                .with_translate(0.0, 2.0),
        ),
        LayerSpec::new(
            PIN_BODY_LAYER_ID,
            PIN_SOURCE_ID,
            LayerKind::Circle,
            LayerPaint::circle(PIN_COLOR, 8.0).with_stroke("#ffffff", 2.0),
        ),
        LayerSpec::new(
            PIN_HIGHLIGHT_LAYER_ID,
            PIN_SOURCE_ID,
            LayerKind::Circle,
            LayerPaint::circle("#ffffff", 3.0),
        ),
    ]
}

#[derive(Debug, Default)]
pub struct PinOverlay {
    subscription: Option<PointerSubscription>,
    dragging: bool,
}

impl PinOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_drag_enabled(&self) -> bool {
        self.subscription.is_some()
    }

    /// Recreates the pin source, plus its layers unless `hidden`.
    ///
    /// Any previous source and layers are torn down first, so a rapid run of
    /// placements never leaves stray layers behind. Drag handlers are
    /// detached; call [`Self::enable_drag`] again afterwards.
    pub fn place<E: MapEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        coordinate: Coordinate,
        hidden: bool,
    ) -> Result<(), EngineError> {
        self.teardown(engine);
        engine.add_source(PIN_SOURCE_ID, Geometry::point(coordinate))?;
        if !hidden {
            for layer in pin_layers() {
                engine.add_layer(layer)?;
            }
        }
        tracing::debug!("Pin placed at {} (hidden: {})", coordinate, hidden);
        Ok(())
    }

    /// Shows or hides the pin layers without touching the source. Layers a
    /// hidden placement skipped are created on first show.
    pub fn set_visible<E: MapEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        visible: bool,
    ) -> Result<(), EngineError> {
        if !engine.has_source(PIN_SOURCE_ID) {
            return Ok(());
        }
        for layer in pin_layers() {
            if engine.has_layer(&layer.id) {
                engine.set_layer_visibility(&layer.id, visible)?;
            } else if visible {
                engine.add_layer(layer)?;
            }
        }
        Ok(())
    }

    /// Subscribes to pointer events on the pin source, detaching any
    /// previous subscription first.
    pub fn enable_drag<E: MapEngine + ?Sized>(
        &mut self,
        engine: &mut E,
    ) -> Result<(), EngineError> {
        self.disable_drag(engine);
        self.subscription = Some(engine.subscribe_pointer(PIN_SOURCE_ID)?);
        Ok(())
    }

    pub fn disable_drag<E: MapEngine + ?Sized>(&mut self, engine: &mut E) {
        if let Some(subscription) = self.subscription.take() {
            engine.unsubscribe_pointer(subscription);
        }
        if self.dragging {
            self.end_drag(engine);
        }
    }

    /// Feeds one pointer event through the drag gesture.
    ///
    /// Events for any other subscription are ignored, as are moves and
    /// releases without a preceding press.
    pub fn handle_pointer<E: MapEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        subscription: PointerSubscription,
        event: PointerEvent,
    ) -> PinIntent {
        if self.subscription != Some(subscription) {
            tracing::debug!("Ignoring pointer event for detached {}", subscription);
            return PinIntent::None;
        }
        match event.kind {
            PointerKind::Enter if !self.dragging => engine.set_cursor(Cursor::Grab),
            PointerKind::Leave if !self.dragging => engine.set_cursor(Cursor::Default),
            PointerKind::Down => {
                self.dragging = true;
                engine.set_cursor(Cursor::Grabbing);
                engine.set_pan_enabled(false);
            }
            PointerKind::Move if self.dragging => {
                let point = Geometry::point(event.coordinate);
                if let Err(e) = engine.set_source_data(PIN_SOURCE_ID, point) {
                    tracing::warn!("Failed to move pin: {}", e);
                }
            }
            PointerKind::Up if self.dragging => {
                self.end_drag(engine);
                return PinIntent::Moved(event.coordinate);
            }
            _ => {}
        }
        PinIntent::None
    }

    fn end_drag<E: MapEngine + ?Sized>(&mut self, engine: &mut E) {
        self.dragging = false;
        engine.set_cursor(Cursor::Default);
        engine.set_pan_enabled(true);
    }

    /// Removes the pin's layers, source and drag handlers.
    pub fn clear<E: MapEngine + ?Sized>(&mut self, engine: &mut E) {
        self.teardown(engine);
    }

    fn teardown<E: MapEngine + ?Sized>(&mut self, engine: &mut E) {
        self.disable_drag(engine);
        for id in PIN_LAYER_IDS.iter().rev() {
            remove_layer_quietly(engine, id);
        }
        remove_source_quietly(engine, PIN_SOURCE_ID);
    }
}
