//! Headless map engine.
//!
//! Keeps sources, layers, subscriptions and camera requests in memory so the
//! editor can run without a renderer: in tests, in the CLI, or in a server
//! that only needs annotation logic.

use async_trait::async_trait;
use mapnote_core::{BoundingBox, Coordinate, EngineError, Geometry};
use std::collections::HashMap;
use tokio::sync::mpsc;

use super::{
    Cursor, DrawMode, EngineEvent, Frame, LayerSpec, MapEngine, PointerEvent, PointerKind,
    PointerSubscription,
};

/// Last camera request.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraRequest {
    FlyTo {
        center: Coordinate,
        zoom: Option<f64>,
    },
    FitBounds {
        bounds: BoundingBox,
        padding: f64,
    },
}

/// In-memory [`MapEngine`].
#[derive(Debug)]
pub struct MemoryEngine {
    sources: HashMap<String, Geometry>,
    layers: Vec<LayerSpec>,
    subscriptions: HashMap<PointerSubscription, String>,
    next_subscription: u64,
    cursor: Cursor,
    pan_enabled: bool,
    draw_mode: DrawMode,
    mode_history: Vec<DrawMode>,
    draw_features_cleared: usize,
    camera: Vec<CameraRequest>,
    idle: bool,
    frame: Result<Frame, EngineError>,
    events: Option<mpsc::UnboundedSender<EngineEvent>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            layers: Vec::new(),
            subscriptions: HashMap::new(),
            next_subscription: 1,
            cursor: Cursor::Default,
            pan_enabled: true,
            draw_mode: DrawMode::Idle,
            mode_history: Vec::new(),
            draw_features_cleared: 0,
            camera: Vec::new(),
            idle: true,
            frame: Err(EngineError::SurfaceUnavailable),
            events: None,
        }
    }

    /// Echoes mode changes back as [`EngineEvent::DrawModeChanged`], as a
    /// live drawing tool does.
    pub fn with_event_sink(mut self, sink: mpsc::UnboundedSender<EngineEvent>) -> Self {
        self.events = Some(sink);
        self
    }

    /// What [`MapEngine::read_pixels`] returns from now on.
    pub fn set_frame(&mut self, frame: Result<Frame, EngineError>) {
        self.frame = frame;
    }

    /// Fills the surface with one opaque color.
    pub fn set_solid_frame(&mut self, width: u32, height: u32, rgb: [u8; 3]) {
        let pixel = [rgb[0], rgb[1], rgb[2], 255];
        let rgba = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        self.frame = Ok(Frame {
            width,
            height,
            rgba,
        });
    }

    /// Marks a render as in progress; the next `wait_for_idle` completes it.
    pub fn set_busy(&mut self) {
        self.idle = false;
    }

    pub fn source(&self, id: &str) -> Option<&Geometry> {
        self.sources.get(id)
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Layer ids in stacking order, bottom first.
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn pan_enabled(&self) -> bool {
        self.pan_enabled
    }

    /// Every mode passed to `set_draw_mode`, in order.
    pub fn mode_history(&self) -> &[DrawMode] {
        &self.mode_history
    }

    pub fn draw_features_cleared(&self) -> usize {
        self.draw_features_cleared
    }

    pub fn camera_requests(&self) -> &[CameraRequest] {
        &self.camera
    }

    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    /// The active subscription for a source, if any.
    pub fn subscription_for(&self, source_id: &str) -> Option<PointerSubscription> {
        self.subscriptions
            .iter()
            .find(|(_, source)| source.as_str() == source_id)
            .map(|(sub, _)| *sub)
    }

    /// Builds pointer events for every active subscription on a source.
    pub fn pointer_events(
        &self,
        source_id: &str,
        kind: PointerKind,
        coordinate: Coordinate,
    ) -> Vec<EngineEvent> {
        self.subscriptions
            .iter()
            .filter(|(_, source)| source.as_str() == source_id)
            .map(|(subscription, _)| EngineEvent::Pointer {
                subscription: *subscription,
                event: PointerEvent { kind, coordinate },
            })
            .collect()
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MapEngine for MemoryEngine {
    fn add_source(&mut self, id: &str, data: Geometry) -> Result<(), EngineError> {
        if self.sources.contains_key(id) {
            return Err(EngineError::Other {
                message: format!("source {} already exists", id),
            });
        }
        self.sources.insert(id.to_string(), data);
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: Geometry) -> Result<(), EngineError> {
        match self.sources.get_mut(id) {
            Some(slot) => {
                *slot = data;
                Ok(())
            }
            None => Err(EngineError::SourceNotFound { id: id.to_string() }),
        }
    }

    fn remove_source(&mut self, id: &str) -> Result<(), EngineError> {
        if self.layers.iter().any(|l| l.source == id) {
            return Err(EngineError::Other {
                message: format!("source {} is still in use by a layer", id),
            });
        }
        self.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EngineError::SourceNotFound { id: id.to_string() })
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), EngineError> {
        if self.has_layer(&layer.id) {
            return Err(EngineError::Other {
                message: format!("layer {} already exists", layer.id),
            });
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(EngineError::SourceNotFound { id: layer.source });
        }
        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), EngineError> {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        if self.layers.len() == before {
            return Err(EngineError::LayerNotFound { id: id.to_string() });
        }
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<(), EngineError> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| EngineError::LayerNotFound { id: id.to_string() })?;
        layer.visible = visible;
        Ok(())
    }

    fn subscribe_pointer(&mut self, source_id: &str) -> Result<PointerSubscription, EngineError> {
        if !self.sources.contains_key(source_id) {
            return Err(EngineError::SourceNotFound {
                id: source_id.to_string(),
            });
        }
        let subscription = PointerSubscription(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions
            .insert(subscription, source_id.to_string());
        Ok(subscription)
    }

    fn unsubscribe_pointer(&mut self, subscription: PointerSubscription) -> bool {
        self.subscriptions.remove(&subscription).is_some()
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn set_pan_enabled(&mut self, enabled: bool) {
        self.pan_enabled = enabled;
    }

    fn set_draw_mode(&mut self, mode: DrawMode) {
        self.mode_history.push(mode);
        if self.draw_mode == mode {
            return;
        }
        self.draw_mode = mode;
        if let Some(sink) = &self.events {
            let _ = sink.send(EngineEvent::DrawModeChanged { mode });
        }
    }

    fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    fn clear_draw_features(&mut self) {
        self.draw_features_cleared += 1;
    }

    fn fly_to(&mut self, center: Coordinate, zoom: Option<f64>) {
        self.camera.push(CameraRequest::FlyTo { center, zoom });
        self.idle = false;
    }

    fn fit_bounds(&mut self, bounds: BoundingBox, padding: f64) {
        self.camera.push(CameraRequest::FitBounds { bounds, padding });
        self.idle = false;
    }

    fn is_idle(&self) -> bool {
        self.idle
    }

    async fn wait_for_idle(&mut self) {
        if !self.idle {
            tokio::task::yield_now().await;
            self.idle = true;
        }
    }

    fn read_pixels(&mut self) -> Result<Frame, EngineError> {
        self.frame.clone()
    }
}
