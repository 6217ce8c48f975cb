//! Annotation editor orchestrator.
//!
//! [`AnnotationEditor`] is the single writer of the annotation and of the
//! drawing tool's mode. Overlay controllers, timers and lookups only hand
//! it data; every change to the model happens in one of its methods.
//!
//! Operations that start timers or lookups spawn tokio tasks and must run
//! inside a runtime. Their completions come back as messages, applied by
//! [`AnnotationEditor::process_pending`], [`AnnotationEditor::pump`] or
//! [`AnnotationEditor::settle`].

use mapnote_core::{
    AnnotationEvent, AnnotationError, AreaGeometry, CaptureEvent, Coordinate, DrawingEvent,
    DrawingState, EditorEvent, EventBus, GeocodingEvent, Geometry, MapAnnotation,
    PersistedAnnotation, Polygon, Resolution, ResolutionSource, SearchEvent,
};
use mapnote_geocoding::{GeocodingCoordinator, LocationSearch, MapboxProvider, SearchSuggestion};
use mapnote_settings::Config;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::capture::PreviewCapture;
use crate::debounce::Debouncer;
use crate::engine::{Cursor, DrawMode, EngineEvent, MapEngine};
use crate::message::EditorMessage;
use crate::pin_overlay::{PinIntent, PinOverlay};
use crate::polygon_overlay::PolygonOverlay;
use crate::search::{SearchController, SearchUpdate};
use crate::state_machine::{DrawingStateMachine, Transition};

/// Lookup services shared by editors.
#[derive(Clone)]
pub struct EditorServices {
    pub coordinator: Arc<GeocodingCoordinator>,
    pub search: Option<LocationSearch>,
}

impl EditorServices {
    pub fn new(coordinator: GeocodingCoordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            search: None,
        }
    }

    pub fn with_search(mut self, search: LocationSearch) -> Self {
        self.search = Some(search);
        self
    }

    /// Services backed by the configured HTTP provider. Without a token,
    /// resolution reports "not configured" and search is unavailable.
    pub fn from_config(config: &Config) -> Self {
        let coordinator = GeocodingCoordinator::from_settings(&config.geocoding);
        let search = match MapboxProvider::from_settings(&config.geocoding) {
            Ok(provider) => Some(LocationSearch::from_settings(
                Arc::new(provider),
                &config.search,
            )),
            Err(e) => {
                tracing::debug!("Location search disabled: {}", e);
                None
            }
        };
        Self {
            coordinator: Arc::new(coordinator),
            search,
        }
    }
}

impl std::fmt::Debug for EditorServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorServices")
            .field("coordinator", &self.coordinator)
            .field("search", &self.search.is_some())
            .finish()
    }
}

/// Interactive editor for one pin/area annotation over a map engine.
pub struct AnnotationEditor<E: MapEngine> {
    engine: E,
    annotation: Option<Arc<MapAnnotation>>,
    drawing: DrawingStateMachine,
    pin: PinOverlay,
    polygon: PolygonOverlay,
    live_edit: Debouncer<Vec<Coordinate>, EditorMessage>,
    search: SearchController,
    coordinator: Arc<GeocodingCoordinator>,
    capture: PreviewCapture,
    events: EventBus,
    sender: mpsc::UnboundedSender<EditorMessage>,
    receiver: mpsc::UnboundedReceiver<EditorMessage>,
    search_zoom: f64,
    /// Bumped by `clear`; lookups issued under an older epoch are dropped.
    epoch: u64,
    next_seq: u64,
    applied_seq: u64,
    resolutions_in_flight: usize,
    restore_pending: bool,
    last_resolved_area: Option<AreaGeometry>,
}

impl<E: MapEngine> AnnotationEditor<E> {
    pub fn new(engine: E, services: EditorServices, config: &Config) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            engine,
            annotation: None,
            drawing: DrawingStateMachine::new(),
            pin: PinOverlay::new(),
            polygon: PolygonOverlay::new(config.overlay.fit_padding_px),
            live_edit: Debouncer::new(
                config.drawing.live_update_debounce(),
                sender.clone(),
                EditorMessage::live_edit,
            ),
            search: SearchController::new(
                services.search,
                config.search.debounce(),
                sender.clone(),
            ),
            coordinator: services.coordinator,
            capture: PreviewCapture::from_settings(&config.capture),
            events: EventBus::new(),
            sender,
            receiver,
            search_zoom: config.overlay.search_zoom,
            epoch: 0,
            next_seq: 0,
            applied_seq: 0,
            resolutions_in_flight: 0,
            restore_pending: false,
            last_resolved_area: None,
        }
    }

    // ---- Queries ----

    /// Current annotation, or `None` when there is nothing on the map.
    pub fn annotation(&self) -> Option<Arc<MapAnnotation>> {
        self.annotation.clone()
    }

    /// Current annotation in its stored layout.
    pub fn to_persisted(&self) -> Option<PersistedAnnotation> {
        self.annotation.as_deref().map(PersistedAnnotation::from)
    }

    pub fn drawing_state(&self) -> DrawingState {
        self.drawing.state()
    }

    pub fn can_start_drawing(&self) -> bool {
        self.drawing.can_start_drawing()
    }

    pub fn can_complete_drawing(&self) -> bool {
        self.drawing.can_complete_drawing()
    }

    pub fn can_edit_drawing(&self) -> bool {
        self.drawing.can_edit_drawing()
    }

    /// Vertices of the shape being drawn.
    pub fn draft(&self) -> &[Coordinate] {
        self.drawing.draft()
    }

    pub fn search_available(&self) -> bool {
        self.search.is_available()
    }

    pub fn search_query(&self) -> &str {
        self.search.query()
    }

    pub fn suggestions(&self) -> &[SearchSuggestion] {
        self.search.suggestions()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// True while a timer, lookup or deferred correction has yet to land.
    pub fn has_pending_work(&self) -> bool {
        self.live_edit.is_pending()
            || self.resolutions_in_flight > 0
            || self.search.is_busy()
            || self.restore_pending
    }

    // ---- Seeding ----

    /// Loads a previously saved annotation, replacing whatever is shown.
    ///
    /// The camera is fitted to the polygon once. The stored address is kept
    /// as is; nothing is resolved again.
    pub fn seed(&mut self, annotation: MapAnnotation) {
        self.clear();
        let area = annotation.area_geometry().cloned();
        self.drawing = DrawingStateMachine::seeded(area.is_some());
        if let Some(area) = &area {
            if let Err(e) = self.polygon.render(&mut self.engine, area) {
                tracing::warn!("Failed to render seeded polygon: {}", e);
            }
            self.polygon.fit_view_to(&mut self.engine, area);
        }
        self.last_resolved_area = area;
        tracing::info!("Seeded editor: {}", annotation.describe());
        self.set_annotation(annotation);
        self.render_pin();
    }

    /// Loads an annotation from its stored layout.
    pub fn seed_persisted(
        &mut self,
        persisted: PersistedAnnotation,
    ) -> Result<(), AnnotationError> {
        let annotation = MapAnnotation::try_from(persisted)?;
        self.seed(annotation);
        Ok(())
    }

    // ---- Drawing ----

    /// Enters drawing mode. The committed polygon's overlay is removed but
    /// the model keeps it until the new shape is finished; the pin stays.
    pub fn start_drawing(&mut self) -> bool {
        let current = self
            .annotation
            .as_ref()
            .and_then(|a| a.area_geometry().cloned());
        let Some(transition) = self.drawing.start(current) else {
            tracing::debug!("start_drawing ignored in state {}", self.drawing.state());
            return false;
        };
        self.live_edit.cancel();
        self.polygon.clear(&mut self.engine);
        self.polygon.clear_draft(&mut self.engine);
        self.engine.set_draw_mode(DrawMode::Drawing);
        self.engine.set_cursor(Cursor::Crosshair);
        self.publish_transition(transition);
        true
    }

    /// Appends a vertex to the shape being drawn.
    pub fn add_vertex(&mut self, vertex: Coordinate) -> bool {
        if !self.drawing.push_vertex(vertex) {
            tracing::debug!("add_vertex ignored in state {}", self.drawing.state());
            return false;
        }
        self.render_draft();
        true
    }

    /// Closes the drawn ring and commits it. Needs at least three distinct
    /// vertices.
    pub fn finish_drawing(&mut self) -> bool {
        match self.drawing.finish() {
            None => {
                tracing::debug!("finish_drawing ignored in state {}", self.drawing.state());
                false
            }
            Some(Err(e)) => {
                tracing::debug!("Cannot finish drawing yet: {}", e);
                false
            }
            Some(Ok((area, transition))) => {
                self.commit_area(area, transition);
                true
            }
        }
    }

    /// Abandons the shape being drawn, putting back the polygon that was
    /// committed before drawing started, if any.
    pub fn cancel_drawing(&mut self) -> bool {
        let Some(outcome) = self.drawing.cancel() else {
            tracing::debug!("cancel_drawing ignored in state {}", self.drawing.state());
            return false;
        };
        self.leave_drawing_tool();

        let restored = outcome.restored;
        match &restored {
            Some(area) => {
                if let Err(e) = self.polygon.render(&mut self.engine, area) {
                    tracing::warn!("Failed to restore polygon: {}", e);
                }
            }
            None => self.polygon.clear(&mut self.engine),
        }
        self.publish_transition(outcome.transition);

        // Live edits may have written the draft into the model
        let current = self.annotation.as_ref().and_then(|a| a.area_geometry());
        if current != restored.as_ref() {
            let next = self
                .annotation
                .as_ref()
                .and_then(|a| a.with_area(restored.clone()));
            self.replace_annotation(next);
            if let Some(area) = restored {
                if self.last_resolved_area.as_ref() != Some(&area) {
                    self.resolve_area(area);
                }
            }
        }
        true
    }

    fn commit_area(&mut self, area: AreaGeometry, transition: Transition) {
        self.leave_drawing_tool();
        if let Err(e) = self.polygon.render(&mut self.engine, &area) {
            tracing::warn!("Failed to render polygon: {}", e);
        }
        let next = match &self.annotation {
            Some(current) => current.with_area(Some(area.clone())),
            None => Some(MapAnnotation::area(area.clone())),
        };
        self.replace_annotation(next);
        self.publish_transition(transition);
        tracing::info!(
            "Committed area of {} points",
            area.primary().vertices().len()
        );
        if self.last_resolved_area.as_ref() != Some(&area) {
            self.resolve_area(area);
        }
    }

    /// Hands the map back from the drawing tool.
    fn leave_drawing_tool(&mut self) {
        self.live_edit.cancel();
        self.polygon.clear_draft(&mut self.engine);
        self.engine.clear_draw_features();
        self.engine.set_draw_mode(DrawMode::Idle);
        self.engine.set_cursor(Cursor::Default);
    }

    fn render_draft(&mut self) {
        if let Err(e) = self.polygon.render_draft(&mut self.engine, self.drawing.draft()) {
            tracing::warn!("Failed to render draft: {}", e);
        }
    }

    // ---- Pin ----

    /// Places or moves the pin and resolves its address once.
    pub fn place_pin(&mut self, coordinate: Coordinate) -> bool {
        if let Err(e) = coordinate.validate() {
            tracing::debug!("place_pin ignored: {}", e);
            return false;
        }
        let next = match &self.annotation {
            Some(current) => current.with_point(Some(coordinate)),
            None => Some(MapAnnotation::pin(coordinate)),
        };
        self.replace_annotation(next);
        self.render_pin();
        self.request_resolution(coordinate, ResolutionSource::Pin);
        true
    }

    /// Hides or shows the pin. Only the flag and layer visibility change.
    pub fn set_hide_pin(&mut self, hidden: bool) -> bool {
        let Some(current) = self.annotation.clone() else {
            return false;
        };
        if current.point().is_none() || current.hide_pin() == hidden {
            return false;
        }
        if let Err(e) = self.pin.set_visible(&mut self.engine, !hidden) {
            tracing::warn!("Failed to toggle pin visibility: {}", e);
        }
        self.set_annotation(current.with_hide_pin(hidden));
        true
    }

    fn render_pin(&mut self) {
        let Some(annotation) = self.annotation.clone() else {
            self.pin.clear(&mut self.engine);
            return;
        };
        let Some(point) = annotation.point() else {
            self.pin.clear(&mut self.engine);
            return;
        };
        let placed = self
            .pin
            .place(&mut self.engine, point, annotation.hide_pin())
            .and_then(|()| self.pin.enable_drag(&mut self.engine));
        if let Err(e) = placed {
            tracing::warn!("Failed to render pin: {}", e);
        }
    }

    // ---- Search ----

    /// Records the search box text. Queries long enough to send go out after
    /// the quiet period; shorter ones clear the suggestions immediately.
    pub fn set_search_query(&mut self, text: &str) {
        let update = self.search.set_query(text);
        self.publish_search_update(update);
    }

    /// Flies to a suggestion and, unless drawing, moves the pin there.
    pub fn select_suggestion(&mut self, index: usize) -> bool {
        let Some(suggestion) = self.search.select(index) else {
            return false;
        };
        self.engine.fly_to(suggestion.center, Some(self.search_zoom));
        self.publish(EditorEvent::Search(SearchEvent::Selected {
            label: suggestion.label.clone(),
            center: suggestion.center,
        }));
        if !self.drawing.is_drawing() {
            self.place_pin(suggestion.center);
        }
        true
    }

    fn publish_search_update(&self, update: SearchUpdate) {
        if let SearchUpdate::Replaced { query, count } = update {
            self.publish(EditorEvent::Search(SearchEvent::SuggestionsUpdated {
                query,
                count,
            }));
        }
    }

    // ---- Save / clear / cancel ----

    /// Captures a preview and returns the finished annotation, or `None`
    /// when there is nothing to save.
    pub async fn save(&mut self) -> Option<MapAnnotation> {
        let current = self.annotation.clone()?;
        let outcome = self
            .capture
            .capture(&mut self.engine, Some(current.as_ref()))
            .await?;

        if let Some(reason) = &outcome.fallback_reason {
            self.publish(EditorEvent::Capture(CaptureEvent::Fallback {
                reason: reason.clone(),
            }));
        }
        let source = outcome.image.source;
        self.publish(EditorEvent::Capture(CaptureEvent::Captured {
            width: outcome.image.width,
            height: outcome.image.height,
            source,
        }));

        // The model may have moved on while the capture was waiting
        let base = self.annotation.clone().unwrap_or(current);
        let saved = base.with_preview(Some(outcome.image));
        self.annotation = Some(Arc::new(saved.clone()));
        tracing::info!("Saved annotation: {}", saved.describe());
        self.publish(EditorEvent::Annotation(AnnotationEvent::Saved {
            kind: saved.kind(),
            preview: source,
        }));
        Some(saved)
    }

    /// Removes the pin, the polygon and everything in progress. Lookups
    /// still in flight are dropped when they return.
    pub fn clear(&mut self) {
        self.live_edit.cancel();
        if let Some(transition) = self.drawing.clear() {
            self.publish_transition(transition);
        }
        self.pin.clear(&mut self.engine);
        self.polygon.clear(&mut self.engine);
        self.polygon.clear_draft(&mut self.engine);
        if self.engine.draw_mode() != DrawMode::Idle {
            self.engine.clear_draw_features();
            self.engine.set_draw_mode(DrawMode::Idle);
            self.engine.set_cursor(Cursor::Default);
        }
        self.epoch += 1;
        self.last_resolved_area = None;
        if self.annotation.take().is_some() {
            tracing::info!("Annotation cleared");
            self.publish(EditorEvent::Annotation(AnnotationEvent::Cleared));
        }
    }

    /// Discards in-progress work: the shape being drawn, pending edits and
    /// the search. The committed annotation is kept.
    pub fn cancel(&mut self) {
        if self.drawing.is_drawing() {
            self.cancel_drawing();
        }
        self.live_edit.cancel();
        let update = self.search.cancel();
        self.publish_search_update(update);
    }

    /// Tears the overlays down and hands the engine back.
    pub fn close(mut self) -> E {
        self.cancel();
        self.pin.clear(&mut self.engine);
        self.polygon.clear(&mut self.engine);
        self.polygon.clear_draft(&mut self.engine);
        self.engine
    }

    // ---- Engine callbacks ----

    /// Applies one engine callback. Callbacks the current state forbids are
    /// ignored.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Pointer {
                subscription,
                event,
            } => {
                if self.drawing.is_drawing() {
                    return;
                }
                if let PinIntent::Moved(coordinate) =
                    self.pin.handle_pointer(&mut self.engine, subscription, event)
                {
                    self.place_pin(coordinate);
                }
            }
            EngineEvent::Click { coordinate } => {
                if self.drawing.is_drawing() {
                    self.add_vertex(coordinate);
                } else {
                    self.place_pin(coordinate);
                }
            }
            EngineEvent::DrawModeChanged { mode } => {
                if mode != DrawMode::Idle && !self.drawing.is_drawing() {
                    self.ignored(format!("draw mode {} outside drawing", mode));
                    self.schedule_restore();
                }
            }
            EngineEvent::DrawCreated { features } => self.on_draw_created(&features),
            EngineEvent::DrawUpdated { features } => self.on_draw_updated(&features),
            EngineEvent::DrawDeleted => {
                if self.drawing.replace_draft(Vec::new()) {
                    self.live_edit.cancel();
                    self.polygon.clear_draft(&mut self.engine);
                } else {
                    self.ignored("draw.delete outside drawing".to_string());
                }
            }
            EngineEvent::Idle => tracing::trace!("Engine idle"),
        }
    }

    fn on_draw_created(&mut self, features: &[Geometry]) {
        if !self.drawing.is_drawing() {
            self.ignored(format!("draw.create in state {}", self.drawing.state()));
            return;
        }
        let Some(area) = area_from_features(features) else {
            self.ignored("draw.create without polygon features".to_string());
            return;
        };
        if let Some((area, transition)) = self.drawing.finish_with(area) {
            self.commit_area(area, transition);
        }
    }

    fn on_draw_updated(&mut self, features: &[Geometry]) {
        if !self.drawing.is_drawing() {
            self.ignored(format!("draw.update in state {}", self.drawing.state()));
            if let Some(area) = self.annotation.as_ref().and_then(|a| a.area_geometry()) {
                if let Err(e) = self.polygon.render(&mut self.engine, area) {
                    tracing::warn!("Failed to re-assert polygon: {}", e);
                }
            }
            self.engine.clear_draw_features();
            self.schedule_restore();
            return;
        }
        let Some(vertices) = draft_from_features(features) else {
            self.ignored("draw.update without usable features".to_string());
            return;
        };
        self.drawing.replace_draft(vertices.clone());
        self.render_draft();
        self.live_edit.schedule(vertices);
    }

    fn schedule_restore(&mut self) {
        if self.restore_pending {
            return;
        }
        self.restore_pending = true;
        let _ = self.sender.send(EditorMessage::RestoreDrawMode);
    }

    fn ignored(&self, reason: String) {
        tracing::debug!("Ignoring engine callback: {}", reason);
        self.publish(EditorEvent::Drawing(DrawingEvent::CallbackIgnored { reason }));
    }

    // ---- Message pump ----

    /// Applies every completion already delivered. Returns how many.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.receiver.try_recv() {
            self.apply_message(message);
            applied += 1;
        }
        applied
    }

    /// Waits for the next engine callback or completion and applies it.
    /// Returns false once the engine's channel is closed.
    pub async fn pump(&mut self, engine_events: &mut mpsc::UnboundedReceiver<EngineEvent>) -> bool {
        enum Next {
            Message(Option<EditorMessage>),
            Engine(Option<EngineEvent>),
        }
        let next = tokio::select! {
            message = self.receiver.recv() => Next::Message(message),
            event = engine_events.recv() => Next::Engine(event),
        };
        match next {
            Next::Message(Some(message)) => self.apply_message(message),
            Next::Engine(Some(event)) => self.handle_engine_event(event),
            Next::Message(None) | Next::Engine(None) => return false,
        }
        true
    }

    /// Runs until the engine's channel closes, then tears down.
    pub async fn run(mut self, mut engine_events: mpsc::UnboundedReceiver<EngineEvent>) -> E {
        while self.pump(&mut engine_events).await {}
        self.close()
    }

    /// Waits until every timer, lookup and deferred correction has landed.
    pub async fn settle(&mut self) {
        self.process_pending();
        while self.has_pending_work() {
            match self.receiver.recv().await {
                Some(message) => self.apply_message(message),
                None => break,
            }
        }
    }

    fn apply_message(&mut self, message: EditorMessage) {
        match message {
            EditorMessage::LiveEditSettled { ticket, vertices } => {
                self.on_live_edit_settled(ticket, vertices)
            }
            EditorMessage::Resolved {
                epoch,
                seq,
                resolution,
            } => self.on_resolved(epoch, seq, resolution),
            EditorMessage::SearchDue { ticket, query } => {
                self.search.on_due(ticket, query);
            }
            EditorMessage::SearchResults {
                request,
                query,
                result,
            } => {
                let update = self.search.on_results(request, query, result);
                self.publish_search_update(update);
            }
            EditorMessage::RestoreDrawMode => self.restore_draw_mode(),
        }
    }

    fn on_live_edit_settled(&mut self, ticket: u64, vertices: Vec<Coordinate>) {
        if !self.live_edit.accept(ticket) {
            tracing::debug!("Dropping superseded live edit");
            return;
        }
        if !self.drawing.is_drawing() {
            return;
        }
        let area: AreaGeometry = match Polygon::from_vertices(&vertices) {
            Ok(polygon) => polygon.into(),
            Err(e) => {
                tracing::debug!("Live edit not yet a polygon: {}", e);
                return;
            }
        };
        let next = match &self.annotation {
            Some(current) => current.with_area(Some(area.clone())),
            None => Some(MapAnnotation::area(area.clone())),
        };
        self.replace_annotation(next);
        if self.last_resolved_area.as_ref() != Some(&area) {
            self.resolve_area(area);
        }
    }

    fn restore_draw_mode(&mut self) {
        self.restore_pending = false;
        // Drawing may have started legitimately since this was scheduled
        if self.drawing.is_drawing() {
            return;
        }
        if self.engine.draw_mode() != DrawMode::Idle {
            self.engine.set_draw_mode(DrawMode::Idle);
        }
        if let Some(area) = self.annotation.as_ref().and_then(|a| a.area_geometry()) {
            if let Err(e) = self.polygon.render(&mut self.engine, area) {
                tracing::warn!("Failed to re-assert polygon: {}", e);
            }
        }
    }

    // ---- Address resolution ----

    fn resolve_area(&mut self, area: AreaGeometry) {
        let centroid = area.centroid();
        self.last_resolved_area = Some(area);
        self.request_resolution(centroid, ResolutionSource::PolygonCentroid);
    }

    fn request_resolution(&mut self, coordinate: Coordinate, source: ResolutionSource) {
        self.next_seq += 1;
        let seq = self.next_seq;
        let epoch = self.epoch;
        self.resolutions_in_flight += 1;
        self.publish(EditorEvent::Geocoding(GeocodingEvent::Requested {
            source,
            input: coordinate,
        }));

        let coordinator = Arc::clone(&self.coordinator);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let resolution = coordinator.resolve(coordinate, source).await;
            let _ = sender.send(EditorMessage::Resolved {
                epoch,
                seq,
                resolution,
            });
        });
    }

    fn on_resolved(&mut self, epoch: u64, seq: u64, resolution: Resolution) {
        self.resolutions_in_flight = self.resolutions_in_flight.saturating_sub(1);
        let input = resolution.debug.input;

        let current = match &self.annotation {
            Some(current) if epoch == self.epoch => Arc::clone(current),
            _ => {
                tracing::debug!("Dropping resolution for {}: annotation cleared", input);
                self.publish(EditorEvent::Geocoding(GeocodingEvent::Dropped { input }));
                return;
            }
        };
        if seq < self.applied_seq {
            tracing::debug!("Dropping resolution for {}: superseded", input);
            return;
        }
        self.applied_seq = seq;

        if let Some(error) = &resolution.debug.error {
            tracing::warn!("Address unresolved for {}: {}", input, error);
        }
        self.annotation = Some(Arc::new(current.with_resolution(&resolution)));
        self.publish(EditorEvent::Geocoding(GeocodingEvent::Applied {
            source: resolution.debug.source,
            address: resolution.address.address.clone(),
            error: resolution.debug.error.clone(),
        }));
    }

    // ---- Model & events ----

    fn set_annotation(&mut self, annotation: MapAnnotation) {
        let kind = annotation.kind();
        self.annotation = Some(Arc::new(annotation));
        self.publish(EditorEvent::Annotation(AnnotationEvent::Changed { kind }));
    }

    /// Sets the model, or clears it when the geometry is gone.
    fn replace_annotation(&mut self, annotation: Option<MapAnnotation>) {
        match annotation {
            Some(annotation) => self.set_annotation(annotation),
            None => {
                if self.annotation.take().is_some() {
                    self.epoch += 1;
                    self.last_resolved_area = None;
                    self.publish(EditorEvent::Annotation(AnnotationEvent::Cleared));
                }
            }
        }
    }

    fn publish_transition(&self, transition: Transition) {
        self.publish(EditorEvent::Drawing(DrawingEvent::StateChanged {
            from: transition.from,
            to: transition.to,
        }));
    }

    fn publish(&self, event: EditorEvent) {
        self.events.emit(event);
    }
}

/// Every polygon among the drawing tool's features, as one area.
fn area_from_features(features: &[Geometry]) -> Option<AreaGeometry> {
    let polygons: Vec<Polygon> = features
        .iter()
        .filter_map(|g| AreaGeometry::try_from(g).ok())
        .flat_map(|area| match area {
            AreaGeometry::Polygon(p) => vec![p],
            AreaGeometry::MultiPolygon(set) => set.into_vec(),
        })
        .collect();
    AreaGeometry::from_polygons(polygons).ok()
}

/// Open vertex list of the first feature being drawn.
fn draft_from_features(features: &[Geometry]) -> Option<Vec<Coordinate>> {
    features.iter().find_map(|g| match g {
        Geometry::Polygon { coordinates } => coordinates.first().map(|ring| open_ring(ring)),
        Geometry::MultiPolygon { coordinates } => coordinates
            .first()
            .and_then(|rings| rings.first())
            .map(|ring| open_ring(ring)),
        Geometry::LineString { coordinates } if !coordinates.is_empty() => {
            Some(coordinates.clone())
        }
        _ => None,
    })
}

fn open_ring(ring: &[Coordinate]) -> Vec<Coordinate> {
    let mut vertices = ring.to_vec();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    vertices
}
