mod common;

use common::*;
use mapnote_core::constants::{
    PIN_BODY_LAYER_ID, PIN_SOURCE_ID, POLYGON_FILL_LAYER_ID, POLYGON_SOURCE_ID,
};
use mapnote_core::{
    AnnotationEvent, AnnotationKind, AreaGeometry, CaptureEvent, Coordinate, DrawingEvent,
    DrawingState, EditorEvent, EventCategory, EventFilter, Geometry, MapAnnotation,
    PersistedAnnotation, PreviewSource, ResolutionSource,
};
use mapnote_editor::engine::memory::CameraRequest;
use mapnote_editor::{DrawMode, EngineEvent, MapEngine, MemoryEngine, PointerKind};

#[tokio::test(start_paused = true)]
async fn test_pin_only_scenario() {
    let provider = CountingProvider::new();
    let mut editor = editor(provider.clone());
    let at = Coordinate::from(DOWNTOWN);

    assert!(editor.place_pin(at));

    let annotation = editor.annotation().unwrap();
    assert_eq!(annotation.kind(), AnnotationKind::Pin);
    assert_eq!(annotation.point(), Some(at));
    assert!(annotation.area_geometry().is_none());
    assert!(editor.engine().has_layer(PIN_BODY_LAYER_ID));
    assert!(editor.engine().subscription_for(PIN_SOURCE_ID).is_some());

    editor.settle().await;

    let annotation = editor.annotation().unwrap();
    assert_eq!(annotation.address().city.as_deref(), Some("Minneapolis"));
    assert_eq!(annotation.address().state.as_deref(), Some("Minnesota"));
    let debug = annotation.resolution_debug().unwrap();
    assert_eq!(debug.source, ResolutionSource::Pin);
    assert_eq!(debug.input, at);
    assert_eq!(provider.reverse_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pin_with_failing_provider() {
    let mut editor = editor(CountingProvider::failing());
    editor.place_pin(Coordinate::from(DOWNTOWN));
    editor.settle().await;

    let annotation = editor.annotation().unwrap();
    assert_eq!(annotation.kind(), AnnotationKind::Pin);
    assert!(annotation.address().is_empty());
    assert!(annotation.resolution_debug().unwrap().error.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_area_only_scenario() {
    let provider = CountingProvider::new();
    let mut editor = editor(provider.clone());
    let events = record(&editor);
    let vertices = square(-93.30, 44.95, 0.05);

    assert!(editor.start_drawing());
    assert_eq!(editor.drawing_state(), DrawingState::Drawing);
    for v in &vertices {
        assert!(editor.add_vertex(*v));
    }
    assert!(editor.can_complete_drawing());
    assert!(editor.finish_drawing());

    assert_eq!(editor.drawing_state(), DrawingState::Completed);
    let annotation = editor.annotation().unwrap();
    assert_eq!(annotation.kind(), AnnotationKind::Area);
    assert!(annotation.point().is_none());
    let ring = annotation.area_geometry().unwrap().outer_ring().to_vec();
    assert_eq!(ring.len(), 5);
    assert_eq!(ring[0], ring[4]);

    assert_eq!(editor.engine().draw_mode(), DrawMode::Idle);
    assert!(editor.engine().draw_features_cleared() >= 1);
    assert!(editor.engine().has_layer(POLYGON_FILL_LAYER_ID));

    editor.settle().await;
    let calls = provider.reverse_calls.lock().clone();
    assert_eq!(calls.len(), 1);
    let centroid = polygon(&vertices).centroid();
    assert_eq!(calls[0], centroid);

    let transitions: Vec<_> = events
        .lock()
        .iter()
        .filter_map(|e| match e {
            EditorEvent::Drawing(DrawingEvent::StateChanged { from, to }) => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (DrawingState::Idle, DrawingState::Drawing),
            (DrawingState::Drawing, DrawingState::Completed)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_forbidden_transitions_are_no_ops() {
    let provider = CountingProvider::new();
    let mut editor = editor(provider.clone());
    let events = record(&editor);

    // finish from idle
    assert!(!editor.finish_drawing());
    assert!(!editor.cancel_drawing());
    assert!(editor.annotation().is_none());
    assert!(events.lock().is_empty());

    // start while drawing
    editor.start_drawing();
    editor.add_vertex(Coordinate::new(0.0, 0.0));
    assert!(!editor.start_drawing());
    assert_eq!(editor.draft().len(), 1);

    // too few vertices keeps drawing
    editor.add_vertex(Coordinate::new(1.0, 0.0));
    assert!(!editor.finish_drawing());
    assert_eq!(editor.drawing_state(), DrawingState::Drawing);

    // cancel from completed
    editor.add_vertex(Coordinate::new(1.0, 1.0));
    assert!(editor.finish_drawing());
    assert!(!editor.cancel_drawing());
    assert_eq!(editor.drawing_state(), DrawingState::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_clear_is_idempotent() {
    let mut editor = editor(CountingProvider::new());
    let events = record(&editor);
    editor.place_pin(Coordinate::from(DOWNTOWN));
    editor.start_drawing();
    for v in square(-93.30, 44.95, 0.05) {
        editor.add_vertex(v);
    }
    editor.finish_drawing();
    editor.settle().await;

    editor.clear();
    let after_first = (
        editor.annotation(),
        editor.drawing_state(),
        editor
            .engine()
            .layer_ids()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>(),
    );
    editor.clear();
    let after_second = (
        editor.annotation(),
        editor.drawing_state(),
        editor
            .engine()
            .layer_ids()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>(),
    );

    assert_eq!(after_first, after_second);
    assert!(after_second.0.is_none());
    assert_eq!(after_second.1, DrawingState::Idle);
    assert!(after_second.2.is_empty());
    assert!(!editor.engine().has_source(PIN_SOURCE_ID));
    assert!(!editor.engine().has_source(POLYGON_SOURCE_ID));
    assert_eq!(editor.engine().active_subscriptions(), 0);

    let cleared = events
        .lock()
        .iter()
        .filter(|e| matches!(e, EditorEvent::Annotation(AnnotationEvent::Cleared)))
        .count();
    assert_eq!(cleared, 1);
}

#[tokio::test(start_paused = true)]
async fn test_drawing_keeps_existing_pin() {
    let mut editor = editor(CountingProvider::new());
    let pin = Coordinate::from(DOWNTOWN);
    editor.place_pin(pin);
    editor.settle().await;

    editor.start_drawing();
    assert!(editor.engine().has_layer(PIN_BODY_LAYER_ID));
    for v in square(-93.30, 44.95, 0.05) {
        editor.add_vertex(v);
    }
    editor.finish_drawing();
    editor.settle().await;

    let annotation = editor.annotation().unwrap();
    assert_eq!(annotation.kind(), AnnotationKind::Both);
    assert_eq!(annotation.point(), Some(pin));
    assert!(annotation.check_invariants().is_ok());
    assert!(editor.engine().has_layer(PIN_BODY_LAYER_ID));
}

#[tokio::test(start_paused = true)]
async fn test_clicks_route_by_state() {
    let mut editor = editor(CountingProvider::new());
    editor.handle_engine_event(EngineEvent::Click {
        coordinate: Coordinate::new(-93.0, 45.0),
    });
    assert_eq!(
        editor.annotation().unwrap().point(),
        Some(Coordinate::new(-93.0, 45.0))
    );

    editor.start_drawing();
    editor.handle_engine_event(EngineEvent::Click {
        coordinate: Coordinate::new(-93.1, 45.1),
    });
    assert_eq!(editor.draft(), &[Coordinate::new(-93.1, 45.1)]);
    assert_eq!(
        editor.annotation().unwrap().point(),
        Some(Coordinate::new(-93.0, 45.0))
    );
}

#[tokio::test(start_paused = true)]
async fn test_drag_round_trip_resolves_destination_once() {
    let provider = CountingProvider::new();
    let mut editor = editor(provider.clone());
    let a = Coordinate::new(-93.2650, 44.9778);
    let b = Coordinate::new(-93.2500, 44.9900);
    editor.place_pin(a);
    editor.settle().await;

    let path = [
        (PointerKind::Down, a),
        (PointerKind::Move, Coordinate::new(-93.2600, 44.9800)),
        (PointerKind::Move, Coordinate::new(-93.2550, 44.9850)),
        (PointerKind::Up, b),
    ];
    for (kind, at) in path {
        let events = editor.engine().pointer_events(PIN_SOURCE_ID, kind, at);
        assert_eq!(events.len(), 1);
        for event in events {
            editor.handle_engine_event(event);
        }
    }
    editor.settle().await;

    let annotation = editor.annotation().unwrap();
    assert_eq!(annotation.point(), Some(b));
    let calls = provider.reverse_calls.lock().clone();
    assert_eq!(calls, vec![a, b]);
    assert_eq!(annotation.resolution_debug().unwrap().input, b);
    assert!(editor.engine().pan_enabled());
    assert_eq!(editor.engine().active_subscriptions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_draw_restores_prior_polygon() {
    let provider = CountingProvider::new();
    let mut editor = editor(provider.clone());
    let prior: AreaGeometry = polygon(&square(-93.30, 44.95, 0.05)).into();
    editor.seed(MapAnnotation::area(prior.clone()));

    assert_eq!(editor.drawing_state(), DrawingState::Completed);
    assert!(matches!(
        editor.engine().camera_requests(),
        [CameraRequest::FitBounds { .. }]
    ));

    editor.start_drawing();
    assert!(!editor.engine().has_source(POLYGON_SOURCE_ID));
    for v in square(-93.10, 45.10, 0.01).into_iter().take(3) {
        editor.add_vertex(v);
    }
    assert!(editor.cancel_drawing());

    assert_eq!(editor.drawing_state(), DrawingState::Completed);
    assert_eq!(
        editor.annotation().unwrap().area_geometry(),
        Some(&prior)
    );
    assert_eq!(
        editor.engine().source(POLYGON_SOURCE_ID),
        Some(&Geometry::from(&prior))
    );
    assert!(editor.draft().is_empty());
    editor.settle().await;
    assert_eq!(provider.reverse_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_without_prior_polygon_keeps_pin() {
    let mut editor = editor(CountingProvider::new());
    editor.place_pin(Coordinate::from(DOWNTOWN));
    editor.start_drawing();
    editor.add_vertex(Coordinate::new(-93.0, 45.0));
    editor.cancel_drawing();

    assert_eq!(editor.drawing_state(), DrawingState::Idle);
    let annotation = editor.annotation().unwrap();
    assert_eq!(annotation.kind(), AnnotationKind::Pin);
    assert!(!editor.engine().has_source(POLYGON_SOURCE_ID));
}

#[tokio::test(start_paused = true)]
async fn test_hide_pin_only_touches_pin_layers() {
    let mut editor = editor(CountingProvider::new());
    editor.place_pin(Coordinate::from(DOWNTOWN));
    editor.start_drawing();
    for v in square(-93.30, 44.95, 0.05) {
        editor.add_vertex(v);
    }
    editor.finish_drawing();
    let area = editor.annotation().unwrap().area_geometry().cloned();

    assert!(editor.set_hide_pin(true));
    assert!(!editor.set_hide_pin(true));

    let annotation = editor.annotation().unwrap();
    assert!(annotation.hide_pin());
    assert_eq!(annotation.area_geometry().cloned(), area);
    assert!(!editor.engine().layer(PIN_BODY_LAYER_ID).unwrap().visible);
    assert!(editor.engine().layer(POLYGON_FILL_LAYER_ID).unwrap().visible);
    assert_eq!(editor.to_persisted().unwrap().hide_pin, Some(true));

    editor.set_hide_pin(false);
    assert!(editor.engine().layer(PIN_BODY_LAYER_ID).unwrap().visible);
}

#[tokio::test(start_paused = true)]
async fn test_save_falls_back_to_placeholder() {
    let mut editor = editor(CountingProvider::new());
    let events = record(&editor);
    assert!(editor.save().await.is_none());

    editor.place_pin(Coordinate::from(DOWNTOWN));
    let saved = editor.save().await.unwrap();

    let preview = saved.preview_image().unwrap();
    assert_eq!(preview.source, PreviewSource::Placeholder);
    assert_eq!((preview.width, preview.height), (640, 360));
    assert!(preview.rgba.iter().any(|&b| b != 0));
    assert!(events
        .lock()
        .iter()
        .any(|e| matches!(e, EditorEvent::Capture(CaptureEvent::Fallback { .. }))));
    assert!(events.lock().iter().any(|e| matches!(
        e,
        EditorEvent::Annotation(AnnotationEvent::Saved {
            preview: PreviewSource::Placeholder,
            ..
        })
    )));
}

#[tokio::test(start_paused = true)]
async fn test_save_uses_captured_frame() {
    let mut engine = MemoryEngine::new();
    engine.set_solid_frame(8, 6, [200, 220, 240]);
    let mut editor = editor_with(CountingProvider::new(), engine);
    editor.place_pin(Coordinate::from(DOWNTOWN));
    editor.settle().await;

    let saved = editor.save().await.unwrap();
    let preview = saved.preview_image().unwrap();
    assert_eq!(preview.source, PreviewSource::Captured);
    assert_eq!((preview.width, preview.height), (8, 6));
    assert_eq!(saved.address().city.as_deref(), Some("Minneapolis"));

    let persisted = editor.to_persisted().unwrap();
    assert!(persisted
        .screenshot
        .as_deref()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[tokio::test(start_paused = true)]
async fn test_seed_from_persisted_both() {
    let json = serde_json::json!({
        "type": "both",
        "geometry": {"type": "Point", "coordinates": DOWNTOWN},
        "center": DOWNTOWN,
        "hidePin": true,
        "polygon": {
            "type": "Polygon",
            "coordinates": [[[-93.3, 44.95], [-93.2, 44.95], [-93.2, 45.0], [-93.3, 44.95]]]
        },
        "city": "Minneapolis"
    });
    let persisted: PersistedAnnotation = serde_json::from_value(json).unwrap();
    let provider = CountingProvider::new();
    let mut editor = editor(provider.clone());

    editor.seed_persisted(persisted).unwrap();

    let annotation = editor.annotation().unwrap();
    assert_eq!(annotation.kind(), AnnotationKind::Both);
    assert!(annotation.hide_pin());
    assert_eq!(annotation.address().city.as_deref(), Some("Minneapolis"));
    assert_eq!(editor.drawing_state(), DrawingState::Completed);
    assert!(editor.engine().has_source(PIN_SOURCE_ID));
    assert!(!editor.engine().has_layer(PIN_BODY_LAYER_ID));
    assert!(editor.engine().has_layer(POLYGON_FILL_LAYER_ID));
    editor.settle().await;
    assert_eq!(provider.reverse_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_close_returns_clean_engine() {
    let mut editor = editor(CountingProvider::new());
    editor.place_pin(Coordinate::from(DOWNTOWN));
    editor.start_drawing();
    editor.add_vertex(Coordinate::new(-93.0, 45.0));

    let engine = editor.close();
    assert!(engine.layer_ids().is_empty());
    assert_eq!(engine.active_subscriptions(), 0);
    assert_eq!(engine.draw_mode(), DrawMode::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_async_observer_follows_pin_resolution() {
    let mut editor = editor(CountingProvider::new());
    let mut observer = editor.events().receiver();
    let geocoding = std::sync::Arc::new(parking_lot::Mutex::new(0usize));
    let counter = std::sync::Arc::clone(&geocoding);
    let id = editor.events().subscribe(
        EventFilter::Categories(vec![EventCategory::Geocoding]),
        move |_| *counter.lock() += 1,
    );

    editor.place_pin(Coordinate::from(DOWNTOWN));
    editor.settle().await;

    let mut seen = Vec::new();
    while let Ok(event) = observer.try_recv() {
        seen.push(event.category());
    }
    assert_eq!(
        seen,
        vec![
            EventCategory::Annotation,
            EventCategory::Geocoding,
            EventCategory::Geocoding
        ]
    );
    assert_eq!(*geocoding.lock(), 2);

    assert!(editor.events().unsubscribe(id));
    editor.place_pin(Coordinate::new(-93.1, 44.95));
    editor.settle().await;
    assert_eq!(*geocoding.lock(), 2);
}
