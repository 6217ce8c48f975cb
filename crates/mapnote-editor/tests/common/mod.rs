#![allow(dead_code)]

use async_trait::async_trait;
use mapnote_core::{Coordinate, EditorEvent, EventFilter, Polygon};
use mapnote_editor::{AnnotationEditor, EditorServices, MemoryEngine};
use mapnote_geocoding::{
    ForwardQuery, GeocodeError, GeocodingCoordinator, GeocodingProvider, LocationSearch,
    ProviderResponse, ReverseQuery,
};
use mapnote_settings::Config;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub const DOWNTOWN: [f64; 2] = [-93.2650, 44.9778];

/// Geocoder that records every call and answers with canned bodies.
pub struct CountingProvider {
    pub fail: bool,
    pub delay: Duration,
    pub reverse_calls: Mutex<Vec<Coordinate>>,
    pub forward_calls: Mutex<Vec<String>>,
}

impl CountingProvider {
    pub fn new() -> Arc<Self> {
        Self::build(false, Duration::ZERO)
    }

    pub fn failing() -> Arc<Self> {
        Self::build(true, Duration::ZERO)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::build(false, delay)
    }

    fn build(fail: bool, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            fail,
            delay,
            reverse_calls: Mutex::new(Vec::new()),
            forward_calls: Mutex::new(Vec::new()),
        })
    }

    pub fn reverse_count(&self) -> usize {
        self.reverse_calls.lock().len()
    }

    pub fn forward_count(&self) -> usize {
        self.forward_calls.lock().len()
    }

    async fn respond(&self, body: serde_json::Value) -> Result<ProviderResponse, GeocodeError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(GeocodeError::Status {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        ProviderResponse::from_json(body)
    }
}

#[async_trait]
impl GeocodingProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    async fn reverse(
        &self,
        coordinate: Coordinate,
        _query: &ReverseQuery,
    ) -> Result<ProviderResponse, GeocodeError> {
        self.reverse_calls.lock().push(coordinate);
        self.respond(minneapolis()).await
    }

    async fn forward(&self, query: &ForwardQuery) -> Result<ProviderResponse, GeocodeError> {
        self.forward_calls.lock().push(query.text.clone());
        self.respond(rochesters()).await
    }
}

fn minneapolis() -> serde_json::Value {
    serde_json::json!({
        "features": [{
            "id": "address.1",
            "place_type": ["address"],
            "text": "Nicollet Mall",
            "address": "250",
            "place_name": "250 Nicollet Mall, Minneapolis, Minnesota 55401, United States",
            "center": DOWNTOWN,
            "context": [
                {"id": "postcode.1", "text": "55401"},
                {"id": "place.1", "text": "Minneapolis"},
                {"id": "district.1", "text": "Hennepin County"},
                {"id": "region.1", "text": "Minnesota", "short_code": "US-MN"}
            ]
        }]
    })
}

fn rochesters() -> serde_json::Value {
    serde_json::json!({
        "features": [
            {
                "id": "place.1", "place_type": ["place"], "text": "Rochester",
                "place_name": "Rochester, Minnesota, United States",
                "center": [-92.4630, 44.0121],
                "context": [{"id": "region.1", "text": "Minnesota", "short_code": "US-MN"}]
            },
            {
                "id": "place.2", "place_type": ["place"], "text": "Rochester",
                "place_name": "Rochester, New York, United States",
                "center": [-77.6109, 43.1566],
                "context": [{"id": "region.2", "text": "New York", "short_code": "US-NY"}]
            }
        ]
    })
}

pub fn editor_with(
    provider: Arc<CountingProvider>,
    engine: MemoryEngine,
) -> AnnotationEditor<MemoryEngine> {
    let config = Config::default();
    let services = EditorServices::new(GeocodingCoordinator::new(provider.clone()))
        .with_search(LocationSearch::from_settings(provider, &config.search));
    AnnotationEditor::new(engine, services, &config)
}

pub fn editor(provider: Arc<CountingProvider>) -> AnnotationEditor<MemoryEngine> {
    editor_with(provider, MemoryEngine::new())
}

/// Collects every event the editor publishes.
pub fn record(editor: &AnnotationEditor<MemoryEngine>) -> Arc<Mutex<Vec<EditorEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    editor
        .events()
        .subscribe(EventFilter::All, move |e| sink.lock().push(e.clone()));
    seen
}

pub fn square(west: f64, south: f64, size: f64) -> Vec<Coordinate> {
    vec![
        Coordinate::new(west, south),
        Coordinate::new(west + size, south),
        Coordinate::new(west + size, south + size),
        Coordinate::new(west, south + size),
    ]
}

pub fn close(vertices: &[Coordinate]) -> Vec<Coordinate> {
    let mut ring = vertices.to_vec();
    ring.push(vertices[0]);
    ring
}

pub fn polygon(vertices: &[Coordinate]) -> Polygon {
    Polygon::from_vertices(vertices).unwrap()
}
