//! Committed polygon and in-progress draft layers.
//!
//! The committed polygon lives in its own source with a fill and an outline
//! layer, so it stays on screen whatever the drawing tool does with its own
//! features. The draft layer mirrors the vertices being drawn.

use mapnote_core::constants::{
    DRAFT_LINE_LAYER_ID, DRAFT_SOURCE_ID, POLYGON_FILL_LAYER_ID, POLYGON_OUTLINE_LAYER_ID,
    POLYGON_SOURCE_ID,
};
use mapnote_core::{AreaGeometry, Coordinate, EngineError, Geometry};

use crate::engine::{
    remove_layer_quietly, remove_source_quietly, upsert_source, LayerKind, LayerPaint, LayerSpec,
    MapEngine,
};

fn fill_layer() -> LayerSpec {
    LayerSpec::new(
        POLYGON_FILL_LAYER_ID,
        POLYGON_SOURCE_ID,
        LayerKind::Fill,
        LayerPaint::fill("#3b82f6", 0.25),
    )
}

fn outline_layer() -> LayerSpec {
    LayerSpec::new(
        POLYGON_OUTLINE_LAYER_ID,
        POLYGON_SOURCE_ID,
        LayerKind::Line,
        LayerPaint::line("#1d4ed8", 2.0),
    )
}

fn draft_layer() -> LayerSpec {
    LayerSpec::new(
        DRAFT_LINE_LAYER_ID,
        DRAFT_SOURCE_ID,
        LayerKind::Line,
        LayerPaint::line("#f59e0b", 2.0).with_dash(vec![2.0, 2.0]),
    )
}

#[derive(Debug, Clone)]
pub struct PolygonOverlay {
    fit_padding: f64,
}

impl PolygonOverlay {
    pub fn new(fit_padding: f64) -> Self {
        Self { fit_padding }
    }

    /// Replaces the committed polygon, creating missing layers.
    pub fn render<E: MapEngine + ?Sized>(
        &self,
        engine: &mut E,
        area: &AreaGeometry,
    ) -> Result<(), EngineError> {
        upsert_source(engine, POLYGON_SOURCE_ID, Geometry::from(area))?;
        if !(engine.has_layer(POLYGON_FILL_LAYER_ID) && engine.has_layer(POLYGON_OUTLINE_LAYER_ID))
        {
            remove_layer_quietly(engine, POLYGON_OUTLINE_LAYER_ID);
            remove_layer_quietly(engine, POLYGON_FILL_LAYER_ID);
            engine.add_layer(fill_layer())?;
            engine.add_layer(outline_layer())?;
        }
        Ok(())
    }

    pub fn is_rendered<E: MapEngine + ?Sized>(&self, engine: &E) -> bool {
        engine.has_source(POLYGON_SOURCE_ID)
    }

    /// Removes the committed polygon's layers and source.
    pub fn clear<E: MapEngine + ?Sized>(&self, engine: &mut E) {
        remove_layer_quietly(engine, POLYGON_OUTLINE_LAYER_ID);
        remove_layer_quietly(engine, POLYGON_FILL_LAYER_ID);
        remove_source_quietly(engine, POLYGON_SOURCE_ID);
    }

    /// Moves the camera to the outer ring's bounds.
    pub fn fit_view_to<E: MapEngine + ?Sized>(&self, engine: &mut E, area: &AreaGeometry) {
        engine.fit_bounds(area.bounding_box(), self.fit_padding);
    }

    /// Mirrors in-progress vertices into the draft layer.
    pub fn render_draft<E: MapEngine + ?Sized>(
        &self,
        engine: &mut E,
        vertices: &[Coordinate],
    ) -> Result<(), EngineError> {
        let mut path = vertices.to_vec();
        // Show the closing edge once a ring is possible
        if path.len() >= 3 {
            path.push(path[0]);
        }
        upsert_source(engine, DRAFT_SOURCE_ID, Geometry::line(&path))?;
        if !engine.has_layer(DRAFT_LINE_LAYER_ID) {
            engine.add_layer(draft_layer())?;
        }
        Ok(())
    }

    pub fn clear_draft<E: MapEngine + ?Sized>(&self, engine: &mut E) {
        remove_layer_quietly(engine, DRAFT_LINE_LAYER_ID);
        remove_source_quietly(engine, DRAFT_SOURCE_ID);
    }
}
