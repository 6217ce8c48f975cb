//! Drawing state machine.
//!
//! `idle`/`completed` → `drawing` on start, `drawing` → `completed` on
//! finish, `drawing` → `idle` (or back to `completed` when an earlier
//! polygon is restored) on cancel, anything → `idle` on clear. Requests the
//! current state forbids are refused and leave everything untouched.
//!
//! The machine owns the in-progress vertices and the polygon that existed
//! when drawing started; it never touches the annotation or the engine.

use mapnote_core::{AreaGeometry, Coordinate, DrawingState, GeometryError, Polygon};

/// A state change, for logging and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: DrawingState,
    pub to: DrawingState,
}

/// Outcome of cancelling a drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct CancelOutcome {
    pub transition: Transition,
    /// Polygon to put back, if one existed before drawing started.
    pub restored: Option<AreaGeometry>,
}

#[derive(Debug, Clone, Default)]
pub struct DrawingStateMachine {
    state: DrawingState,
    previous_area: Option<AreaGeometry>,
    draft: Vec<Coordinate>,
}

impl DrawingStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state for an editor seeded with an annotation.
    pub fn seeded(has_polygon: bool) -> Self {
        Self {
            state: if has_polygon {
                DrawingState::Completed
            } else {
                DrawingState::Idle
            },
            ..Self::default()
        }
    }

    pub fn state(&self) -> DrawingState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == DrawingState::Drawing
    }

    pub fn can_start_drawing(&self) -> bool {
        self.state != DrawingState::Drawing
    }

    /// True while drawing with enough distinct vertices to close a ring.
    pub fn can_complete_drawing(&self) -> bool {
        self.is_drawing() && Polygon::from_vertices(&self.draft).is_ok()
    }

    pub fn can_edit_drawing(&self) -> bool {
        self.is_drawing()
    }

    /// In-progress vertices, without closure.
    pub fn draft(&self) -> &[Coordinate] {
        &self.draft
    }

    fn transition(&mut self, to: DrawingState) -> Transition {
        let from = self.state;
        self.state = to;
        tracing::debug!("Drawing state {} -> {}", from, to);
        Transition { from, to }
    }

    /// Starts drawing, remembering the polygon to restore on cancel.
    pub fn start(&mut self, current_area: Option<AreaGeometry>) -> Option<Transition> {
        if !self.can_start_drawing() {
            return None;
        }
        self.previous_area = current_area;
        self.draft.clear();
        Some(self.transition(DrawingState::Drawing))
    }

    /// Appends a vertex; ignored unless drawing.
    pub fn push_vertex(&mut self, vertex: Coordinate) -> bool {
        if !self.is_drawing() || vertex.validate().is_err() {
            return false;
        }
        self.draft.push(vertex);
        true
    }

    /// Replaces the draft with the drawing tool's current vertices.
    pub fn replace_draft(&mut self, vertices: Vec<Coordinate>) -> bool {
        if !self.is_drawing() {
            return false;
        }
        self.draft = vertices;
        true
    }

    /// Closes the draft into a polygon and completes.
    ///
    /// Refused when not drawing; an invalid draft is reported and the
    /// machine stays in `drawing`.
    pub fn finish(&mut self) -> Option<Result<(AreaGeometry, Transition), GeometryError>> {
        if !self.is_drawing() {
            return None;
        }
        match Polygon::from_vertices(&self.draft) {
            Ok(polygon) => Some(Ok(self.complete_with(polygon.into()))),
            Err(e) => Some(Err(e)),
        }
    }

    /// Completes with a shape supplied by the drawing tool.
    pub fn finish_with(&mut self, area: AreaGeometry) -> Option<(AreaGeometry, Transition)> {
        if !self.is_drawing() {
            return None;
        }
        Some(self.complete_with(area))
    }

    fn complete_with(&mut self, area: AreaGeometry) -> (AreaGeometry, Transition) {
        self.draft.clear();
        self.previous_area = None;
        (area, self.transition(DrawingState::Completed))
    }

    /// Abandons the draft. Refused unless drawing.
    pub fn cancel(&mut self) -> Option<CancelOutcome> {
        if !self.is_drawing() {
            return None;
        }
        self.draft.clear();
        let restored = self.previous_area.take();
        let to = if restored.is_some() {
            DrawingState::Completed
        } else {
            DrawingState::Idle
        };
        Some(CancelOutcome {
            transition: self.transition(to),
            restored,
        })
    }

    /// Back to `idle`, dropping everything. Returns the transition when the
    /// state actually changed.
    pub fn clear(&mut self) -> Option<Transition> {
        self.draft.clear();
        self.previous_area = None;
        if self.state == DrawingState::Idle {
            return None;
        }
        Some(self.transition(DrawingState::Idle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 1.0),
        ]
    }

    fn area() -> AreaGeometry {
        Polygon::from_vertices(&square()).unwrap().into()
    }

    #[test]
    fn test_initial_state() {
        assert_eq!(DrawingStateMachine::new().state(), DrawingState::Idle);
        assert_eq!(
            DrawingStateMachine::seeded(true).state(),
            DrawingState::Completed
        );
        assert_eq!(DrawingStateMachine::seeded(false).state(), DrawingState::Idle);
    }

    #[test]
    fn test_finish_from_idle_is_refused() {
        let mut sm = DrawingStateMachine::new();
        assert!(sm.finish().is_none());
        assert!(sm.finish_with(area()).is_none());
        assert_eq!(sm.state(), DrawingState::Idle);
    }

    #[test]
    fn test_start_while_drawing_is_refused() {
        let mut sm = DrawingStateMachine::new();
        assert!(sm.start(None).is_some());
        sm.push_vertex(Coordinate::new(0.0, 0.0));
        assert!(sm.start(Some(area())).is_none());
        assert_eq!(sm.draft().len(), 1);
    }

    #[test]
    fn test_cancel_from_completed_is_refused() {
        let mut sm = DrawingStateMachine::seeded(true);
        assert!(sm.cancel().is_none());
        assert_eq!(sm.state(), DrawingState::Completed);
    }

    #[test]
    fn test_finish_closes_ring() {
        let mut sm = DrawingStateMachine::new();
        sm.start(None);
        for v in square() {
            assert!(sm.push_vertex(v));
        }
        assert!(sm.can_complete_drawing());
        let (area, transition) = sm.finish().unwrap().unwrap();
        assert_eq!(transition.to, DrawingState::Completed);
        assert_eq!(area.outer_ring().len(), 5);
        assert!(sm.draft().is_empty());
    }

    #[test]
    fn test_finish_with_too_few_vertices_stays_drawing() {
        let mut sm = DrawingStateMachine::new();
        sm.start(None);
        sm.push_vertex(Coordinate::new(0.0, 0.0));
        sm.push_vertex(Coordinate::new(1.0, 0.0));
        assert!(!sm.can_complete_drawing());
        assert!(matches!(
            sm.finish(),
            Some(Err(GeometryError::TooFewVertices { .. }))
        ));
        assert!(sm.is_drawing());
    }

    #[test]
    fn test_cancel_restores_previous_polygon() {
        let mut sm = DrawingStateMachine::seeded(true);
        sm.start(Some(area()));
        sm.push_vertex(Coordinate::new(5.0, 5.0));
        let outcome = sm.cancel().unwrap();
        assert_eq!(outcome.restored, Some(area()));
        assert_eq!(outcome.transition.to, DrawingState::Completed);
        assert!(sm.draft().is_empty());
    }

    #[test]
    fn test_cancel_without_previous_goes_idle() {
        let mut sm = DrawingStateMachine::new();
        sm.start(None);
        let outcome = sm.cancel().unwrap();
        assert!(outcome.restored.is_none());
        assert_eq!(sm.state(), DrawingState::Idle);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut sm = DrawingStateMachine::seeded(true);
        assert!(sm.clear().is_some());
        assert!(sm.clear().is_none());
        assert_eq!(sm.state(), DrawingState::Idle);
    }

    #[test]
    fn test_vertices_ignored_outside_drawing() {
        let mut sm = DrawingStateMachine::new();
        assert!(!sm.push_vertex(Coordinate::new(0.0, 0.0)));
        assert!(!sm.replace_draft(square()));
        assert!(!sm.can_edit_drawing());
    }
}
