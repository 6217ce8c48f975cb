//! Drawing workflow states shared by the editor and its events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the polygon drawing workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingState {
    /// No drawing in progress and no committed polygon from this session.
    #[default]
    Idle,
    /// The drawing tool is active and vertices are being placed.
    Drawing,
    /// A polygon has been committed.
    Completed,
}

impl fmt::Display for DrawingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawingState::Idle => write!(f, "idle"),
            DrawingState::Drawing => write!(f, "drawing"),
            DrawingState::Completed => write!(f, "completed"),
        }
    }
}
