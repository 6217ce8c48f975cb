//! Completions delivered back to the editor.
//!
//! Timers and spawned lookups never touch editor state. They send one of
//! these on the editor's channel and the editor applies it.

use mapnote_core::{Coordinate, Resolution};
use mapnote_geocoding::SearchSuggestion;

#[derive(Debug)]
pub(crate) enum EditorMessage {
    /// Live-edit quiet period elapsed.
    LiveEditSettled { ticket: u64, vertices: Vec<Coordinate> },
    /// An address lookup finished.
    Resolved {
        epoch: u64,
        seq: u64,
        resolution: Resolution,
    },
    /// Search quiet period elapsed.
    SearchDue { ticket: u64, query: String },
    /// A forward lookup finished.
    SearchResults {
        request: u64,
        query: String,
        result: Result<Vec<SearchSuggestion>, String>,
    },
    /// Put the drawing tool back into idle on the next turn.
    RestoreDrawMode,
}

impl EditorMessage {
    pub(crate) fn live_edit(ticket: u64, vertices: Vec<Coordinate>) -> Self {
        EditorMessage::LiveEditSettled { ticket, vertices }
    }

    pub(crate) fn search_due(ticket: u64, query: String) -> Self {
        EditorMessage::SearchDue { ticket, query }
    }
}
