//! Search box state: debounced queries and the current suggestion list.

use mapnote_geocoding::{LocationSearch, SearchSuggestion};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::debounce::Debouncer;
use crate::message::EditorMessage;

/// What a search completion did to the suggestion list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SearchUpdate {
    Unchanged,
    Replaced { query: String, count: usize },
}

pub(crate) struct SearchController {
    search: Option<LocationSearch>,
    debouncer: Debouncer<String, EditorMessage>,
    sender: mpsc::UnboundedSender<EditorMessage>,
    query: String,
    suggestions: Vec<SearchSuggestion>,
    request: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl SearchController {
    pub(crate) fn new(
        search: Option<LocationSearch>,
        debounce: Duration,
        sender: mpsc::UnboundedSender<EditorMessage>,
    ) -> Self {
        Self {
            search,
            debouncer: Debouncer::new(debounce, sender.clone(), EditorMessage::search_due),
            sender,
            query: String::new(),
            suggestions: Vec::new(),
            request: 0,
            in_flight: None,
        }
    }

    pub(crate) fn is_available(&self) -> bool {
        self.search.is_some()
    }

    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    pub(crate) fn suggestions(&self) -> &[SearchSuggestion] {
        &self.suggestions
    }

    /// True while a query is waiting out its quiet period or in flight.
    pub(crate) fn is_busy(&self) -> bool {
        self.debouncer.is_pending() || self.in_flight.is_some()
    }

    /// Records a keystroke. Short queries clear the list at once.
    pub(crate) fn set_query(&mut self, text: &str) -> SearchUpdate {
        self.query = text.to_string();
        let accepted = self
            .search
            .as_ref()
            .is_some_and(|search| search.accepts(text));
        if accepted {
            self.debouncer.schedule(text.to_string());
            return SearchUpdate::Unchanged;
        }
        self.abandon();
        self.replace(text.to_string(), Vec::new())
    }

    /// Sends the query whose quiet period elapsed.
    pub(crate) fn on_due(&mut self, ticket: u64, query: String) -> bool {
        if !self.debouncer.accept(ticket) {
            return false;
        }
        let Some(search) = self.search.clone() else {
            return false;
        };
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        self.request += 1;
        let request = self.request;
        let sender = self.sender.clone();
        tracing::debug!("Searching for {:?}", query);
        self.in_flight = Some(tokio::spawn(async move {
            let result = search.search(&query).await.map_err(|e| e.to_string());
            let _ = sender.send(EditorMessage::SearchResults {
                request,
                query,
                result,
            });
        }));
        true
    }

    /// Applies a finished lookup unless a newer one superseded it.
    pub(crate) fn on_results(
        &mut self,
        request: u64,
        query: String,
        result: Result<Vec<SearchSuggestion>, String>,
    ) -> SearchUpdate {
        if request != self.request || self.in_flight.is_none() {
            tracing::debug!("Discarding stale results for {:?}", query);
            return SearchUpdate::Unchanged;
        }
        self.in_flight = None;
        let suggestions = result.unwrap_or_else(|e| {
            tracing::warn!("Search for {:?} failed: {}", query, e);
            Vec::new()
        });
        self.replace(query, suggestions)
    }

    /// Takes a suggestion, putting its label in the query and emptying the
    /// list.
    pub(crate) fn select(&mut self, index: usize) -> Option<SearchSuggestion> {
        let suggestion = self.suggestions.get(index).cloned()?;
        self.abandon();
        self.query = suggestion.label.clone();
        self.suggestions.clear();
        Some(suggestion)
    }

    /// Drops the pending query, any lookup in flight and the list.
    pub(crate) fn cancel(&mut self) -> SearchUpdate {
        self.abandon();
        self.query.clear();
        self.replace(String::new(), Vec::new())
    }

    fn abandon(&mut self) {
        self.debouncer.cancel();
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    fn replace(&mut self, query: String, suggestions: Vec<SearchSuggestion>) -> SearchUpdate {
        if suggestions.is_empty() && self.suggestions.is_empty() {
            return SearchUpdate::Unchanged;
        }
        let count = suggestions.len();
        self.suggestions = suggestions;
        SearchUpdate::Replaced { query, count }
    }
}

impl std::fmt::Debug for SearchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("available", &self.search.is_some())
            .field("query", &self.query)
            .field("suggestions", &self.suggestions.len())
            .field("busy", &self.is_busy())
            .finish()
    }
}
