//! The per-editor bus.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{EditorEvent, EventCategory};

/// Broadcast backlog kept for slow async receivers.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Which events a handler sees.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &EditorEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type Handler = Arc<dyn Fn(&EditorEvent) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

/// Synchronous handlers plus a broadcast channel for async observers.
///
/// Handlers run on the editor's task right after the change they describe,
/// in subscription order. They are snapshotted before being called, so a
/// handler may subscribe or unsubscribe without deadlocking; such changes
/// take effect from the next event.
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus whose async receivers lag after `capacity` unread events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Delivers an event. Returns how many handlers and receivers got it.
    pub fn emit(&self, event: EditorEvent) -> usize {
        tracing::trace!("Event: {}", event.description());

        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| Arc::clone(&s.handler))
            .collect();
        for handler in &handlers {
            handler(&event);
        }

        // No receivers is the common case
        let received = self.sender.send(event).unwrap_or(0);
        handlers.len() + received
    }

    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&EditorEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.write().push(Subscriber {
            id,
            filter,
            handler: Arc::new(handler),
        });
        tracing::debug!("Event subscription {} added", id);
        id
    }

    /// False when the id was never issued or is already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// A receiver for consumers on another task. Sees only events emitted
    /// after this call.
    pub fn receiver(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationKind;
    use crate::event_bus::events::{AnnotationEvent, SearchEvent};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn changed() -> EditorEvent {
        EditorEvent::Annotation(AnnotationEvent::Changed {
            kind: AnnotationKind::Pin,
        })
    }

    #[test]
    fn test_emit_without_listeners() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(changed()), 0);
    }

    #[test]
    fn test_category_filter() {
        let bus = EventBus::new();
        let annotation = Arc::new(AtomicUsize::new(0));
        let search = Arc::new(AtomicUsize::new(0));

        let a = Arc::clone(&annotation);
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Annotation]),
            move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            },
        );
        let s = Arc::clone(&search);
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Search]),
            move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.emit(changed());
        bus.emit(EditorEvent::Annotation(AnnotationEvent::Cleared));
        let delivered = bus.emit(EditorEvent::Search(SearchEvent::SuggestionsUpdated {
            query: "lake".to_string(),
            count: 0,
        }));

        assert_eq!(annotation.load(Ordering::SeqCst), 2);
        assert_eq!(search.load(Ordering::SeqCst), 1);
        assert_eq!(delivered, 1);
    }

    #[test]
    fn test_handler_can_unsubscribe_itself() {
        let bus = Arc::new(EventBus::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let own_id: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let (b, c, slot) = (Arc::clone(&bus), Arc::clone(&calls), Arc::clone(&own_id));
        let id = bus.subscribe(EventFilter::All, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *slot.lock() {
                b.unsubscribe(id);
            }
        });
        *own_id.lock() = Some(id);

        bus.emit(changed());
        bus.emit(changed());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for n in 0..3 {
            let order = Arc::clone(&order);
            bus.subscribe(EventFilter::All, move |_| order.lock().push(n));
        }
        bus.emit(changed());
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_receiver_sees_later_events() {
        let bus = EventBus::with_capacity(4);
        bus.emit(EditorEvent::Annotation(AnnotationEvent::Cleared));
        let mut receiver = bus.receiver();

        assert_eq!(bus.emit(changed()), 1);

        match receiver.recv().await {
            Ok(EditorEvent::Annotation(AnnotationEvent::Changed { kind })) => {
                assert_eq!(kind, AnnotationKind::Pin)
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(receiver.try_recv().is_err());
    }
}
