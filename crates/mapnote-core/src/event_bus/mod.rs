//! # Event Bus Module
//!
//! Per-editor publish/subscribe channel that lets the embedding UI observe
//! what the editor does without reaching into its state.
//!
//! ## Overview
//!
//! - The orchestrator publishes typed [`EditorEvent`]s after each state change
//! - Subscribers filter by [`EventCategory`] and receive events synchronously
//! - Async consumers can poll a `tokio::sync::broadcast` receiver instead
//!
//! Every editor owns its own bus; there is no process-wide instance.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mapnote_core::event_bus::{EditorEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Geocoding]),
//!     |event| tracing::info!("{}", event.description()),
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
