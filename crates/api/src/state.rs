//! Application state shared across handlers.

use analytics_core::{Analyser, EventSink, EventStore};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Curve builders over the event store (ClickHouse in production, mock in tests)
    pub analyser: Analyser,
    /// Write side for uploaded course structures
    pub sink: Arc<dyn EventSink>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            analyser: Analyser::new(store),
            sink,
        }
    }
}
