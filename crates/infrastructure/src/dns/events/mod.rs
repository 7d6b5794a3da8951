pub mod logger;
pub mod metrics;

pub use logger::TracingObserver;
pub use metrics::{ExchangeMetrics, MetricsSnapshot};

use ferrous_relay_application::ports::{ExchangeEvent, ExchangeObserver};
use std::sync::Arc;

/// Forwards every event to each inner observer, in order.
#[derive(Clone, Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ExchangeObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn ExchangeObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl ExchangeObserver for CompositeObserver {
    fn on_event(&self, event: &ExchangeEvent<'_>) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}
