//! Notifier that records every event.

use parking_lot::Mutex;

use crate::port::{LedgerEvent, Notifier};

/// Captures events in emission order.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<LedgerEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().clone()
    }

    /// Event names in emission order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(LedgerEvent::name).collect()
    }

    /// Number of events called `name`.
    pub fn count(&self, name: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.name() == name)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &LedgerEvent) {
        self.events.lock().push(event.clone());
    }
}
