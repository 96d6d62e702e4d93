use filesearch::{SearchHit, SearchListener};
use tokio::sync::mpsc;

use crate::runtime::protocol::ProviderEvent;

/// Engine notification, tagged with its session generation when posted.
#[derive(Debug)]
pub enum SessionEvent {
    HitsAdded(Vec<SearchHit>),
    HitsSubtracted(Vec<String>),
    Finished,
    Failed(String),
}

/// Forwards engine callbacks into the provider mailbox.
pub struct SessionListener {
    generation: u64,
    events: mpsc::UnboundedSender<ProviderEvent>,
}

impl SessionListener {
    pub fn new(generation: u64, events: mpsc::UnboundedSender<ProviderEvent>) -> Self {
        Self { generation, events }
    }

    fn post(&self, event: SessionEvent) {
        let event = ProviderEvent::Session {
            generation: self.generation,
            event,
        };
        if self.events.send(event).is_err() {
            tracing::trace!(generation = self.generation, "provider gone, dropping engine event");
        }
    }
}

impl SearchListener for SessionListener {
    fn hits_added(&self, hits: Vec<SearchHit>) {
        self.post(SessionEvent::HitsAdded(hits));
    }

    fn hits_subtracted(&self, uris: Vec<String>) {
        self.post(SessionEvent::HitsSubtracted(uris));
    }

    fn finished(&self) {
        self.post(SessionEvent::Finished);
    }

    fn failed(&self, message: String) {
        self.post(SessionEvent::Failed(message));
    }
}
