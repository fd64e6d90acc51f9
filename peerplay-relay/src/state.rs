use axum::extract::ws::Message;
use peerplay_core::{Delivery, PeerId, RelayFrame, RelayHub, SignalingMessage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Default)]
struct Inner {
    hub: RelayHub,
    outboxes: HashMap<PeerId, UnboundedSender<Message>>,
}

/// Shared relay state: the routing hub plus one outbox per live socket
#[derive(Clone, Default)]
pub struct RelayState {
    inner: Arc<Mutex<Inner>>,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a socket, greet it with its id and return that id
    pub fn register(&self, outbox: UnboundedSender<Message>) -> PeerId {
        let mut inner = self.lock();
        let id = inner.hub.connect();

        if let Some(text) = encode(&RelayFrame::Welcome {
            peer_id: id.clone(),
        }) {
            let _ = outbox.send(Message::Text(text));
        }
        inner.outboxes.insert(id.clone(), outbox);
        id
    }

    pub fn route(&self, from: &PeerId, message: SignalingMessage) {
        let mut inner = self.lock();
        let deliveries = inner.hub.route(from, message);
        inner.deliver(deliveries);
    }

    pub fn unregister(&self, id: &PeerId) {
        let mut inner = self.lock();
        inner.outboxes.remove(id);
        let deliveries = inner.hub.disconnect(id);
        inner.deliver(deliveries);
    }

    pub fn client_count(&self) -> usize {
        self.lock().hub.client_count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn deliver(&mut self, deliveries: Vec<Delivery>) {
        for Delivery { to, message } in deliveries {
            let Some(outbox) = self.outboxes.get(&to) else {
                continue;
            };
            let kind = message.kind();
            if let Some(text) = encode(&RelayFrame::Signal(message)) {
                if outbox.send(Message::Text(text)).is_err() {
                    tracing::debug!("Outbox for {} closed, dropping {}", to, kind);
                }
            }
        }
    }
}

fn encode(frame: &RelayFrame) -> Option<String> {
    match serde_json::to_string(frame) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!("Failed to encode relay frame: {}", e);
            None
        }
    }
}
