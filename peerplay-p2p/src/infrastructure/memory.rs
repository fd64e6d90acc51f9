use crate::infrastructure::channel::{ChannelEvent, SignalingChannel};
use crate::infrastructure::error::{P2PError, Result};
use peerplay_core::{Delivery, PeerId, RelayHub, SignalingMessage};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct RelayState {
    hub: RelayHub,
    inboxes: HashMap<PeerId, VecDeque<ChannelEvent>>,
}

impl RelayState {
    fn deliver(&mut self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            match self.inboxes.get_mut(&delivery.to) {
                Some(inbox) => inbox.push_back(ChannelEvent::Message(delivery.message)),
                None => tracing::debug!("Dropping delivery to departed {}", delivery.to),
            }
        }
    }
}

/// In-process relay shared by any number of [`MemoryChannel`]s.
///
/// Routes exactly like the network relay (same [`RelayHub`]); messages sit in
/// per-client inboxes until the owning channel polls.
#[derive(Clone, Default)]
pub struct MemoryRelay {
    state: Arc<Mutex<RelayState>>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_count(&self) -> usize {
        self.lock().hub.client_count()
    }

    fn lock(&self) -> MutexGuard<'_, RelayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Signaling channel backed by a [`MemoryRelay`]
pub struct MemoryChannel {
    relay: MemoryRelay,
    local_id: Option<PeerId>,
    closed: VecDeque<ChannelEvent>,
}

impl MemoryChannel {
    /// Join the relay; the assigned id arrives as the first polled event
    pub fn connect(relay: &MemoryRelay) -> Self {
        let mut state = relay.lock();
        let id = state.hub.connect();
        state
            .inboxes
            .insert(id.clone(), VecDeque::from([ChannelEvent::Connected(id.clone())]));
        drop(state);

        Self {
            relay: relay.clone(),
            local_id: Some(id),
            closed: VecDeque::new(),
        }
    }

    /// Leave the relay. Anything still queued for us is discarded.
    pub fn disconnect(&mut self) {
        let Some(id) = self.local_id.take() else {
            return;
        };

        let mut state = self.relay.lock();
        state.inboxes.remove(&id);
        let deliveries = state.hub.disconnect(&id);
        state.deliver(deliveries);

        self.closed.push_back(ChannelEvent::Disconnected);
    }
}

impl SignalingChannel for MemoryChannel {
    fn local_peer_id(&self) -> Option<PeerId> {
        self.local_id.clone()
    }

    fn send(&mut self, message: SignalingMessage) -> Result<()> {
        let id = self.local_id.as_ref().ok_or(P2PError::ChannelClosed)?;

        let mut state = self.relay.lock();
        let deliveries = state.hub.route(id, message);
        state.deliver(deliveries);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<ChannelEvent> {
        let mut events: Vec<ChannelEvent> = match &self.local_id {
            Some(id) => self
                .relay
                .lock()
                .inboxes
                .get_mut(id)
                .map(|inbox| inbox.drain(..).collect())
                .unwrap_or_default(),
            None => Vec::new(),
        };
        events.extend(self.closed.drain(..));
        events
    }
}

impl Drop for MemoryChannel {
    fn drop(&mut self) {
        self.disconnect();
    }
}
