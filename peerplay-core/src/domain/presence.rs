use crate::domain::{Identity, PeerId, PresenceEntry};
use std::collections::HashMap;

/// Peers currently reachable through the relay, excluding ourselves.
///
/// Rebuilt wholesale from every presence broadcast. A peer that vanished
/// without a fresh broadcast stays listed until the next one arrives.
#[derive(Debug, Clone, Default)]
pub struct PresenceDirectory {
    /// Lookup by id
    peers: HashMap<PeerId, Identity>,
    /// Relay order, for stable listing
    order: Vec<PeerId>,
}

impl PresenceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the directory with `users`, dropping the entry for `local`
    pub fn replace(&mut self, users: Vec<PresenceEntry>, local: Option<&PeerId>) {
        self.peers.clear();
        self.order.clear();

        for entry in users {
            if Some(&entry.id) == local || self.peers.contains_key(&entry.id) {
                continue;
            }
            self.order.push(entry.id.clone());
            self.peers
                .insert(entry.id.clone(), Identity::from_remote(entry.id, entry.name));
        }

        tracing::debug!("Presence directory now lists {} peers", self.order.len());
    }

    pub fn get(&self, id: &PeerId) -> Option<&Identity> {
        self.peers.get(id)
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.peers.contains_key(id)
    }

    /// Peers in the order the relay reported them
    pub fn peers(&self) -> impl Iterator<Item = &Identity> {
        self.order.iter().filter_map(|id| self.peers.get(id))
    }

    /// Peer at a listing position (for UIs that select by index)
    pub fn nth(&self, index: usize) -> Option<&Identity> {
        self.order.get(index).and_then(|id| self.peers.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
