use crate::domain::{PeerId, PresenceEntry, SignalingMessage};
use serde::{Deserialize, Serialize};

/// Frames exchanged between a client and the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "snake_case")]
pub enum RelayFrame {
    /// First frame after connecting: the id the relay assigned to this client
    Welcome { peer_id: PeerId },

    /// A signaling message, in either direction
    Signal(SignalingMessage),
}

/// A message the relay must hand to one connected client
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: PeerId,
    pub message: SignalingMessage,
}

#[derive(Debug, Clone)]
struct Client {
    id: PeerId,
    name: Option<String>,
}

/// Routing state of the signaling relay.
///
/// Pure bookkeeping: callers feed it connects, disconnects and inbound
/// messages and carry out the returned deliveries. Clients are kept in join
/// order so presence lists are stable.
#[derive(Debug, Clone, Default)]
pub struct RelayHub {
    clients: Vec<Client>,
}

impl RelayHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new client and return the id assigned to it
    pub fn connect(&mut self) -> PeerId {
        let id = PeerId::generate();
        self.clients.push(Client {
            id: id.clone(),
            name: None,
        });
        tracing::info!("Relay client connected: {}", id);
        id
    }

    /// Remove a client; remaining clients get a fresh presence list
    pub fn disconnect(&mut self, id: &PeerId) -> Vec<Delivery> {
        let before = self.clients.len();
        self.clients.retain(|client| &client.id != id);

        if self.clients.len() == before {
            return Vec::new();
        }

        tracing::info!("Relay client disconnected: {}", id);
        self.broadcast_presence()
    }

    pub fn is_connected(&self, id: &PeerId) -> bool {
        self.clients.iter().any(|client| &client.id == id)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Named clients, in join order
    pub fn presence(&self) -> Vec<PresenceEntry> {
        self.clients
            .iter()
            .filter_map(|client| {
                client.name.as_ref().map(|name| PresenceEntry {
                    id: client.id.clone(),
                    name: name.clone(),
                })
            })
            .collect()
    }

    /// Route one message received from `from`
    pub fn route(&mut self, from: &PeerId, message: SignalingMessage) -> Vec<Delivery> {
        if !self.is_connected(from) {
            tracing::warn!("Dropping {} from unknown client {}", message.kind(), from);
            return Vec::new();
        }

        match message {
            SignalingMessage::NameAnnounce { name, id } => {
                if &id != from {
                    tracing::warn!("Client {} tried to name {}, ignoring", from, id);
                    return Vec::new();
                }
                if let Some(client) = self.clients.iter_mut().find(|c| &c.id == from) {
                    tracing::info!("Client {} is now known as '{}'", from, name);
                    client.name = Some(name);
                }
                self.broadcast_presence()
            }

            SignalingMessage::PresenceRequest => self.broadcast_presence(),

            SignalingMessage::PresenceUpdate { .. } => {
                tracing::debug!("Ignoring client-authored presence update from {}", from);
                Vec::new()
            }

            other => match other.to().cloned() {
                Some(to) if self.is_connected(&to) => vec![Delivery { to, message: other }],
                Some(to) => {
                    tracing::debug!("Dropping {} for departed client {}", other.kind(), to);
                    Vec::new()
                }
                None => self
                    .clients
                    .iter()
                    .filter(|client| &client.id != from)
                    .map(|client| Delivery {
                        to: client.id.clone(),
                        message: other.clone(),
                    })
                    .collect(),
            },
        }
    }

    fn broadcast_presence(&self) -> Vec<Delivery> {
        let users = self.presence();
        self.clients
            .iter()
            .map(|client| Delivery {
                to: client.id.clone(),
                message: SignalingMessage::PresenceUpdate {
                    users: users.clone(),
                },
            })
            .collect()
    }
}
