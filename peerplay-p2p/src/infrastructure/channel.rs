use crate::infrastructure::error::Result;
use peerplay_core::{PeerId, SignalingMessage};

/// Events surfaced by a signaling channel
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// The relay assigned our id; stable until reconnect
    Connected(PeerId),
    /// A message relayed from another peer (or authored by the relay)
    Message(SignalingMessage),
    /// Connection lost; nothing sent earlier will be replayed
    Disconnected,
}

/// Bidirectional, at-most-once, unordered message bus to the relay.
///
/// Implementations are constructed already connected (`connect(endpoint)`
/// lives on the concrete type). The session layer is the single subscriber
/// and drains inbound traffic with [`SignalingChannel::poll_events`].
pub trait SignalingChannel {
    /// Id assigned by the relay, once known
    fn local_peer_id(&self) -> Option<PeerId>;

    /// Hand a message to the relay
    fn send(&mut self, message: SignalingMessage) -> Result<()>;

    /// Drain everything received since the last poll, in arrival order
    fn poll_events(&mut self) -> Vec<ChannelEvent>;
}
