use peerplay_core::{IceCandidate, PeerId, SessionDescription};
use std::collections::VecDeque;
use std::fmt;

/// Where the local side stands in the offer/answer exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallState {
    #[default]
    Idle,
    /// Local offer sent, waiting for the answer
    Offering,
    /// Remote offer applied, local answer being produced
    Answering,
    /// Both descriptions in place
    Connected,
    /// Local offer/answer could not be produced or installed
    Failed,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CallState::Idle => "idle",
            CallState::Offering => "offering",
            CallState::Answering => "answering",
            CallState::Connected => "connected",
            CallState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Remote candidate held back until the remote description is installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCandidate {
    pub from: Option<PeerId>,
    pub candidate: IceCandidate,
}

impl PendingCandidate {
    /// Whether this candidate belongs to the negotiation with `remote`
    pub fn belongs_to(&self, remote: Option<&PeerId>) -> bool {
        match (self.from.as_ref(), remote) {
            (Some(from), Some(remote)) => from == remote,
            _ => true,
        }
    }
}

/// Negotiation state for the single media session
#[derive(Debug, Clone, Default)]
pub struct PeerSession {
    pub state: CallState,
    pub remote_peer: Option<PeerId>,
    pub local_description: Option<SessionDescription>,
    pub remote_description: Option<SessionDescription>,
    /// Candidates that arrived before the remote description, in arrival order
    pub pending_remote_candidates: VecDeque<PendingCandidate>,
}

impl PeerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_remote_description(&self) -> bool {
        self.remote_description.is_some()
    }

    /// Drop everything negotiated so far
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
