use crate::domain::{Identity, PeerId, Position};
use serde::{Deserialize, Serialize};

/// Kind of a session description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Opaque media capability descriptor (offer or answer)
///
/// Serialized like the browser `RTCSessionDescriptionInit`: `{"type": "offer", "sdp": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Connectivity-path descriptor, shaped like `RTCIceCandidateInit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: Some("0".to_string()),
            sdp_m_line_index: Some(0),
        }
    }
}

/// One entry of a presence broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub id: PeerId,
    pub name: String,
}

impl From<&Identity> for PresenceEntry {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id().clone(),
            name: identity.name().to_string(),
        }
    }
}

/// Messages exchanged over the signaling channel.
///
/// `to: None` means broadcast. Delivery is at-most-once with no ordering
/// across message kinds, so every handler must tolerate reordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SignalingMessage {
    /// Local user picked a display name
    NameAnnounce { name: String, id: PeerId },

    /// Ask the relay to broadcast the current presence list
    PresenceRequest,

    /// Relay-authored list of named peers, in join order
    PresenceUpdate { users: Vec<PresenceEntry> },

    Offer {
        offer: SessionDescription,
        from: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerId>,
    },

    Answer {
        answer: SessionDescription,
        from: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerId>,
    },

    IceCandidate {
        candidate: IceCandidate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerId>,
    },

    MovePosition {
        from: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerId>,
        position: Position,
    },
}

impl SignalingMessage {
    /// Sender, when the message carries one
    pub fn from(&self) -> Option<&PeerId> {
        match self {
            SignalingMessage::NameAnnounce { id, .. } => Some(id),
            SignalingMessage::Offer { from, .. }
            | SignalingMessage::Answer { from, .. }
            | SignalingMessage::MovePosition { from, .. } => Some(from),
            SignalingMessage::IceCandidate { from, .. } => from.as_ref(),
            SignalingMessage::PresenceRequest | SignalingMessage::PresenceUpdate { .. } => None,
        }
    }

    /// Addressee; `None` means broadcast
    pub fn to(&self) -> Option<&PeerId> {
        match self {
            SignalingMessage::Offer { to, .. }
            | SignalingMessage::Answer { to, .. }
            | SignalingMessage::IceCandidate { to, .. }
            | SignalingMessage::MovePosition { to, .. } => to.as_ref(),
            _ => None,
        }
    }

    /// Whether a peer with `local` id should act on this message
    pub fn is_for(&self, local: &PeerId) -> bool {
        self.to().map_or(true, |to| to == local)
    }

    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            SignalingMessage::NameAnnounce { .. } => "name_announce",
            SignalingMessage::PresenceRequest => "presence_request",
            SignalingMessage::PresenceUpdate { .. } => "presence_update",
            SignalingMessage::Offer { .. } => "offer",
            SignalingMessage::Answer { .. } => "answer",
            SignalingMessage::IceCandidate { .. } => "ice_candidate",
            SignalingMessage::MovePosition { .. } => "move_position",
        }
    }
}
