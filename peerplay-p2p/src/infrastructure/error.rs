use crate::domain::CallState;
use peerplay_core::{IdentityError, MoveError, PeerId, PositionError};

/// Errors raised while negotiating a media session
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NegotiationError {
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: CallState,
    },

    #[error("Remote description rejected: {0}")]
    DescriptionRejected(String),

    #[error("ICE candidate rejected: {0}")]
    CandidateRejected(String),

    #[error("Could not create local description: {0}")]
    LocalDescription(String),
}

/// Media device errors (camera/microphone)
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MediaError {
    #[error("Media device unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the session layer
#[derive(Debug, thiserror::Error)]
pub enum P2PError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Not connected to the signaling relay yet")]
    NotConnected,

    #[error("A name must be assigned first")]
    IdentityMissing,

    #[error("A name was already assigned")]
    IdentityAlreadyAssigned,

    #[error("No peer selected")]
    NoPeerSelected,

    #[error("Peer not found: {0}")]
    UnknownPeer(PeerId),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Invalid position: {0}")]
    Position(#[from] PositionError),

    #[error("Move rejected: {0}")]
    Move(#[from] MoveError),

    #[error("Negotiation error: {0}")]
    Negotiation(#[from] NegotiationError),
}

pub type Result<T> = std::result::Result<T, P2PError>;
