use crate::domain::CallState;
use peerplay_core::{Identity, PeerId, Position};

/// Events surfaced by the [`SessionOrchestrator`] to the presentation layer
///
/// [`SessionOrchestrator`]: crate::application::SessionOrchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The relay assigned our id
    Connected { local_id: PeerId },
    /// The presence directory was replaced
    PresenceChanged,
    CallStateChanged { state: CallState },
    /// The opponent claimed a cell
    OpponentMoved { position: Position },
    /// The game was decided; raised once per game
    GameWon { winner: Identity },
    /// Camera or microphone could not be attached; the session continues without
    MediaUnavailable { reason: String },
    RemoteMediaStarted { peer: Option<PeerId> },
    /// The signaling channel dropped
    ChannelLost,
}
