pub mod application;
pub mod domain;

pub use application::{Delivery, RelayFrame, RelayHub};
pub use domain::{
    Board, Cell, GameSession, IceCandidate, Identity, IdentityError, MoveError, MoveOutcome,
    MoveRules, MoveSet, PeerId, Position, PositionError, PresenceDirectory, PresenceEntry,
    SdpKind, SessionDescription, Side, SignalingMessage, WINNING_LINES,
};
