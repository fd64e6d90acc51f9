pub mod game;
pub mod identity;
pub mod presence;
pub mod signaling;

pub use game::{
    Board, Cell, GameSession, MoveError, MoveOutcome, MoveRules, MoveSet, Position, PositionError,
    Side, WINNING_LINES,
};
pub use identity::{Identity, IdentityError, PeerId};
pub use presence::PresenceDirectory;
pub use signaling::{IceCandidate, PresenceEntry, SdpKind, SessionDescription, SignalingMessage};
