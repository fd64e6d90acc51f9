mod ice_server;
mod peer_session;

pub use ice_server::IceServer;
pub use peer_session::{CallState, PeerSession, PendingCandidate};
