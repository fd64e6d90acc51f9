// Domain layer (negotiation state)
pub mod domain;

// Application layer (controller, orchestrator)
pub mod application;

// Infrastructure layer (channels, transports)
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    CandidateDisposition, PeerSessionController, SessionConfig, SessionEvent, SessionOrchestrator,
};
pub use domain::{CallState, IceServer, PeerSession, PendingCandidate};
pub use infrastructure::error::{MediaError, NegotiationError, P2PError, Result};
pub use infrastructure::{
    ChannelEvent, MediaTransport, MemoryChannel, MemoryRelay, SignalingChannel,
    SimulatedMediaTransport, TransportEvent,
};
#[cfg(feature = "native")]
pub use infrastructure::WsChannel;
