use crate::infrastructure::error::{MediaError, NegotiationError};
use peerplay_core::{IceCandidate, SessionDescription};

/// Events emitted by the media transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A local connectivity candidate to forward to the remote peer
    LocalCandidate(IceCandidate),
    /// Remote media started flowing
    RemoteTrack,
}

/// The single media connection owned by a [`PeerSessionController`].
///
/// Mirrors the browser peer-connection primitives the negotiation needs.
/// Failures are reported per call; none of them tear the transport down.
///
/// [`PeerSessionController`]: crate::application::PeerSessionController
pub trait MediaTransport {
    fn create_offer(&mut self) -> Result<SessionDescription, NegotiationError>;

    fn create_answer(&mut self) -> Result<SessionDescription, NegotiationError>;

    fn set_local_description(
        &mut self,
        description: &SessionDescription,
    ) -> Result<(), NegotiationError>;

    fn set_remote_description(
        &mut self,
        description: &SessionDescription,
    ) -> Result<(), NegotiationError>;

    fn add_ice_candidate(&mut self, candidate: &IceCandidate) -> Result<(), NegotiationError>;

    /// Discard a local offer that lost a glare race
    fn rollback(&mut self) -> Result<(), NegotiationError>;

    /// Attach camera and microphone tracks
    fn attach_local_media(&mut self) -> Result<(), MediaError>;

    /// Drop all negotiation state so a fresh call can start
    fn reset(&mut self);

    /// Drain transport events since the last poll
    fn poll_events(&mut self) -> Vec<TransportEvent>;
}
