use crate::domain::{CallState, PeerSession, PendingCandidate};
use crate::infrastructure::error::{MediaError, NegotiationError};
use crate::infrastructure::transport::{MediaTransport, TransportEvent};
use peerplay_core::{IceCandidate, PeerId, SessionDescription, SignalingMessage};

/// What happened to an inbound ICE candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateDisposition {
    Applied,
    /// Held until the remote description is installed
    Queued,
    Dropped,
}

/// Drives the offer/answer exchange for the single media session.
///
/// Produces outbound [`SignalingMessage`]s; sending them is the caller's job.
/// Remote input that the transport rejects is dropped and leaves the state
/// untouched. Only local failures move the session to [`CallState::Failed`],
/// which is left through [`PeerSessionController::reset`].
pub struct PeerSessionController<T: MediaTransport> {
    transport: T,
    session: PeerSession,
}

impl<T: MediaTransport> PeerSessionController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            session: PeerSession::new(),
        }
    }

    pub fn state(&self) -> CallState {
        self.session.state
    }

    pub fn remote_peer(&self) -> Option<&PeerId> {
        self.session.remote_peer.as_ref()
    }

    pub fn session(&self) -> &PeerSession {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn attach_local_media(&mut self) -> Result<(), MediaError> {
        self.transport.attach_local_media()
    }

    /// Create and install a local offer addressed to `to`
    pub fn initiate_call(
        &mut self,
        local: &PeerId,
        to: &PeerId,
    ) -> Result<SignalingMessage, NegotiationError> {
        if self.session.state != CallState::Idle {
            return Err(NegotiationError::InvalidState {
                operation: "start a call",
                state: self.session.state,
            });
        }

        let offer = self.create_local(|transport| transport.create_offer())?;
        self.session.local_description = Some(offer.clone());
        self.session.remote_peer = Some(to.clone());
        self.session.state = CallState::Offering;

        tracing::info!("Calling {}", to);

        Ok(SignalingMessage::Offer {
            offer,
            from: local.clone(),
            to: Some(to.clone()),
        })
    }

    /// Apply a remote offer and produce the answer to send back.
    ///
    /// Returns `Ok(None)` when the offer loses a glare race and is ignored.
    pub fn on_offer(
        &mut self,
        local: &PeerId,
        from: &PeerId,
        offer: SessionDescription,
    ) -> Result<Option<SignalingMessage>, NegotiationError> {
        match self.session.state {
            CallState::Idle => {}
            CallState::Offering if self.session.remote_peer.as_ref() == Some(from) => {
                if local < from {
                    tracing::debug!("Glare with {}: keeping our offer", from);
                    return Ok(None);
                }
                tracing::debug!("Glare with {}: rolling back our offer", from);
                if let Err(e) = self.transport.rollback() {
                    self.session.state = CallState::Failed;
                    return Err(e);
                }
                self.session.local_description = None;
                self.session.remote_peer = None;
                self.session.state = CallState::Idle;
            }
            state => {
                return Err(NegotiationError::InvalidState {
                    operation: "accept an offer",
                    state,
                })
            }
        }

        self.transport.set_remote_description(&offer)?;
        self.session.remote_description = Some(offer);
        self.session.remote_peer = Some(from.clone());
        self.session.state = CallState::Answering;
        self.flush_pending_candidates();

        let answer = self.create_local(|transport| transport.create_answer())?;
        self.session.local_description = Some(answer.clone());
        self.session.state = CallState::Connected;

        tracing::info!("Answered call from {}", from);

        Ok(Some(SignalingMessage::Answer {
            answer,
            from: local.clone(),
            to: Some(from.clone()),
        }))
    }

    /// Apply the answer to our outstanding offer.
    ///
    /// Returns `Ok(false)` for answers that are stale, duplicated or from a
    /// peer we did not call.
    pub fn on_answer(
        &mut self,
        from: &PeerId,
        answer: SessionDescription,
    ) -> Result<bool, NegotiationError> {
        if self.session.state != CallState::Offering {
            tracing::debug!("Ignoring answer from {} while {}", from, self.session.state);
            return Ok(false);
        }
        if self.session.remote_peer.as_ref() != Some(from) {
            tracing::debug!("Ignoring answer from uncalled peer {}", from);
            return Ok(false);
        }

        self.transport.set_remote_description(&answer)?;
        self.session.remote_description = Some(answer);
        self.session.state = CallState::Connected;
        self.flush_pending_candidates();

        tracing::info!("Call with {} connected", from);
        Ok(true)
    }

    pub fn on_ice_candidate(
        &mut self,
        from: Option<&PeerId>,
        candidate: IceCandidate,
    ) -> CandidateDisposition {
        if self.session.state == CallState::Failed {
            return CandidateDisposition::Dropped;
        }
        if let (Some(from), Some(remote)) = (from, self.session.remote_peer.as_ref()) {
            if from != remote {
                tracing::debug!("Dropping candidate from {} (talking to {})", from, remote);
                return CandidateDisposition::Dropped;
            }
        }

        if !self.session.has_remote_description() {
            self.session.pending_remote_candidates.push_back(PendingCandidate {
                from: from.cloned(),
                candidate,
            });
            return CandidateDisposition::Queued;
        }

        self.apply_candidate(&candidate)
    }

    /// Forget the current negotiation and start over from `Idle`
    pub fn reset(&mut self) {
        if self.session.state != CallState::Idle {
            tracing::debug!("Resetting call (was {})", self.session.state);
        }
        self.session.clear();
        self.transport.reset();
    }

    pub fn poll_transport(&mut self) -> Vec<TransportEvent> {
        self.transport.poll_events()
    }

    fn create_local(
        &mut self,
        create: impl FnOnce(&mut T) -> Result<SessionDescription, NegotiationError>,
    ) -> Result<SessionDescription, NegotiationError> {
        let installed = create(&mut self.transport).and_then(|description| {
            self.transport
                .set_local_description(&description)
                .map(|_| description)
        });

        if let Err(e) = &installed {
            tracing::warn!("Local description failed: {}", e);
            self.session.state = CallState::Failed;
        }
        installed
    }

    fn flush_pending_candidates(&mut self) {
        let pending = std::mem::take(&mut self.session.pending_remote_candidates);
        if !pending.is_empty() {
            tracing::debug!("Applying {} queued candidates", pending.len());
        }
        let remote = self.session.remote_peer.clone();
        for pending in pending {
            if pending.belongs_to(remote.as_ref()) {
                self.apply_candidate(&pending.candidate);
            } else {
                tracing::debug!(
                    "Dropping stale candidate from {:?} (talking to {:?})",
                    pending.from,
                    remote
                );
            }
        }
    }

    fn apply_candidate(&mut self, candidate: &IceCandidate) -> CandidateDisposition {
        match self.transport.add_ice_candidate(candidate) {
            Ok(()) => CandidateDisposition::Applied,
            Err(e) => {
                tracing::warn!("Dropping candidate: {}", e);
                CandidateDisposition::Dropped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IceServer;
    use crate::infrastructure::SimulatedMediaTransport;

    fn controller() -> PeerSessionController<SimulatedMediaTransport> {
        PeerSessionController::new(SimulatedMediaTransport::new(IceServer::default_servers()))
    }

    fn alice() -> PeerId {
        PeerId::new("alice")
    }

    fn bob() -> PeerId {
        PeerId::new("bob")
    }

    fn candidate(n: u32) -> IceCandidate {
        IceCandidate::new(format!("candidate:{} 1 udp 1 10.0.0.{} 9 typ host", n, n))
    }

    fn offer_of(message: SignalingMessage) -> SessionDescription {
        match message {
            SignalingMessage::Offer { offer, .. } => offer,
            other => panic!("expected offer, got {:?}", other),
        }
    }

    fn answer_of(message: Option<SignalingMessage>) -> SessionDescription {
        match message {
            Some(SignalingMessage::Answer { answer, .. }) => answer,
            other => panic!("expected answer, got {:?}", other),
        }
    }

    #[test]
    fn test_offer_answer_connects_both_sides() {
        let mut caller = controller();
        let mut callee = controller();

        let offer = caller.initiate_call(&alice(), &bob()).unwrap();
        assert_eq!(caller.state(), CallState::Offering);
        assert_eq!(offer.to(), Some(&bob()));

        let answer = callee.on_offer(&bob(), &alice(), offer_of(offer)).unwrap();
        assert_eq!(callee.state(), CallState::Connected);

        assert!(caller.on_answer(&bob(), answer_of(answer)).unwrap());
        assert_eq!(caller.state(), CallState::Connected);
        assert_eq!(caller.remote_peer(), Some(&bob()));
    }

    #[test]
    fn test_duplicate_answer_ignored() {
        let mut caller = controller();
        let mut callee = controller();

        let offer = offer_of(caller.initiate_call(&alice(), &bob()).unwrap());
        let answer = answer_of(callee.on_offer(&bob(), &alice(), offer).unwrap());

        assert!(caller.on_answer(&bob(), answer.clone()).unwrap());
        assert!(!caller.on_answer(&bob(), answer).unwrap());
        assert_eq!(caller.state(), CallState::Connected);
    }

    #[test]
    fn test_answer_from_uncalled_peer_ignored() {
        let mut caller = controller();
        let mut stranger = controller();

        let offer = offer_of(caller.initiate_call(&alice(), &bob()).unwrap());
        let answer = answer_of(stranger.on_offer(&PeerId::new("carol"), &alice(), offer).unwrap());

        assert!(!caller.on_answer(&PeerId::new("carol"), answer).unwrap());
        assert_eq!(caller.state(), CallState::Offering);
    }

    #[test]
    fn test_early_candidates_applied_in_arrival_order() {
        let mut caller = controller();
        let mut callee = controller();

        assert_eq!(
            callee.on_ice_candidate(Some(&alice()), candidate(1)),
            CandidateDisposition::Queued
        );
        assert_eq!(
            callee.on_ice_candidate(Some(&alice()), candidate(2)),
            CandidateDisposition::Queued
        );

        let offer = offer_of(caller.initiate_call(&alice(), &bob()).unwrap());
        callee.on_offer(&bob(), &alice(), offer).unwrap();

        assert!(callee.session().pending_remote_candidates.is_empty());
        assert_eq!(
            callee.transport().applied_candidates(),
            &[candidate(1), candidate(2)]
        );
        assert_eq!(
            callee.on_ice_candidate(Some(&alice()), candidate(3)),
            CandidateDisposition::Applied
        );
    }

    #[test]
    fn test_queued_candidates_from_other_peer_not_flushed() {
        let mut caller = controller();
        let mut callee = controller();

        callee.on_ice_candidate(Some(&PeerId::new("carol")), candidate(1));
        callee.on_ice_candidate(Some(&alice()), candidate(2));
        callee.on_ice_candidate(None, candidate(3));

        let offer = offer_of(caller.initiate_call(&alice(), &bob()).unwrap());
        callee.on_offer(&bob(), &alice(), offer).unwrap();

        assert_eq!(
            callee.transport().applied_candidates(),
            &[candidate(2), candidate(3)]
        );
        assert!(callee.session().pending_remote_candidates.is_empty());
    }

    #[test]
    fn test_malformed_candidate_dropped() {
        let mut caller = controller();
        let mut callee = controller();

        let offer = offer_of(caller.initiate_call(&alice(), &bob()).unwrap());
        callee.on_offer(&bob(), &alice(), offer).unwrap();

        let disposition = callee.on_ice_candidate(Some(&alice()), IceCandidate::new("garbage"));

        assert_eq!(disposition, CandidateDisposition::Dropped);
        assert_eq!(callee.state(), CallState::Connected);
    }

    #[test]
    fn test_candidate_from_other_peer_dropped() {
        let mut caller = controller();
        caller.initiate_call(&alice(), &bob()).unwrap();

        let disposition = caller.on_ice_candidate(Some(&PeerId::new("carol")), candidate(1));

        assert_eq!(disposition, CandidateDisposition::Dropped);
        assert!(caller.session().pending_remote_candidates.is_empty());
    }

    #[test]
    fn test_rejected_offer_leaves_state_unchanged() {
        let mut callee = controller();

        let result = callee.on_offer(&bob(), &alice(), SessionDescription::offer("junk"));

        assert!(matches!(
            result,
            Err(NegotiationError::DescriptionRejected(_))
        ));
        assert_eq!(callee.state(), CallState::Idle);
    }

    #[test]
    fn test_glare_smaller_id_keeps_offering() {
        let mut a = controller();
        let mut b = controller();

        let offer_a = offer_of(a.initiate_call(&alice(), &bob()).unwrap());
        let offer_b = offer_of(b.initiate_call(&bob(), &alice()).unwrap());

        assert!(a.on_offer(&alice(), &bob(), offer_b).unwrap().is_none());
        assert_eq!(a.state(), CallState::Offering);

        let answer = answer_of(b.on_offer(&bob(), &alice(), offer_a).unwrap());
        assert_eq!(b.state(), CallState::Connected);

        assert!(a.on_answer(&bob(), answer).unwrap());
        assert_eq!(a.state(), CallState::Connected);
    }

    #[test]
    fn test_glare_rollback_then_rejected_offer_forgets_peer() {
        let mut b = controller();
        b.initiate_call(&bob(), &alice()).unwrap();

        let result = b.on_offer(&bob(), &alice(), SessionDescription::offer("junk"));

        assert!(matches!(
            result,
            Err(NegotiationError::DescriptionRejected(_))
        ));
        assert_eq!(b.state(), CallState::Idle);
        assert!(b.remote_peer().is_none());
        assert!(b.session().local_description.is_none());
    }

    #[test]
    fn test_offer_while_connected_rejected() {
        let mut caller = controller();
        let mut callee = controller();

        let offer = offer_of(caller.initiate_call(&alice(), &bob()).unwrap());
        callee.on_offer(&bob(), &alice(), offer.clone()).unwrap();

        let result = callee.on_offer(&bob(), &alice(), offer);
        assert!(matches!(
            result,
            Err(NegotiationError::InvalidState {
                state: CallState::Connected,
                ..
            })
        ));
    }

    #[test]
    fn test_local_failure_is_sticky_until_reset() {
        let transport =
            SimulatedMediaTransport::new(Vec::new()).refusing_local_descriptions();
        let mut caller = PeerSessionController::new(transport);

        assert!(matches!(
            caller.initiate_call(&alice(), &bob()),
            Err(NegotiationError::LocalDescription(_))
        ));
        assert_eq!(caller.state(), CallState::Failed);

        assert!(caller.initiate_call(&alice(), &bob()).is_err());
        assert_eq!(
            caller.on_ice_candidate(None, candidate(1)),
            CandidateDisposition::Dropped
        );

        caller.reset();
        assert_eq!(caller.state(), CallState::Idle);
    }

    #[test]
    fn test_reset_clears_pending_candidates() {
        let mut callee = controller();
        callee.on_ice_candidate(None, candidate(1));

        callee.reset();

        assert!(callee.session().pending_remote_candidates.is_empty());
        assert!(callee.remote_peer().is_none());
    }

    #[test]
    fn test_transport_reports_local_candidates() {
        let mut caller = controller();
        caller.initiate_call(&alice(), &bob()).unwrap();

        let events = caller.poll_transport();
        assert!(events
            .iter()
            .any(|e| matches!(e, TransportEvent::LocalCandidate(_))));
    }
}
