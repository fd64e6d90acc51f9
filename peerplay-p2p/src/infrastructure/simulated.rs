use crate::domain::IceServer;
use crate::infrastructure::error::{MediaError, NegotiationError};
use crate::infrastructure::transport::{MediaTransport, TransportEvent};
use peerplay_core::{IceCandidate, SdpKind, SessionDescription};
use uuid::Uuid;

/// In-process stand-in for a browser peer connection.
///
/// Produces well-formed SDP text and one host candidate plus one
/// server-reflexive candidate per configured ICE URL. It enforces the same
/// ordering rules a real peer connection does: candidates need a remote
/// description, answers need a remote offer, and descriptions must be SDP.
#[derive(Debug, Clone)]
pub struct SimulatedMediaTransport {
    ice_servers: Vec<IceServer>,
    media_available: bool,
    refuse_local_descriptions: bool,
    media_attached: bool,
    session_tag: String,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    applied_candidates: Vec<IceCandidate>,
    gathered: bool,
    remote_track_seen: bool,
    events: Vec<TransportEvent>,
}

impl SimulatedMediaTransport {
    pub fn new(ice_servers: Vec<IceServer>) -> Self {
        Self {
            ice_servers,
            media_available: true,
            refuse_local_descriptions: false,
            media_attached: false,
            session_tag: Uuid::new_v4().simple().to_string(),
            local_description: None,
            remote_description: None,
            applied_candidates: Vec::new(),
            gathered: false,
            remote_track_seen: false,
            events: Vec::new(),
        }
    }

    /// Behave as if no camera/microphone is present
    pub fn without_media_devices(mut self) -> Self {
        self.media_available = false;
        self
    }

    /// Fail every offer/answer creation (broken encoder, closed connection)
    pub fn refusing_local_descriptions(mut self) -> Self {
        self.refuse_local_descriptions = true;
        self
    }

    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.local_description.as_ref()
    }

    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote_description.as_ref()
    }

    /// Remote candidates accepted so far, in application order
    pub fn applied_candidates(&self) -> &[IceCandidate] {
        &self.applied_candidates
    }

    pub fn media_attached(&self) -> bool {
        self.media_attached
    }

    fn render_sdp(&self, kind: SdpKind) -> String {
        let direction = if self.media_attached {
            "sendrecv"
        } else {
            "recvonly"
        };
        let setup = match kind {
            SdpKind::Offer => "actpass",
            SdpKind::Answer => "active",
        };
        format!(
            "v=0\r\no=- {} 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n\
             m=audio 9 UDP/TLS/RTP/SAVPF 111\r\na=mid:0\r\na=setup:{}\r\na={}\r\n\
             m=video 9 UDP/TLS/RTP/SAVPF 96\r\na=mid:1\r\na=setup:{}\r\na={}\r\n",
            self.session_tag, setup, direction, setup, direction
        )
    }

    fn gather_candidates(&mut self) {
        if self.gathered {
            return;
        }
        self.gathered = true;

        let mut candidates = vec![IceCandidate::new(format!(
            "candidate:1 1 udp 2122260223 192.168.1.{} 54400 typ host",
            self.session_tag.len()
        ))];

        let urls = self.ice_servers.iter().flat_map(|server| server.urls.iter());
        for (i, url) in urls.enumerate() {
            let kind = if url.starts_with("turn") { "relay" } else { "srflx" };
            candidates.push(IceCandidate::new(format!(
                "candidate:{} 1 udp {} 203.0.113.{} {} typ {} raddr 192.168.1.1 rport 54400",
                i + 2,
                1686052607 - i,
                10 + i,
                60000 + i,
                kind
            )));
        }

        tracing::debug!("Gathered {} local candidates", candidates.len());
        self.events
            .extend(candidates.into_iter().map(TransportEvent::LocalCandidate));
    }

    fn check_media_flowing(&mut self) {
        if self.remote_track_seen {
            return;
        }
        let Some(remote) = &self.remote_description else {
            return;
        };
        if self.local_description.is_some() && remote.sdp.contains("a=sendrecv") {
            self.remote_track_seen = true;
            self.events.push(TransportEvent::RemoteTrack);
        }
    }
}

impl MediaTransport for SimulatedMediaTransport {
    fn create_offer(&mut self) -> Result<SessionDescription, NegotiationError> {
        if self.refuse_local_descriptions {
            return Err(NegotiationError::LocalDescription(
                "offer creation refused".to_string(),
            ));
        }
        Ok(SessionDescription::offer(self.render_sdp(SdpKind::Offer)))
    }

    fn create_answer(&mut self) -> Result<SessionDescription, NegotiationError> {
        if self.refuse_local_descriptions {
            return Err(NegotiationError::LocalDescription(
                "answer creation refused".to_string(),
            ));
        }
        match &self.remote_description {
            Some(remote) if remote.kind == SdpKind::Offer => {
                Ok(SessionDescription::answer(self.render_sdp(SdpKind::Answer)))
            }
            _ => Err(NegotiationError::LocalDescription(
                "no remote offer to answer".to_string(),
            )),
        }
    }

    fn set_local_description(
        &mut self,
        description: &SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.local_description = Some(description.clone());
        self.gather_candidates();
        self.check_media_flowing();
        Ok(())
    }

    fn set_remote_description(
        &mut self,
        description: &SessionDescription,
    ) -> Result<(), NegotiationError> {
        if !description.sdp.starts_with("v=0") {
            return Err(NegotiationError::DescriptionRejected(
                "not an SDP document".to_string(),
            ));
        }

        let expected = match &self.local_description {
            Some(local) if local.kind == SdpKind::Offer => SdpKind::Answer,
            Some(_) => {
                return Err(NegotiationError::DescriptionRejected(
                    "negotiation already complete".to_string(),
                ))
            }
            None => SdpKind::Offer,
        };
        if description.kind != expected {
            return Err(NegotiationError::DescriptionRejected(format!(
                "expected {:?}, got {:?}",
                expected, description.kind
            )));
        }

        self.remote_description = Some(description.clone());
        self.check_media_flowing();
        Ok(())
    }

    fn add_ice_candidate(&mut self, candidate: &IceCandidate) -> Result<(), NegotiationError> {
        if self.remote_description.is_none() {
            return Err(NegotiationError::CandidateRejected(
                "no remote description".to_string(),
            ));
        }
        if !candidate.candidate.starts_with("candidate:") {
            return Err(NegotiationError::CandidateRejected(format!(
                "unparseable candidate '{}'",
                candidate.candidate
            )));
        }
        self.applied_candidates.push(candidate.clone());
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), NegotiationError> {
        match &self.local_description {
            Some(local) if local.kind == SdpKind::Offer && self.remote_description.is_none() => {
                self.local_description = None;
                Ok(())
            }
            _ => Err(NegotiationError::LocalDescription(
                "nothing to roll back".to_string(),
            )),
        }
    }

    fn attach_local_media(&mut self) -> Result<(), MediaError> {
        if !self.media_available {
            return Err(MediaError::Unavailable(
                "no camera or microphone found".to_string(),
            ));
        }
        self.media_attached = true;
        Ok(())
    }

    fn reset(&mut self) {
        self.session_tag = Uuid::new_v4().simple().to_string();
        self.local_description = None;
        self.remote_description = None;
        self.applied_candidates.clear();
        self.gathered = false;
        self.remote_track_seen = false;
        self.events.clear();
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        std::mem::take(&mut self.events)
    }
}
