use crate::application::controller::PeerSessionController;
use crate::application::events::SessionEvent;
use crate::domain::CallState;
use crate::infrastructure::channel::{ChannelEvent, SignalingChannel};
use crate::infrastructure::error::{P2PError, Result};
use crate::infrastructure::transport::{MediaTransport, TransportEvent};
use peerplay_core::{
    GameSession, Identity, MoveError, MoveOutcome, MoveRules, PeerId, Position, PresenceDirectory,
    SessionDescription, Side, SignalingMessage,
};

/// Composes signaling, negotiation, presence and the game for one local user.
///
/// Owns the channel and is its only consumer. Call [`SessionOrchestrator::poll`]
/// regularly to route inbound traffic, then [`SessionOrchestrator::drain_events`]
/// to collect what happened.
pub struct SessionOrchestrator<C: SignalingChannel, T: MediaTransport> {
    channel: C,
    controller: PeerSessionController<T>,
    rules: MoveRules,
    local_id: Option<PeerId>,
    identity: Option<Identity>,
    directory: PresenceDirectory,
    selected: Option<PeerId>,
    game: Option<GameSession>,
    events: Vec<SessionEvent>,
}

impl<C: SignalingChannel, T: MediaTransport> SessionOrchestrator<C, T> {
    pub fn new(channel: C, transport: T, rules: MoveRules) -> Self {
        let local_id = channel.local_peer_id();
        Self {
            channel,
            controller: PeerSessionController::new(transport),
            rules,
            local_id,
            identity: None,
            directory: PresenceDirectory::new(),
            selected: None,
            game: None,
            events: Vec::new(),
        }
    }

    pub fn local_id(&self) -> Option<&PeerId> {
        self.local_id.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn directory(&self) -> &PresenceDirectory {
        &self.directory
    }

    pub fn selected_peer(&self) -> Option<&PeerId> {
        self.selected.as_ref()
    }

    pub fn game(&self) -> Option<&GameSession> {
        self.game.as_ref()
    }

    pub fn call_state(&self) -> CallState {
        self.controller.state()
    }

    pub fn controller(&self) -> &PeerSessionController<T> {
        &self.controller
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Give the local user a display name. Allowed once per connection.
    pub fn assign_identity(&mut self, name: &str) -> Result<()> {
        let local_id = self.local_id.clone().ok_or(P2PError::NotConnected)?;
        if self.identity.is_some() {
            return Err(P2PError::IdentityAlreadyAssigned);
        }

        let identity = Identity::new(local_id.clone(), name)?;
        tracing::info!("Assigned name '{}' to {}", identity.name(), local_id);

        self.channel.send(SignalingMessage::NameAnnounce {
            name: identity.name().to_string(),
            id: local_id,
        })?;
        self.identity = Some(identity);
        self.request_presence()?;

        if let Err(e) = self.controller.attach_local_media() {
            tracing::warn!("Continuing without local media: {}", e);
            self.events.push(SessionEvent::MediaUnavailable {
                reason: e.to_string(),
            });
        }

        Ok(())
    }

    /// Ask the relay for a fresh presence broadcast
    pub fn request_presence(&mut self) -> Result<()> {
        if self.identity.is_none() {
            return Err(P2PError::IdentityMissing);
        }
        self.channel.send(SignalingMessage::PresenceRequest)
    }

    /// Pick the opponent. Discards any previous call and starts a fresh game.
    pub fn select_peer(&mut self, id: &PeerId) -> Result<()> {
        let local = self.identity.clone().ok_or(P2PError::IdentityMissing)?;
        let opponent = self
            .directory
            .get(id)
            .cloned()
            .ok_or_else(|| P2PError::UnknownPeer(id.clone()))?;

        let before = self.controller.state();
        self.controller.reset();
        self.note_state_change(before);

        self.start_game(local, opponent);
        Ok(())
    }

    /// Offer a media session to the selected peer
    pub fn initiate_call(&mut self) -> Result<()> {
        let local_id = self.local_id.clone().ok_or(P2PError::NotConnected)?;
        let to = self.selected.clone().ok_or(P2PError::NoPeerSelected)?;

        let before = self.controller.state();
        let offer = self.controller.initiate_call(&local_id, &to);
        self.note_state_change(before);
        let offer = offer?;

        self.channel.send(offer)?;
        if let Some(game) = self.game.as_mut() {
            game.set_first_mover(Side::Local);
        }
        Ok(())
    }

    /// Claim a cell and tell the opponent.
    ///
    /// Errors only when the move itself is refused; delivery is best effort.
    pub fn play_local(&mut self, row: u8, col: u8) -> Result<MoveOutcome> {
        let position = Position::new(row, col)?;
        let local_id = self.local_id.clone().ok_or(P2PError::NotConnected)?;
        let game = self.game.as_mut().ok_or(MoveError::NoGame)?;

        let outcome = game.play_local(position)?;
        let winner = outcome
            .decided
            .and_then(|_| game.winner().cloned());

        if let Some(winner) = winner {
            self.events.push(SessionEvent::GameWon { winner });
        }

        // Already on our board; a lost send shows up as ChannelLost
        self.send_or_warn(SignalingMessage::MovePosition {
            from: local_id,
            to: self.selected.clone(),
            position,
        });
        Ok(outcome)
    }

    /// Route everything the channel and the transport produced since the last poll
    pub fn poll(&mut self) {
        for event in self.channel.poll_events() {
            self.handle_channel_event(event);
        }
        for event in self.controller.poll_transport() {
            self.handle_transport_event(event);
        }
    }

    /// Swap in a fresh game against `opponent`. Leaves the call untouched.
    fn start_game(&mut self, local: Identity, opponent: Identity) {
        tracing::info!("Selected {} ({})", opponent.name(), opponent.id());
        self.selected = Some(opponent.id().clone());
        self.game = Some(GameSession::new(local, opponent, self.rules));
    }

    fn note_state_change(&mut self, before: CallState) {
        let state = self.controller.state();
        if state != before {
            self.events.push(SessionEvent::CallStateChanged { state });
        }
    }

    fn send_or_warn(&mut self, message: SignalingMessage) {
        let kind = message.kind();
        if let Err(e) = self.channel.send(message) {
            tracing::warn!("Failed to send {}: {}", kind, e);
        }
    }

    fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected(id) => {
                tracing::info!("Connected to relay as {}", id);
                self.local_id = Some(id.clone());
                self.events.push(SessionEvent::Connected { local_id: id });
            }
            ChannelEvent::Message(message) => self.handle_message(message),
            ChannelEvent::Disconnected => {
                tracing::warn!("Signaling channel lost");
                let before = self.controller.state();
                self.controller.reset();
                self.note_state_change(before);
                self.local_id = None;
                self.events.push(SessionEvent::ChannelLost);
            }
        }
    }

    fn handle_message(&mut self, message: SignalingMessage) {
        let Some(local_id) = self.local_id.clone() else {
            tracing::debug!("Dropping {} received before connect", message.kind());
            return;
        };
        if !message.is_for(&local_id) || message.from() == Some(&local_id) {
            tracing::debug!("Ignoring {} not meant for us", message.kind());
            return;
        }

        tracing::debug!("Routing {}", message.kind());
        match message {
            SignalingMessage::Offer { offer, from, .. } => self.on_offer(&local_id, from, offer),
            SignalingMessage::Answer { answer, from, .. } => {
                let before = self.controller.state();
                if let Err(e) = self.controller.on_answer(&from, answer) {
                    tracing::warn!("Dropping answer from {}: {}", from, e);
                }
                self.note_state_change(before);
            }
            SignalingMessage::IceCandidate {
                candidate, from, ..
            } => {
                let disposition = self.controller.on_ice_candidate(from.as_ref(), candidate);
                tracing::debug!("Remote candidate {:?}", disposition);
            }
            SignalingMessage::MovePosition { from, position, .. } => {
                self.on_remote_move(&from, position)
            }
            SignalingMessage::PresenceUpdate { users } => {
                self.directory.replace(users, Some(&local_id));
                tracing::debug!("{} peers available", self.directory.len());
                self.events.push(SessionEvent::PresenceChanged);
            }
            SignalingMessage::NameAnnounce { .. } | SignalingMessage::PresenceRequest => {}
        }
    }

    fn on_offer(&mut self, local_id: &PeerId, from: PeerId, offer: SessionDescription) {
        let callee_switch =
            self.controller.state() == CallState::Idle && self.selected.as_ref() != Some(&from);
        // Still Idle here, so candidates queued ahead of the offer are kept
        if callee_switch {
            let Some(local) = self.identity.clone() else {
                tracing::warn!("Ignoring offer from {}: no name assigned", from);
                return;
            };
            let opponent = self
                .directory
                .get(&from)
                .cloned()
                .unwrap_or_else(|| Identity::from_remote(from.clone(), from.to_string()));
            self.start_game(local, opponent);
        }

        let before = self.controller.state();
        let result = self.controller.on_offer(local_id, &from, offer);
        self.note_state_change(before);

        match result {
            Ok(Some(answer)) => {
                self.send_or_warn(answer);
                if let Some(game) = self.game.as_mut() {
                    game.set_first_mover(Side::Opponent);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Dropping offer from {}: {}", from, e),
        }
    }

    fn on_remote_move(&mut self, from: &PeerId, position: Position) {
        let Some(game) = self.game.as_mut() else {
            tracing::warn!("Dropping move {} from {}: {}", position, from, MoveError::NoGame);
            return;
        };
        if self.rules == MoveRules::Alternating && game.opponent().id() != from {
            tracing::warn!(
                "Dropping move {} from {}: {}",
                position,
                from,
                MoveError::NotOpponent
            );
            return;
        }

        match game.receive_remote(position) {
            Ok(outcome) => {
                let winner = outcome.decided.and_then(|_| game.winner().cloned());
                self.events.push(SessionEvent::OpponentMoved { position });
                if let Some(winner) = winner {
                    self.events.push(SessionEvent::GameWon { winner });
                }
            }
            Err(e) => tracing::warn!("Dropping move {} from {}: {}", position, from, e),
        }
    }

    fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::LocalCandidate(candidate) => {
                let Some(to) = self.selected.clone() else {
                    tracing::debug!("No peer selected, dropping local candidate");
                    return;
                };
                self.send_or_warn(SignalingMessage::IceCandidate {
                    candidate,
                    from: self.local_id.clone(),
                    to: Some(to),
                });
            }
            TransportEvent::RemoteTrack => {
                let peer = self.controller.remote_peer().cloned();
                tracing::info!("Remote media started");
                self.events.push(SessionEvent::RemoteMediaStarted { peer });
            }
        }
    }
}
