use cucumber::World;
use peerplay_core::{GameSession, Identity, MoveRules, PeerId};
use peerplay_p2p::{
    IceServer, MemoryChannel, MemoryRelay, SessionEvent, SessionOrchestrator,
    SimulatedMediaTransport,
};
use std::collections::HashMap;
use std::fmt;

pub type Peer = SessionOrchestrator<MemoryChannel, SimulatedMediaTransport>;

#[derive(World, Default)]
pub struct SessionWorld {
    /// In-process relay every peer of the scenario talks through
    pub relay: MemoryRelay,

    /// Peers by display name, in join order
    pub peers: Vec<(String, Peer)>,

    /// Events each peer surfaced so far
    pub events: HashMap<String, Vec<SessionEvent>>,

    /// Move rules for peers created from now on
    pub rules: MoveRules,

    /// Standalone game for rule-only scenarios
    pub game: Option<GameSession>,

    /// Error from the last user action, if it failed
    pub last_error: Option<String>,
}

impl fmt::Debug for SessionWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionWorld")
            .field(
                "peers",
                &self.peers.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("rules", &self.rules)
            .field("game", &self.game)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl SessionWorld {
    /// Connect a peer, give it `name` and let presence settle
    pub fn join(&mut self, name: &str) {
        let mut peer = SessionOrchestrator::new(
            MemoryChannel::connect(&self.relay),
            SimulatedMediaTransport::new(IceServer::default_servers()),
            self.rules,
        );
        peer.assign_identity(name)
            .unwrap_or_else(|e| panic!("{} could not take a name: {}", name, e));
        self.peers.push((name.to_string(), peer));
        self.tick(3);
    }

    pub fn peer(&self, name: &str) -> &Peer {
        self.peers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, peer)| peer)
            .unwrap_or_else(|| panic!("Peer '{}' not found", name))
    }

    pub fn peer_mut(&mut self, name: &str) -> &mut Peer {
        self.peers
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, peer)| peer)
            .unwrap_or_else(|| panic!("Peer '{}' not found", name))
    }

    pub fn id(&self, name: &str) -> PeerId {
        self.peer(name)
            .local_id()
            .cloned()
            .unwrap_or_else(|| panic!("Peer '{}' is not connected", name))
    }

    /// Poll every peer `count` times, collecting their events
    pub fn tick(&mut self, count: usize) {
        for _ in 0..count {
            for (name, peer) in self.peers.iter_mut() {
                peer.poll();
                self.events
                    .entry(name.clone())
                    .or_default()
                    .extend(peer.drain_events());
            }
        }
    }

    /// Remember the outcome of a user action
    pub fn record<T, E: fmt::Display>(&mut self, result: Result<T, E>) {
        self.last_error = result.err().map(|e| e.to_string());
    }

    pub fn events_of(&self, name: &str) -> &[SessionEvent] {
        self.events.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Start a rule-only game between two named players
    pub fn start_game(&mut self, local: &str, opponent: &str) {
        let local = Identity::new(PeerId::new(local.to_lowercase()), local)
            .unwrap_or_else(|e| panic!("bad name: {}", e));
        let opponent = Identity::new(PeerId::new(opponent.to_lowercase()), opponent)
            .unwrap_or_else(|e| panic!("bad name: {}", e));
        self.game = Some(GameSession::new(local, opponent, self.rules));
    }

    pub fn game_mut(&mut self) -> &mut GameSession {
        self.game.as_mut().expect("No game started")
    }
}
