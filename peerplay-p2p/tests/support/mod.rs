use peerplay_core::{MoveRules, PeerId};
use peerplay_p2p::{
    IceServer, MemoryChannel, MemoryRelay, SessionEvent, SessionOrchestrator,
    SimulatedMediaTransport,
};

pub type Peer = SessionOrchestrator<MemoryChannel, SimulatedMediaTransport>;

/// Create one orchestrator attached to `relay`
pub fn peer(relay: &MemoryRelay, rules: MoveRules) -> Peer {
    SessionOrchestrator::new(
        MemoryChannel::connect(relay),
        SimulatedMediaTransport::new(IceServer::default_servers()),
        rules,
    )
}

/// Test fixture: N orchestrators sharing one in-process relay
pub struct SessionFixture {
    pub relay: MemoryRelay,
    pub peers: Vec<Peer>,
    events: Vec<Vec<SessionEvent>>,
}

impl SessionFixture {
    pub fn new(count: usize) -> Self {
        Self::with_rules(count, MoveRules::Open)
    }

    pub fn with_rules(count: usize, rules: MoveRules) -> Self {
        let relay = MemoryRelay::new();
        let peers = (0..count).map(|_| peer(&relay, rules)).collect();

        let mut fixture = Self {
            relay,
            peers,
            events: vec![Vec::new(); count],
        };
        fixture.tick(1);
        fixture
    }

    /// Connect one peer per name and let presence settle
    pub fn named(names: &[&str]) -> Self {
        Self::named_with_rules(names, MoveRules::Open)
    }

    pub fn named_with_rules(names: &[&str], rules: MoveRules) -> Self {
        let mut fixture = Self::with_rules(names.len(), rules);
        for (peer, name) in fixture.peers.iter_mut().zip(names) {
            peer.assign_identity(name).unwrap();
        }
        fixture.tick(3);
        fixture
    }

    pub fn id(&self, index: usize) -> PeerId {
        self.peers[index].local_id().cloned().unwrap()
    }

    /// `caller` selects `callee` and calls; ticks until the exchange is done
    pub fn call(&mut self, caller: usize, callee: usize) {
        let callee_id = self.id(callee);
        self.peers[caller].select_peer(&callee_id).unwrap();
        self.peers[caller].initiate_call().unwrap();
        self.tick(5);
    }

    /// Poll every peer `count` times, in index order
    pub fn tick(&mut self, count: usize) {
        for _ in 0..count {
            for (peer, events) in self.peers.iter_mut().zip(self.events.iter_mut()) {
                peer.poll();
                events.extend(peer.drain_events());
            }
        }
    }

    /// Play a move and deliver it
    pub fn play(&mut self, index: usize, row: u8, col: u8) {
        self.peers[index].play_local(row, col).unwrap();
        self.tick(2);
    }

    /// Events collected for one peer since the last call
    pub fn take_events(&mut self, index: usize) -> Vec<SessionEvent> {
        self.events[index].extend(self.peers[index].drain_events());
        std::mem::take(&mut self.events[index])
    }

    pub fn winner_name(&self, index: usize) -> Option<String> {
        self.peers[index]
            .game()
            .and_then(|game| game.winner())
            .map(|winner| winner.name().to_string())
    }
}
