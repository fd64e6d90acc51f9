use crate::application::presenter::render_game;
use crate::infrastructure::error::{CliError, Result};
use peerplay_core::MoveRules;
use peerplay_p2p::{
    CallState, IceServer, MemoryChannel, MemoryRelay, SessionOrchestrator, SimulatedMediaTransport,
};

type LocalPeer = SessionOrchestrator<MemoryChannel, SimulatedMediaTransport>;

/// Alice opens the top row while Bob fills the middle row
const SCRIPT: [(usize, u8, u8); 5] = [(0, 0, 0), (1, 1, 0), (0, 0, 1), (1, 1, 1), (0, 0, 2)];

/// Outcome of the in-process demo match
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    /// Winner as seen by each player, Alice first
    pub winners: [Option<String>; 2],
    pub call_states: [CallState; 2],
    /// Alice's final board
    pub board: String,
}

/// Play the Alice/Bob match over an in-process relay
pub fn run_demo(rules: MoveRules) -> Result<DemoReport> {
    let relay = MemoryRelay::new();
    let mut peers = [join(&relay, rules), join(&relay, rules)];

    peers[0].assign_identity("Alice")?;
    peers[1].assign_identity("Bob")?;
    pump(&mut peers, 3);

    let bob = peers[1]
        .local_id()
        .cloned()
        .ok_or_else(|| CliError::InvalidConfig("Bob never connected".to_string()))?;
    peers[0].select_peer(&bob)?;
    peers[0].initiate_call()?;
    pump(&mut peers, 5);

    for (player, row, col) in SCRIPT {
        let outcome = peers[player].play_local(row, col)?;
        tracing::info!(
            "{} plays {}",
            if player == 0 { "Alice" } else { "Bob" },
            outcome.position
        );
        pump(&mut peers, 2);
    }

    let winner = |peer: &LocalPeer| {
        peer.game()
            .and_then(|game| game.winner())
            .map(|winner| winner.name().to_string())
    };

    Ok(DemoReport {
        winners: [winner(&peers[0]), winner(&peers[1])],
        call_states: [peers[0].call_state(), peers[1].call_state()],
        board: peers[0].game().map(render_game).unwrap_or_default(),
    })
}

fn join(relay: &MemoryRelay, rules: MoveRules) -> LocalPeer {
    SessionOrchestrator::new(
        MemoryChannel::connect(relay),
        SimulatedMediaTransport::new(IceServer::default_servers()),
        rules,
    )
}

fn pump(peers: &mut [LocalPeer; 2], rounds: usize) {
    for _ in 0..rounds {
        for peer in peers.iter_mut() {
            peer.poll();
            peer.drain_events();
        }
    }
}
