mod support;

use peerplay_core::{IceCandidate, MoveRules, SignalingMessage};
use peerplay_p2p::{
    CallState, IceServer, MemoryChannel, MemoryRelay, SessionEvent, SessionOrchestrator,
    SignalingChannel, SimulatedMediaTransport,
};
use support::SessionFixture;

const ALICE: usize = 0;
const BOB: usize = 1;

#[test]
fn test_call_connects_both_sides() {
    let mut fixture = SessionFixture::named(&["Alice", "Bob"]);
    fixture.call(ALICE, BOB);

    assert_eq!(fixture.peers[ALICE].call_state(), CallState::Connected);
    assert_eq!(fixture.peers[BOB].call_state(), CallState::Connected);

    // The callee picks the caller as opponent on its own
    assert_eq!(fixture.peers[BOB].selected_peer(), Some(&fixture.id(ALICE)));
    assert_eq!(
        fixture.peers[BOB].game().unwrap().opponent().name(),
        "Alice"
    );
}

#[test]
fn test_candidates_reach_both_transports() {
    let mut fixture = SessionFixture::named(&["Alice", "Bob"]);
    fixture.call(ALICE, BOB);

    for index in [ALICE, BOB] {
        let transport = fixture.peers[index].controller().transport();
        assert_eq!(transport.applied_candidates().len(), 3);
        assert!(fixture.peers[index]
            .controller()
            .session()
            .pending_remote_candidates
            .is_empty());
    }
}

#[test]
fn test_candidate_ahead_of_offer_reaches_unselected_callee() {
    let mut fixture = SessionFixture::named(&["Alice", "Bob"]);
    let bob_id = fixture.id(BOB);
    fixture.peers[ALICE].select_peer(&bob_id).unwrap();

    let early = IceCandidate::new("candidate:9 1 udp 1 192.168.1.9 9999 typ host");
    let alice_id = fixture.id(ALICE);
    fixture.peers[ALICE]
        .channel_mut()
        .send(SignalingMessage::IceCandidate {
            candidate: early.clone(),
            from: Some(alice_id),
            to: Some(bob_id),
        })
        .unwrap();
    fixture.tick(1);
    assert_eq!(
        fixture.peers[BOB]
            .controller()
            .session()
            .pending_remote_candidates
            .len(),
        1
    );

    fixture.peers[ALICE].initiate_call().unwrap();
    fixture.tick(5);

    assert_eq!(fixture.peers[BOB].call_state(), CallState::Connected);
    let applied = fixture.peers[BOB].controller().transport().applied_candidates();
    assert_eq!(applied.first(), Some(&early));
    assert_eq!(applied.len(), 4);
}

#[test]
fn test_call_state_events_in_order() {
    let mut fixture = SessionFixture::named(&["Alice", "Bob"]);
    fixture.take_events(ALICE);
    fixture.take_events(BOB);

    fixture.call(ALICE, BOB);

    let states = |events: Vec<SessionEvent>| -> Vec<CallState> {
        events
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::CallStateChanged { state } => Some(state),
                _ => None,
            })
            .collect()
    };
    assert_eq!(
        states(fixture.take_events(ALICE)),
        vec![CallState::Offering, CallState::Connected]
    );
    assert_eq!(states(fixture.take_events(BOB)), vec![CallState::Connected]);
}

#[test]
fn test_remote_media_reported() {
    let mut fixture = SessionFixture::named(&["Alice", "Bob"]);
    fixture.call(ALICE, BOB);

    let bob = fixture.id(BOB);
    assert!(fixture
        .take_events(ALICE)
        .contains(&SessionEvent::RemoteMediaStarted { peer: Some(bob) }));
}

#[test]
fn test_second_call_rejected_while_offering() {
    let mut fixture = SessionFixture::named(&["Alice", "Bob"]);
    let bob = fixture.id(BOB);

    fixture.peers[ALICE].select_peer(&bob).unwrap();
    fixture.peers[ALICE].initiate_call().unwrap();

    assert!(fixture.peers[ALICE].initiate_call().is_err());
    assert_eq!(fixture.peers[ALICE].call_state(), CallState::Offering);
}

#[test]
fn test_simultaneous_calls_resolve() {
    let mut fixture = SessionFixture::named(&["Alice", "Bob"]);
    let (alice, bob) = (fixture.id(ALICE), fixture.id(BOB));

    fixture.peers[ALICE].select_peer(&bob).unwrap();
    fixture.peers[BOB].select_peer(&alice).unwrap();
    fixture.peers[ALICE].initiate_call().unwrap();
    fixture.peers[BOB].initiate_call().unwrap();
    fixture.tick(6);

    assert_eq!(fixture.peers[ALICE].call_state(), CallState::Connected);
    assert_eq!(fixture.peers[BOB].call_state(), CallState::Connected);
}

#[test]
fn test_reselect_starts_over() {
    let mut fixture = SessionFixture::named(&["Alice", "Bob"]);
    fixture.call(ALICE, BOB);
    fixture.play(ALICE, 0, 0);

    let bob = fixture.id(BOB);
    fixture.peers[ALICE].select_peer(&bob).unwrap();

    assert_eq!(fixture.peers[ALICE].call_state(), CallState::Idle);
    assert!(fixture.peers[ALICE].game().unwrap().local_moves().is_empty());
    fixture.peers[ALICE].initiate_call().unwrap();
    assert_eq!(fixture.peers[ALICE].call_state(), CallState::Offering);
}

#[test]
fn test_local_failure_recovers_on_reselect() {
    let relay = MemoryRelay::new();
    let mut alice = SessionOrchestrator::new(
        MemoryChannel::connect(&relay),
        SimulatedMediaTransport::new(IceServer::default_servers()).refusing_local_descriptions(),
        MoveRules::Open,
    );
    let mut bob = support::peer(&relay, MoveRules::Open);

    alice.assign_identity("Alice").unwrap();
    bob.assign_identity("Bob").unwrap();
    for _ in 0..3 {
        alice.poll();
        bob.poll();
    }

    let bob_id = bob.local_id().cloned().unwrap();
    alice.select_peer(&bob_id).unwrap();
    assert!(alice.initiate_call().is_err());
    assert_eq!(alice.call_state(), CallState::Failed);

    alice.select_peer(&bob_id).unwrap();
    assert_eq!(alice.call_state(), CallState::Idle);
}

#[test]
fn test_media_unavailable_is_reported() {
    let relay = MemoryRelay::new();
    let mut carol = SessionOrchestrator::new(
        MemoryChannel::connect(&relay),
        SimulatedMediaTransport::new(Vec::new()).without_media_devices(),
        MoveRules::Open,
    );

    carol.assign_identity("Carol").unwrap();

    assert!(carol
        .drain_events()
        .iter()
        .any(|e| matches!(e, SessionEvent::MediaUnavailable { .. })));
    assert!(carol.identity().is_some());
}

#[test]
fn test_channel_loss_resets_call() {
    let mut fixture = SessionFixture::named(&["Alice", "Bob"]);
    fixture.call(ALICE, BOB);
    fixture.take_events(ALICE);

    fixture.peers[ALICE].channel_mut().disconnect();
    fixture.tick(1);

    assert_eq!(fixture.peers[ALICE].call_state(), CallState::Idle);
    assert!(fixture.peers[ALICE].local_id().is_none());
    assert!(fixture
        .take_events(ALICE)
        .contains(&SessionEvent::ChannelLost));
}
