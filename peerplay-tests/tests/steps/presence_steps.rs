use cucumber::{given, then, when};
use peerplay_p2p::SignalingChannel;
use peerplay_tests::SessionWorld;

// ===== Given Steps =====

#[given(expr = "{string} is online")]
async fn is_online(world: &mut SessionWorld, name: String) {
    world.join(&name);
}

#[given(expr = "{string} and {string} are online")]
async fn both_online(world: &mut SessionWorld, first: String, second: String) {
    world.join(&first);
    world.join(&second);
}

// ===== When Steps =====

#[when(expr = "{word} goes offline")]
async fn goes_offline(world: &mut SessionWorld, name: String) {
    world.peer_mut(&name).channel_mut().disconnect();
    world.tick(3);
}

// ===== Then Steps =====

#[then(expr = "{word} sees {int} peer(s) online")]
async fn sees_peer_count(world: &mut SessionWorld, name: String, count: usize) {
    let directory = world.peer(&name).directory();
    assert_eq!(directory.len(), count, "Directory of {}: {:?}", name, directory);
}

#[then(expr = "{word} sees {word} in the directory")]
async fn sees_in_directory(world: &mut SessionWorld, name: String, other: String) {
    let listed = world
        .peer(&name)
        .directory()
        .peers()
        .any(|identity| identity.name() == other);
    assert!(listed, "{} should see {}", name, other);
}

#[then(expr = "{word} is no longer connected")]
async fn no_longer_connected(world: &mut SessionWorld, name: String) {
    let peer = world.peer(&name);
    assert!(peer.local_id().is_none());
    assert!(peer.channel().local_peer_id().is_none());
}
