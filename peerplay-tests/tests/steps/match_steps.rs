use cucumber::{then, when};
use peerplay_core::{Cell, Position};
use peerplay_p2p::SessionEvent;
use peerplay_tests::SessionWorld;

// ===== When Steps =====

#[when(expr = "{word} selects {word}")]
async fn selects(world: &mut SessionWorld, name: String, target: String) {
    let id = world.id(&target);
    let result = world.peer_mut(&name).select_peer(&id);
    world.record(result);
}

#[when(expr = "{word} calls")]
async fn calls(world: &mut SessionWorld, name: String) {
    let result = world.peer_mut(&name).initiate_call();
    world.record(result);
    world.tick(6);
}

#[when(expr = "{word} and {word} call each other at once")]
async fn call_each_other(world: &mut SessionWorld, first: String, second: String) {
    let first_id = world.id(&first);
    let second_id = world.id(&second);

    world
        .peer_mut(&first)
        .select_peer(&second_id)
        .expect("First peer should select the second");
    world
        .peer_mut(&second)
        .select_peer(&first_id)
        .expect("Second peer should select the first");
    world
        .peer_mut(&first)
        .initiate_call()
        .expect("First call should start");
    world
        .peer_mut(&second)
        .initiate_call()
        .expect("Second call should start");

    world.tick(8);
}

#[when(expr = "{word} plays {string}")]
async fn plays(world: &mut SessionWorld, name: String, position: String) {
    let position: Position = position.parse().expect("Position should parse");
    let result = world
        .peer_mut(&name)
        .play_local(position.row(), position.col());
    world.record(result);
    world.tick(2);
}

// ===== Then Steps =====

#[then(expr = "the call state of {word} is {word}")]
async fn call_state_is(world: &mut SessionWorld, name: String, state: String) {
    assert_eq!(world.peer(&name).call_state().to_string(), state);
}

#[then(expr = "{word} applied {int} remote candidates")]
async fn applied_candidates(world: &mut SessionWorld, name: String, count: usize) {
    let applied = world
        .peer(&name)
        .controller()
        .transport()
        .applied_candidates()
        .len();
    assert_eq!(applied, count);
}

#[then(expr = "{word} sees {word} as the winner")]
async fn sees_winner(world: &mut SessionWorld, name: String, winner: String) {
    let game = world.peer(&name).game().expect("No game in progress");
    let actual = game.winner().map(|identity| identity.name().to_string());
    assert_eq!(actual, Some(winner));
}

#[then(expr = "{word} has no winner yet")]
async fn no_winner_yet(world: &mut SessionWorld, name: String) {
    let game = world.peer(&name).game().expect("No game in progress");
    assert!(game.winner().is_none());
}

#[then(expr = "{word} was told about {int} win(s)")]
async fn told_about_wins(world: &mut SessionWorld, name: String, count: usize) {
    let wins = world
        .events_of(&name)
        .iter()
        .filter(|event| matches!(event, SessionEvent::GameWon { .. }))
        .count();
    assert_eq!(wins, count);
}

#[then(expr = "{word} sees cell {string} taken by the opponent")]
async fn sees_opponent_cell(world: &mut SessionWorld, name: String, position: String) {
    let position: Position = position.parse().expect("Position should parse");
    let game = world.peer(&name).game().expect("No game in progress");
    assert_eq!(game.board().cell(position), Cell::Opponent);
}

#[then(expr = "the last action failed with {string}")]
async fn last_action_failed(world: &mut SessionWorld, fragment: String) {
    let error = world.last_error.as_deref().unwrap_or_default();
    assert!(
        error.contains(&fragment),
        "Expected error containing '{}', got '{}'",
        fragment,
        error
    );
}

#[then("the last action succeeded")]
async fn last_action_succeeded(world: &mut SessionWorld) {
    assert_eq!(world.last_error, None);
}
