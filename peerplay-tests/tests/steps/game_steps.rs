use cucumber::{given, then, when};
use peerplay_core::{MoveRules, Position};
use peerplay_tests::SessionWorld;

// ===== Given Steps =====

#[given("strict turn rules")]
async fn strict_turn_rules(world: &mut SessionWorld) {
    world.rules = MoveRules::Alternating;
}

#[given(expr = "a fresh game between {string} and {string}")]
async fn fresh_game(world: &mut SessionWorld, local: String, opponent: String) {
    world.start_game(&local, &opponent);
}

// ===== When Steps =====

#[when(expr = "{word} claims cells {string}")]
async fn claims_cells(world: &mut SessionWorld, player: String, cells: String) {
    for cell in cells.split(',') {
        let index: usize = cell.trim().parse().expect("Cell index should be a number");
        let position = Position::from_index(index).expect("Cell index should be on the board");

        let result = {
            let game = world.game_mut();
            if game.local().name() == player {
                game.play_local(position)
            } else {
                game.receive_remote(position)
            }
        };
        world.record(result);
        if world.last_error.is_some() {
            break;
        }
    }
}

// ===== Then Steps =====

#[then(expr = "the winner is {string}")]
async fn winner_is(world: &mut SessionWorld, name: String) {
    let game = world.game.as_ref().expect("No game started");
    let winner = game.winner().map(|identity| identity.name().to_string());
    assert_eq!(winner, Some(name), "Unexpected winner");
}

#[then("there is no winner")]
async fn no_winner(world: &mut SessionWorld) {
    let game = world.game.as_ref().expect("No game started");
    assert!(
        game.winner().is_none(),
        "Expected no winner, got {:?}",
        game.winner()
    );
}

#[then(expr = "the last move failed with {string}")]
async fn last_move_failed(world: &mut SessionWorld, fragment: String) {
    let error = world.last_error.as_deref().unwrap_or_default();
    assert!(
        error.contains(&fragment),
        "Expected error containing '{}', got '{}'",
        fragment,
        error
    );
}

#[then(expr = "position {string} is cell {int}")]
async fn position_is_cell(_world: &mut SessionWorld, position: String, index: usize) {
    let position: Position = position.parse().expect("Position should parse");
    assert_eq!(position.index(), index);
}

#[then(expr = "position {string} is rejected")]
async fn position_rejected(_world: &mut SessionWorld, position: String) {
    assert!(
        position.parse::<Position>().is_err(),
        "Position '{}' should not parse",
        position
    );
}
