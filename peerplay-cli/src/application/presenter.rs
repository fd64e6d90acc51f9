use peerplay_core::{GameSession, PresenceDirectory};
use peerplay_p2p::SessionEvent;

/// One human-readable line per session event
pub fn describe_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Connected { local_id } => format!("connected as {}", local_id),
        SessionEvent::PresenceChanged => "presence updated (type `users`)".to_string(),
        SessionEvent::CallStateChanged { state } => format!("call {}", state),
        SessionEvent::OpponentMoved { position } => format!("opponent played {}", position),
        SessionEvent::GameWon { winner } => format!("{} wins!", winner.name()),
        SessionEvent::MediaUnavailable { reason } => {
            format!("camera/microphone unavailable: {}", reason)
        }
        SessionEvent::RemoteMediaStarted { .. } => "remote video started".to_string(),
        SessionEvent::ChannelLost => "connection to the relay lost".to_string(),
    }
}

pub fn render_directory(directory: &PresenceDirectory) -> String {
    if directory.is_empty() {
        return "nobody else is online".to_string();
    }
    directory
        .peers()
        .enumerate()
        .map(|(i, peer)| format!("[{}] {} ({})", i, peer.name(), peer.id()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Board plus a status line
pub fn render_game(game: &GameSession) -> String {
    let status = match game.winner() {
        Some(winner) => format!("{} won", winner.name()),
        None if game.is_draw() => "draw".to_string(),
        None => format!(
            "{} (X) vs {} (O)",
            game.local().name(),
            game.opponent().name()
        ),
    };
    format!("{}{}", game.board(), status)
}
