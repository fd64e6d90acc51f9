use crate::domain::IceServer;
use peerplay_core::MoveRules;

const SIGNALING_URL_ENV: &str = "PEERPLAY_SIGNALING_URL";
const STRICT_TURNS_ENV: &str = "PEERPLAY_STRICT_TURNS";

/// Configuration for a peer session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket endpoint of the signaling relay
    pub signaling_url: String,

    /// STUN/TURN servers handed to the media transport
    pub ice_servers: Vec<IceServer>,

    /// Move ordering enforced by the game
    pub move_rules: MoveRules,

    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signaling_url: "ws://127.0.0.1:3030/ws".to_string(),
            ice_servers: IceServer::default_servers(),
            move_rules: MoveRules::default(),
            poll_interval_ms: 100,
        }
    }
}

impl SessionConfig {
    pub fn new(signaling_url: impl Into<String>) -> Self {
        Self {
            signaling_url: signaling_url.into(),
            ..Default::default()
        }
    }

    /// Defaults overridden by `PEERPLAY_SIGNALING_URL` and `PEERPLAY_STRICT_TURNS`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(SIGNALING_URL_ENV) {
            config.signaling_url = url;
        }
        if let Ok(flag) = std::env::var(STRICT_TURNS_ENV) {
            if is_truthy(&flag) {
                config.move_rules = MoveRules::Alternating;
            }
        }
        config
    }

    pub fn with_ice_servers(mut self, servers: Vec<IceServer>) -> Self {
        self.ice_servers = servers;
        self
    }

    pub fn with_turn_server(
        mut self,
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        self.ice_servers
            .push(IceServer::turn(url, username, credential));
        self
    }

    pub fn with_move_rules(mut self, rules: MoveRules) -> Self {
        self.move_rules = rules;
        self
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
