use serde::{Deserialize, Serialize};

/// STUN/TURN server handed to the media transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServer {
    /// Server URLs (several for failover)
    pub urls: Vec<String>,
    /// Required for TURN
    pub username: Option<String>,
    /// Required for TURN
    pub credential: Option<String>,
}

impl IceServer {
    pub fn stun(url: impl Into<String>) -> Self {
        Self::from_urls(vec![url.into()])
    }

    pub fn turn(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self::stun(url).with_auth(username, credential)
    }

    pub fn from_urls(urls: Vec<String>) -> Self {
        Self {
            urls,
            username: None,
            credential: None,
        }
    }

    pub fn with_auth(mut self, username: impl Into<String>, credential: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.credential = Some(credential.into());
        self
    }

    /// True when any URL uses the `turn:`/`turns:` scheme
    pub fn is_relay(&self) -> bool {
        self.urls
            .iter()
            .any(|url| url.starts_with("turn:") || url.starts_with("turns:"))
    }

    /// Public Google STUN pair used when nothing is configured
    pub fn default_servers() -> Vec<Self> {
        vec![Self::from_urls(vec![
            "stun:stun1.l.google.com:19302".to_string(),
            "stun:stun2.l.google.com:19302".to_string(),
        ])]
    }
}
