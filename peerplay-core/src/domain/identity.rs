use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier the relay assigns to a connected peer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier (relay side)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Errors that can occur when naming a peer
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IdentityError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name must be between 1 and 50 characters")]
    InvalidNameLength,
}

/// A reachable peer: relay-assigned id plus the display name its user chose
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    id: PeerId,
    name: String,
}

impl Identity {
    /// Create an identity, validating the display name
    pub fn new(id: PeerId, name: impl Into<String>) -> Result<Self, IdentityError> {
        let name = name.into();
        Self::validate_name(&name)?;
        Ok(Self { id, name })
    }

    /// Build an identity from data reported by the relay.
    ///
    /// Remote names are displayed as-is; only locally chosen names are validated.
    pub fn from_remote(id: PeerId, name: String) -> Self {
        Self { id, name }
    }

    fn validate_name(name: &str) -> Result<(), IdentityError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::EmptyName);
        }

        if trimmed.chars().count() > 50 {
            return Err(IdentityError::InvalidNameLength);
        }

        Ok(())
    }

    pub fn id(&self) -> &PeerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
