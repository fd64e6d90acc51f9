mod config;
mod controller;
mod events;
mod orchestrator;

pub use config::SessionConfig;
pub use controller::{CandidateDisposition, PeerSessionController};
pub use events::SessionEvent;
pub use orchestrator::SessionOrchestrator;
