pub mod channel;
pub mod error;
pub mod memory;
pub mod simulated;
pub mod transport;
#[cfg(feature = "native")]
pub mod websocket;

pub use channel::{ChannelEvent, SignalingChannel};
pub use memory::{MemoryChannel, MemoryRelay};
pub use simulated::SimulatedMediaTransport;
pub use transport::{MediaTransport, TransportEvent};
#[cfg(feature = "native")]
pub use websocket::WsChannel;
