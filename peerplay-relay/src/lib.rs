pub mod error;
pub mod state;
pub mod ws_handler;

pub use error::{RelayError, Result};
pub use state::RelayState;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

/// Router exposing the relay at `/ws`
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler::ws_handler))
        .with_state(state)
}

/// Bind `addr` and serve until the process stops
pub async fn run(addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RelayError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    serve(listener, RelayState::new()).await
}

pub async fn serve(listener: TcpListener, state: RelayState) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Relay listening on ws://{}/ws", addr);
    }
    axum::serve(listener, router(state)).await?;
    Ok(())
}
