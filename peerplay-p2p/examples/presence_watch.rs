use peerplay_p2p::{
    SessionConfig, SessionEvent, SessionOrchestrator, SimulatedMediaTransport, WsChannel,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "Watcher".to_string());
    let config = SessionConfig::from_env();

    let channel = WsChannel::connect(&config.signaling_url).await?;
    let transport = SimulatedMediaTransport::new(config.ice_servers.clone());
    let mut session = SessionOrchestrator::new(channel, transport, config.move_rules);

    session.assign_identity(&name)?;
    println!("Joined as {}", name);

    let mut interval = tokio::time::interval(Duration::from_millis(config.poll_interval_ms));
    loop {
        interval.tick().await;
        session.poll();

        for event in session.drain_events() {
            match event {
                SessionEvent::PresenceChanged => {
                    let names: Vec<&str> = session.directory().peers().map(|p| p.name()).collect();
                    println!("Online: {}", names.join(", "));
                }
                SessionEvent::ChannelLost => return Ok(()),
                other => println!("{:?}", other),
            }
        }
    }
}
