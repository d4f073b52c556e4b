//! Quick match demo.
//!
//! Runs two local actors against the loopback service: one hosts a
//! "Custom" session, the other finds it and joins, then both close.
//!
//! ```text
//! cargo run -p quickmatch [-- path/to/matchforge.json]
//! RUST_LOG=debug cargo run -p quickmatch
//! ```

use matchforge::prelude::*;
use matchforge::telemetry;

#[tokio::main]
async fn main() -> Result<(), MatchforgeError> {
    telemetry::init_tracing(telemetry::DEFAULT_FILTER);

    let config = match std::env::args().nth(1) {
        Some(path) => MatchforgeConfig::from_path(path)?,
        None => MatchforgeConfig {
            loopback: LoopbackConfig {
                latency_ms: 50,
                ..LoopbackConfig::default()
            },
            ..MatchforgeConfig::default()
        },
    };
    let matchforge = Matchforge::builder().config(config).loopback()?;

    let host = matchforge.spawn_actor();
    let guest = matchforge.spawn_actor();
    let mut host_events = host.coordinator.subscribe();

    let host_id = host.coordinator.login(ActorSlot(0)).await?.await?;
    let guest_id = guest.coordinator.login(ActorSlot(0)).await?.await?;
    tracing::info!(%host_id, %guest_id, "both actors logged in");

    let descriptor = SessionDescriptor::default()
        .with_public_slots(4)
        .with_attribute("mode", "Custom");
    let hosted = host.coordinator.host(descriptor).await?.await?;
    tracing::info!(handle = %hosted.handle, "session hosted");

    let query = SessionSearchQuery::new()
        .with("mode", "Custom")
        .presence(true)
        .lobbies(true);
    match guest.coordinator.discover_and_join(query).await? {
        Some(connection) => tracing::info!(%connection, "guest joined"),
        None => tracing::warn!("no session found"),
    }
    tracing::info!(
        travels = guest.collaborators.transport.travels().len(),
        "guest travel log"
    );

    guest.coordinator.close().await?;
    host.coordinator.close().await?;

    while let Ok(event) = host_events.try_recv() {
        if let CoordinatorEvent::SceneTransition { scene, listen, .. } = event {
            tracing::info!(%scene, listen, "host scene transition");
        }
    }

    host.coordinator.shutdown().await?;
    guest.coordinator.shutdown().await?;
    Ok(())
}
