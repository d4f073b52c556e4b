//! End-to-end matchmaking over the loopback service.

use std::time::Duration;

use matchforge::prelude::*;

fn custom_query() -> SessionSearchQuery {
    SessionSearchQuery::new()
        .with("mode", "Custom")
        .presence(true)
        .lobbies(true)
}

async fn login(coordinator: &CoordinatorHandle) -> ActorIdentity {
    coordinator
        .login(ActorSlot(0))
        .await
        .unwrap()
        .await
        .unwrap()
}

// =========================================================================
// Host, discover, join, close
// =========================================================================

#[tokio::test]
async fn test_hosted_session_is_discovered_and_joined() {
    let matchforge = Matchforge::builder().loopback().unwrap();
    let host = matchforge.spawn_actor();
    let guest = matchforge.spawn_actor();
    let host_id = login(&host.coordinator).await;
    login(&guest.coordinator).await;

    let descriptor = SessionDescriptor::default()
        .with_public_slots(4)
        .with_attribute("mode", "Custom");
    let hosted = host
        .coordinator
        .host(descriptor)
        .await
        .unwrap()
        .await
        .unwrap();

    let found = guest
        .coordinator
        .discover(custom_query())
        .await
        .unwrap()
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    let entry = found.first().unwrap();
    assert_eq!(entry.handle, hosted.handle);
    assert_eq!(entry.host, host_id);
    assert_eq!(entry.open_public_slots, 4);

    let connection = guest
        .coordinator
        .join_first(&found)
        .await
        .unwrap()
        .await
        .unwrap();

    assert_eq!(
        connection,
        ConnectionDescriptor::new(format!("loopback://{}", hosted.handle))
    );
    assert_eq!(guest.collaborators.transport.travels(), vec![connection]);
    assert!(host.collaborators.transport.travels().is_empty());
    assert_eq!(
        guest.coordinator.state().await.unwrap(),
        CoordinatorState::Connected
    );
}

#[tokio::test]
async fn test_guest_close_leaves_host_session_running() {
    let matchforge = Matchforge::builder().loopback().unwrap();
    let online = matchforge.loopback_service().unwrap().clone();
    let host = matchforge.spawn();
    let guest = matchforge.spawn();
    login(&host).await;
    login(&guest).await;
    let hosted = host
        .host(SessionDescriptor::default().with_attribute("mode", "Custom"))
        .await
        .unwrap()
        .await
        .unwrap();
    guest.discover_and_join(custom_query()).await.unwrap().unwrap();
    assert_eq!(online.members(&hosted.handle).unwrap().len(), 1);

    guest.close().await.unwrap();

    assert_eq!(online.session_count(), 1);
    assert_eq!(online.members(&hosted.handle), Some(Vec::new()));

    host.close().await.unwrap();
    assert_eq!(online.session_count(), 0);
    assert_eq!(host.state().await.unwrap(), CoordinatorState::Authenticated);
}

#[tokio::test]
async fn test_scene_events_follow_host_and_close() {
    let matchforge = Matchforge::builder().loopback().unwrap();
    let host = matchforge.spawn();
    login(&host).await;
    let mut events = host.subscribe();

    host.host(SessionDescriptor::default())
        .await
        .unwrap()
        .await
        .unwrap();
    host.close().await.unwrap();

    let mut scenes = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CoordinatorEvent::SceneTransition { scene, listen, .. } = event {
            scenes.push((scene, listen));
        }
    }
    assert_eq!(
        scenes,
        vec![("session".to_string(), true), ("menu".to_string(), false)]
    );
}

// =========================================================================
// Failure paths
// =========================================================================

#[tokio::test]
async fn test_zero_results_then_join_is_invalid_session() {
    let matchforge = Matchforge::builder().loopback().unwrap();
    let guest = matchforge.spawn();
    login(&guest).await;

    let found = guest
        .discover(custom_query())
        .await
        .unwrap()
        .await
        .unwrap();
    assert!(found.is_empty());

    let err = guest.join_first(&found).await.unwrap_err();
    assert!(matches!(err, CoordinatorError::InvalidSession(_)));
    assert_eq!(
        guest.state().await.unwrap(),
        CoordinatorState::Authenticated
    );
}

#[tokio::test]
async fn test_join_with_other_actors_result_is_invalid_session() {
    let matchforge = Matchforge::builder().loopback().unwrap();
    let host = matchforge.spawn();
    let early = matchforge.spawn();
    let late = matchforge.spawn();
    for c in [&host, &early, &late] {
        login(c).await;
    }

    // Nothing hosted yet: the early actor's result is empty.
    let empty = early.discover(custom_query()).await.unwrap().await.unwrap();
    host.host(SessionDescriptor::default().with_attribute("mode", "Custom"))
        .await
        .unwrap()
        .await
        .unwrap();
    let found = late.discover(custom_query()).await.unwrap().await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(empty.generation, found.generation);

    let err = late.join(&empty, Some(0)).await.unwrap_err();

    assert!(matches!(err, CoordinatorError::InvalidSession(_)));
    assert_eq!(late.state().await.unwrap(), CoordinatorState::Authenticated);
}

#[tokio::test]
async fn test_host_over_session_limit_rejected_synchronously() {
    let config = MatchforgeConfig::from_json_str(r#"{ "loopback": { "max_sessions": 1 } }"#).unwrap();
    let matchforge = Matchforge::builder().config(config).loopback().unwrap();
    let first = matchforge.spawn();
    let second = matchforge.spawn();
    login(&first).await;
    login(&second).await;
    first
        .host(SessionDescriptor::default())
        .await
        .unwrap()
        .await
        .unwrap();

    let err = second.host(SessionDescriptor::default()).await.unwrap_err();

    assert!(matches!(err, CoordinatorError::HostRejected(_)));
    assert_eq!(
        second.state().await.unwrap(),
        CoordinatorState::Authenticated
    );
}

#[tokio::test]
async fn test_full_session_join_rejected() {
    let matchforge = Matchforge::builder().loopback().unwrap();
    let host = matchforge.spawn();
    let first = matchforge.spawn();
    let late = matchforge.spawn();
    for c in [&host, &first, &late] {
        login(c).await;
    }
    host.host(
        SessionDescriptor::default()
            .with_public_slots(1)
            .with_attribute("mode", "Custom"),
    )
    .await
    .unwrap()
    .await
    .unwrap();

    // Both discover while the slot is still open.
    let seen_by_first = first.discover(custom_query()).await.unwrap().await.unwrap();
    let seen_by_late = late.discover(custom_query()).await.unwrap().await.unwrap();
    first.join_first(&seen_by_first).await.unwrap().await.unwrap();

    let err = late
        .join_first(&seen_by_late)
        .await
        .unwrap()
        .await
        .unwrap_err();

    assert!(matches!(err, CoordinatorError::JoinRejected(_)));
    assert_eq!(late.state().await.unwrap(), CoordinatorState::Authenticated);
}

#[tokio::test]
async fn test_offline_service_login_is_identity_unavailable() {
    let matchforge = Matchforge::builder().loopback().unwrap();
    matchforge.loopback_service().unwrap().set_reachable(false);
    let actor = matchforge.spawn();

    let err = actor.login(ActorSlot(0)).await.unwrap_err();

    assert!(matches!(err, CoordinatorError::IdentityUnavailable(_)));
    let err: MatchforgeError = err.into();
    assert!(matches!(err, MatchforgeError::Coordinator(_)));
}

// =========================================================================
// Latency
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_latency_keeps_operations_in_flight() {
    let config = MatchforgeConfig::from_json_str(r#"{ "loopback": { "latency_ms": 250 } }"#).unwrap();
    let matchforge = Matchforge::builder().config(config).loopback().unwrap();
    let actor = matchforge.spawn();

    let mut pending = actor.login(ActorSlot(0)).await.unwrap();
    assert!(pending.try_outcome().is_none());
    assert_eq!(actor.state().await.unwrap(), CoordinatorState::Authenticating);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let identity = pending.await.unwrap();
    assert!(identity.as_str().starts_with("account-"));
    assert_eq!(actor.state().await.unwrap(), CoordinatorState::Authenticated);
}

// =========================================================================
// Logout
// =========================================================================

#[tokio::test]
async fn test_logout_while_hosting_destroys_session() {
    let matchforge = Matchforge::builder().loopback().unwrap();
    let online = matchforge.loopback_service().unwrap().clone();
    let host = matchforge.spawn_actor();
    login(&host.coordinator).await;
    host.coordinator
        .host(SessionDescriptor::default())
        .await
        .unwrap()
        .await
        .unwrap();

    host.coordinator.logout().await.unwrap();

    assert_eq!(online.session_count(), 0);
    assert_eq!(
        host.collaborators.identity.current_status(ActorSlot(0)),
        LoginStatus::LoggedOut
    );
    let snapshot = host.coordinator.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CoordinatorState::Unauthenticated);
    assert!(snapshot.identity.is_none());
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test]
async fn test_shutdown_while_hosting_withdraws_session() {
    let matchforge = Matchforge::builder().loopback().unwrap();
    let online = matchforge.loopback_service().unwrap().clone();
    let host = matchforge.spawn();
    let guest = matchforge.spawn();
    login(&host).await;
    login(&guest).await;
    host.host(SessionDescriptor::default().with_attribute("mode", "Custom"))
        .await
        .unwrap()
        .await
        .unwrap();
    assert_eq!(online.session_count(), 1);

    host.shutdown().await.unwrap();

    assert_eq!(online.session_count(), 0);
    assert_eq!(guest.discover_and_join(custom_query()).await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_create_leaves_no_session() {
    let config = MatchforgeConfig::from_json_str(r#"{ "loopback": { "latency_ms": 250 } }"#).unwrap();
    let matchforge = Matchforge::builder().config(config).loopback().unwrap();
    let online = matchforge.loopback_service().unwrap().clone();
    let host = matchforge.spawn();
    let login_pending = host.login(ActorSlot(0)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    login_pending.await.unwrap();

    let pending = host.host(SessionDescriptor::default()).await.unwrap();
    host.shutdown().await.unwrap();

    assert_eq!(pending.await.unwrap_err(), CoordinatorError::Unavailable);
    assert_eq!(online.session_count(), 0);
}
