//! Coordinator actor: an isolated Tokio task that owns one actor's session
//! lifecycle.
//!
//! The actor receives operations through an mpsc channel and answers each
//! one right away: either with an error (precondition failed) or with a
//! [`Completion`] for the request it just issued. Collaborator requests run
//! in their own tasks and post their outcome back to the actor, which is
//! the only place state transitions and registry writes happen.

use std::sync::Arc;

use matchforge_services::{
    IdentityGateway, ServiceError, SessionBackend, TransportBridge,
};
use matchforge_types::{
    ActorIdentity, ActorSlot, ConnectionDescriptor, SessionDescriptor,
    SessionHandle, SessionSearchEntry, SessionSearchQuery, SessionSearchResult,
};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::completion::Responder;
use crate::handle::{CoordinatorHandle, CoordinatorSnapshot};
use crate::registry::SessionRegistry;
use crate::{
    ActiveConnection, Completion, CoordinatorConfig, CoordinatorError,
    CoordinatorEvent, CoordinatorState, HostPhase, HostedSession,
};

/// Reply channel for an operation: the immediate accept/reject.
pub(crate) type Reply<T> = oneshot::Sender<Result<T, CoordinatorError>>;

/// Operations sent to a coordinator actor through its channel.
pub(crate) enum Command {
    Login {
        slot: ActorSlot,
        reply: Reply<Completion<ActorIdentity>>,
    },
    Logout {
        reply: Reply<()>,
    },
    Host {
        descriptor: SessionDescriptor,
        reply: Reply<Completion<HostedSession>>,
    },
    Discover {
        query: SessionSearchQuery,
        reply: Reply<Completion<SessionSearchResult>>,
    },
    Join {
        result: SessionSearchResult,
        index: Option<usize>,
        reply: Reply<Completion<ConnectionDescriptor>>,
    },
    Close {
        reply: Reply<()>,
    },
    Snapshot {
        reply: oneshot::Sender<CoordinatorSnapshot>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// A finished collaborator request, posted back into the actor.
enum Outcome {
    Login {
        result: Result<ActorIdentity, ServiceError>,
        done: Responder<ActorIdentity>,
    },
    Host {
        descriptor: SessionDescriptor,
        result: Result<SessionHandle, ServiceError>,
        done: Responder<HostedSession>,
    },
    Discover {
        generation: u64,
        query: SessionSearchQuery,
        result: Result<Vec<SessionSearchEntry>, ServiceError>,
        done: Responder<SessionSearchResult>,
    },
    Join {
        handle: SessionHandle,
        result: Result<(), ServiceError>,
        done: Responder<ConnectionDescriptor>,
    },
}

/// The collaborators a coordinator drives.
///
/// Each is shared behind an `Arc`, so several coordinators (one per local
/// actor) can talk to the same backend.
pub struct Collaborators<I, S, T> {
    /// Logs actors in and out of the online service.
    pub identity: Arc<I>,
    /// Creates, finds, joins and destroys sessions.
    pub sessions: Arc<S>,
    /// Moves the actor to a joined session's connection.
    pub transport: Arc<T>,
}

impl<I, S, T> Clone for Collaborators<I, S, T> {
    fn clone(&self) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            sessions: Arc::clone(&self.sessions),
            transport: Arc::clone(&self.transport),
        }
    }
}

/// The internal coordinator state. Runs inside a Tokio task.
struct CoordinatorActor<I, S, T> {
    slot: ActorSlot,
    state: CoordinatorState,
    identity: Option<ActorIdentity>,
    registry: SessionRegistry,
    config: CoordinatorConfig,
    collaborators: Collaborators<I, S, T>,
    receiver: mpsc::Receiver<Command>,
    outcomes_tx: mpsc::UnboundedSender<Outcome>,
    outcomes_rx: mpsc::UnboundedReceiver<Outcome>,
    events: broadcast::Sender<CoordinatorEvent>,
}

impl<I, S, T> CoordinatorActor<I, S, T>
where
    I: IdentityGateway,
    S: SessionBackend,
    T: TransportBridge,
{
    /// Runs the actor loop until shutdown or until every handle is gone.
    ///
    /// Outcomes are drained before commands so a completed request is
    /// always applied before the next operation is judged against the
    /// state.
    async fn run(mut self) {
        tracing::info!(slot = %self.slot, "coordinator started");

        let stopped = loop {
            tokio::select! {
                biased;

                Some(outcome) = self.outcomes_rx.recv() => {
                    self.handle_outcome(outcome);
                }
                cmd = self.receiver.recv() => match cmd {
                    Some(Command::Shutdown { reply }) => break Some(reply),
                    None => break None,
                    Some(cmd) => self.handle_command(cmd),
                },
            }
        };

        self.stop().await;
        tracing::info!(slot = %self.slot, state = %self.state, "coordinator stopped");
        if let Some(reply) = stopped {
            let _ = reply.send(());
        }
    }

    /// Leaves the online service clean before the task ends.
    ///
    /// Refuses further commands, waits for the request in flight (if any)
    /// and undoes it, then tears down any hosted or joined session so
    /// nothing stays advertised.
    async fn stop(&mut self) {
        self.receiver.close();

        if self.state.is_busy() {
            // Without our own sender, a request task that panicked ends
            // the wait instead of hanging it.
            self.outcomes_tx = mpsc::unbounded_channel().0;
            match self.outcomes_rx.recv().await {
                Some(outcome) => self.abandon(outcome),
                None => self.transition(self.idle_state()),
            }
        }

        if self.state.has_session() {
            self.teardown();
        }
    }

    /// Handles an outcome that arrived after shutdown.
    ///
    /// Anything the request created is released again. The responder is
    /// dropped, so the caller's completion resolves to `Unavailable`.
    fn abandon(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Login { result: Ok(_), .. } if self.identity.is_none() => {
                tracing::info!(slot = %self.slot, "login finished during shutdown, logging out");
                self.collaborators.identity.logout(self.slot);
            }
            Outcome::Host {
                result: Ok(handle), ..
            } => {
                tracing::info!(slot = %self.slot, %handle, "session created during shutdown, destroying");
                self.collaborators.sessions.destroy(&handle);
            }
            Outcome::Join {
                handle,
                result: Ok(()),
                ..
            } => {
                tracing::info!(slot = %self.slot, %handle, "joined during shutdown, leaving");
                self.collaborators.sessions.destroy(&handle);
            }
            _ => {}
        }
        self.transition(self.idle_state());
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Login { slot, reply } => {
                let _ = reply.send(self.begin_login(slot));
            }
            Command::Logout { reply } => {
                let _ = reply.send(self.logout());
            }
            Command::Host { descriptor, reply } => {
                let _ = reply.send(self.begin_host(descriptor));
            }
            Command::Discover { query, reply } => {
                let _ = reply.send(self.begin_discover(query));
            }
            Command::Join {
                result,
                index,
                reply,
            } => {
                let _ = reply.send(self.begin_join(&result, index));
            }
            Command::Close { reply } => {
                let _ = reply.send(self.close());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown { .. } => {}
        }
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Login { result, done } => self.finish_login(result, done),
            Outcome::Host {
                descriptor,
                result,
                done,
            } => self.finish_host(descriptor, result, done),
            Outcome::Discover {
                generation,
                query,
                result,
                done,
            } => self.finish_discover(generation, query, result, done),
            Outcome::Join {
                handle,
                result,
                done,
            } => self.finish_join(handle, result, done),
        }
    }

    // -- Login ------------------------------------------------------------

    fn begin_login(
        &mut self,
        slot: ActorSlot,
    ) -> Result<Completion<ActorIdentity>, CoordinatorError> {
        self.ensure_not_busy()?;

        if let Some(identity) = &self.identity {
            if slot != self.slot {
                return Err(CoordinatorError::SlotMismatch {
                    bound: self.slot,
                    requested: slot,
                });
            }
            let refresh = self.config.refresh_identity_on_login && self.state.is_ready();
            if !refresh {
                let status = self.collaborators.identity.current_status(slot);
                tracing::info!(
                    %slot,
                    %identity,
                    %status,
                    "already logged in, skipping login"
                );
                return Ok(Completion::ready(Ok(identity.clone())));
            }
        }

        if !self.collaborators.identity.is_reachable() {
            tracing::warn!(%slot, "identity gateway unreachable");
            return Err(CoordinatorError::IdentityUnavailable(
                "identity gateway is not reachable".into(),
            ));
        }

        self.slot = slot;
        self.transition(CoordinatorState::Authenticating);

        let (done, completion) = Completion::channel();
        let identity = Arc::clone(&self.collaborators.identity);
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = identity.login(slot).await;
            let _ = outcomes.send(Outcome::Login { result, done });
        });

        tracing::debug!(%slot, "login requested");
        Ok(completion)
    }

    fn finish_login(
        &mut self,
        result: Result<ActorIdentity, ServiceError>,
        done: Responder<ActorIdentity>,
    ) {
        match result {
            Ok(identity) => {
                self.identity = Some(identity.clone());
                self.transition(CoordinatorState::Authenticated);
                tracing::info!(slot = %self.slot, %identity, "login complete");
                self.emit(CoordinatorEvent::IdentityBound {
                    slot: self.slot,
                    identity: identity.clone(),
                });
                let _ = done.send(Ok(identity));
            }
            Err(e) => {
                // A failed refresh keeps the identity it started with.
                self.transition(self.idle_state());
                tracing::warn!(slot = %self.slot, error = %e, "login failed");
                let err = match e {
                    ServiceError::Unavailable(reason) => {
                        CoordinatorError::IdentityUnavailable(reason)
                    }
                    ServiceError::Rejected(reason) => CoordinatorError::AuthRejected(reason),
                };
                let _ = done.send(Err(err));
            }
        }
    }

    fn logout(&mut self) -> Result<(), CoordinatorError> {
        self.ensure_not_busy()?;
        if self.state == CoordinatorState::Unauthenticated {
            return Ok(());
        }
        if self.state.has_session() {
            self.teardown();
        }

        self.collaborators.identity.logout(self.slot);
        self.identity = None;
        self.registry.clear_search_results();
        self.transition(CoordinatorState::Unauthenticated);
        tracing::info!(slot = %self.slot, "logged out");
        self.emit(CoordinatorEvent::IdentityCleared { slot: self.slot });
        Ok(())
    }

    // -- Host -------------------------------------------------------------

    fn begin_host(
        &mut self,
        descriptor: SessionDescriptor,
    ) -> Result<Completion<HostedSession>, CoordinatorError> {
        let identity = self.ensure_ready()?;

        let pending = match self.collaborators.sessions.create(&identity, &descriptor) {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!(slot = %self.slot, error = %e, "create session rejected");
                return Err(CoordinatorError::HostRejected(e.reason().to_string()));
            }
        };

        self.transition(CoordinatorState::Hosting(HostPhase::Pending));

        let (done, completion) = Completion::channel();
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = pending.await;
            let _ = outcomes.send(Outcome::Host {
                descriptor,
                result,
                done,
            });
        });

        tracing::debug!(slot = %self.slot, "create session accepted");
        Ok(completion)
    }

    fn finish_host(
        &mut self,
        descriptor: SessionDescriptor,
        result: Result<SessionHandle, ServiceError>,
        done: Responder<HostedSession>,
    ) {
        match result {
            Ok(handle) => {
                let hosted = HostedSession { handle, descriptor };
                self.registry.set_hosted_session(hosted.clone());
                self.transition(CoordinatorState::Hosting(HostPhase::Active));
                tracing::info!(slot = %self.slot, handle = %hosted.handle, "hosting session");
                self.emit(CoordinatorEvent::SceneTransition {
                    slot: self.slot,
                    scene: self.config.session_scene.clone(),
                    listen: true,
                });
                let _ = done.send(Ok(hosted));
            }
            Err(e) => {
                self.transition(CoordinatorState::Authenticated);
                tracing::warn!(slot = %self.slot, error = %e, "create session failed");
                let _ = done.send(Err(CoordinatorError::HostRejected(
                    e.reason().to_string(),
                )));
            }
        }
    }

    // -- Discover ---------------------------------------------------------

    fn begin_discover(
        &mut self,
        query: SessionSearchQuery,
    ) -> Result<Completion<SessionSearchResult>, CoordinatorError> {
        self.ensure_ready()?;

        let generation = self.registry.begin_search();
        self.transition(CoordinatorState::Discovering);

        let (done, completion) = Completion::channel();
        let sessions = Arc::clone(&self.collaborators.sessions);
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = sessions.find(&query).await;
            let _ = outcomes.send(Outcome::Discover {
                generation,
                query,
                result,
                done,
            });
        });

        tracing::debug!(slot = %self.slot, generation, "discovery requested");
        Ok(completion)
    }

    fn finish_discover(
        &mut self,
        generation: u64,
        query: SessionSearchQuery,
        result: Result<Vec<SessionSearchEntry>, ServiceError>,
        done: Responder<SessionSearchResult>,
    ) {
        self.transition(CoordinatorState::Authenticated);
        match result {
            Ok(mut entries) => {
                entries.truncate(query.max_results);
                let found = SessionSearchResult::new(generation, query, entries);
                if found.is_empty() {
                    tracing::info!(slot = %self.slot, "discovery found no sessions");
                } else {
                    tracing::info!(
                        slot = %self.slot,
                        count = found.len(),
                        "discovery complete"
                    );
                }
                self.registry.set_search_results(found.clone());
                let _ = done.send(Ok(found));
            }
            Err(e) => {
                tracing::warn!(slot = %self.slot, error = %e, "discovery failed");
                let _ = done.send(Err(CoordinatorError::DiscoveryError(
                    e.reason().to_string(),
                )));
            }
        }
    }

    // -- Join -------------------------------------------------------------

    fn begin_join(
        &mut self,
        result: &SessionSearchResult,
        index: Option<usize>,
    ) -> Result<Completion<ConnectionDescriptor>, CoordinatorError> {
        let identity = self.ensure_ready()?;

        if !self.registry.is_current(result) {
            tracing::debug!(
                slot = %self.slot,
                generation = result.generation,
                "join with a result this coordinator does not hold"
            );
            return Err(CoordinatorError::InvalidSession(
                "search result is missing or superseded".into(),
            ));
        }
        let index = index.unwrap_or(0);
        let entry = result.get(index).ok_or_else(|| {
            CoordinatorError::InvalidSession(format!(
                "index {index} out of range ({} results)",
                result.len()
            ))
        })?;
        if !entry.is_joinable() {
            return Err(CoordinatorError::InvalidSession(format!(
                "session {} has no resolvable connection",
                entry.handle
            )));
        }
        let handle = entry.handle.clone();

        self.transition(CoordinatorState::Joining);

        let (done, completion) = Completion::channel();
        let sessions = Arc::clone(&self.collaborators.sessions);
        let outcomes = self.outcomes_tx.clone();
        tracing::debug!(slot = %self.slot, %handle, index, "join requested");
        tokio::spawn(async move {
            let result = sessions.join(&identity, &handle).await;
            let _ = outcomes.send(Outcome::Join {
                handle,
                result,
                done,
            });
        });

        Ok(completion)
    }

    fn finish_join(
        &mut self,
        handle: SessionHandle,
        result: Result<(), ServiceError>,
        done: Responder<ConnectionDescriptor>,
    ) {
        if let Err(e) = result {
            self.transition(CoordinatorState::Authenticated);
            tracing::warn!(slot = %self.slot, %handle, error = %e, "join failed");
            let _ = done.send(Err(CoordinatorError::JoinRejected(
                e.reason().to_string(),
            )));
            return;
        }

        let Some(connection) = self.collaborators.sessions.resolve_connection(&handle) else {
            // Joined but unreachable: leave again rather than hold a
            // membership nobody can travel to.
            self.collaborators.sessions.destroy(&handle);
            self.transition(CoordinatorState::Authenticated);
            tracing::warn!(slot = %self.slot, %handle, "joined session has no connection");
            let _ = done.send(Err(CoordinatorError::JoinRejected(format!(
                "session {handle} could not be resolved"
            ))));
            return;
        };

        self.registry.set_active_connection(ActiveConnection {
            handle: handle.clone(),
            connection: connection.clone(),
        });
        self.transition(CoordinatorState::Connected);
        tracing::info!(slot = %self.slot, %handle, %connection, "travelling to session");
        self.collaborators.transport.travel(connection.clone());
        let _ = done.send(Ok(connection));
    }

    // -- Close ------------------------------------------------------------

    fn close(&mut self) -> Result<(), CoordinatorError> {
        self.ensure_not_busy()?;
        if !self.state.has_session() {
            tracing::debug!(slot = %self.slot, state = %self.state, "nothing to close");
            return Ok(());
        }
        self.teardown();
        Ok(())
    }

    /// Destroys the hosted or joined session and returns to the menu.
    fn teardown(&mut self) {
        self.transition(CoordinatorState::Closing);

        if let Some(hosted) = self.registry.clear_hosted_session() {
            tracing::info!(slot = %self.slot, handle = %hosted.handle, "destroying hosted session");
            self.collaborators.sessions.destroy(&hosted.handle);
        }
        if let Some(active) = self.registry.clear_active_connection() {
            tracing::info!(slot = %self.slot, handle = %active.handle, "leaving joined session");
            self.collaborators.sessions.destroy(&active.handle);
        }

        self.transition(CoordinatorState::Authenticated);
        self.emit(CoordinatorEvent::SceneTransition {
            slot: self.slot,
            scene: self.config.menu_scene.clone(),
            listen: false,
        });
    }

    // -- Helpers ----------------------------------------------------------

    /// The resting state for the current identity.
    fn idle_state(&self) -> CoordinatorState {
        if self.identity.is_some() {
            CoordinatorState::Authenticated
        } else {
            CoordinatorState::Unauthenticated
        }
    }

    fn ensure_not_busy(&self) -> Result<(), CoordinatorError> {
        if self.state.is_busy() {
            tracing::debug!(slot = %self.slot, state = %self.state, "rejecting operation while busy");
            return Err(CoordinatorError::Busy(self.state));
        }
        Ok(())
    }

    /// Checks that the actor is logged in and idle, returning its identity.
    fn ensure_ready(&self) -> Result<ActorIdentity, CoordinatorError> {
        self.ensure_not_busy()?;
        match self.state {
            CoordinatorState::Unauthenticated => Err(CoordinatorError::NotAuthenticated),
            state if state.has_session() => Err(CoordinatorError::AlreadyInSession(state)),
            _ => self
                .identity
                .clone()
                .ok_or(CoordinatorError::NotAuthenticated),
        }
    }

    fn transition(&mut self, to: CoordinatorState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(slot = %self.slot, %from, %to, "state changed");
        self.emit(CoordinatorEvent::StateChanged {
            slot: self.slot,
            from,
            to,
        });
    }

    /// Broadcasts an event. Having no subscribers is fine.
    fn emit(&self, event: CoordinatorEvent) {
        let _ = self.events.send(event);
    }

    fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            slot: self.slot,
            state: self.state,
            identity: self.identity.clone(),
            hosted: self.registry.hosted_session().cloned(),
            connection: self.registry.active_connection().cloned(),
            search_results: self.registry.search_results().cloned(),
        }
    }
}

/// Spawns a coordinator task and returns a handle to communicate with it.
///
/// Must be called from within a Tokio runtime. The task stops when
/// [`CoordinatorHandle::shutdown`] is called or every handle is dropped;
/// either way it destroys any session it still holds first.
pub fn spawn_coordinator<I, S, T>(
    collaborators: Collaborators<I, S, T>,
    config: CoordinatorConfig,
) -> CoordinatorHandle
where
    I: IdentityGateway,
    S: SessionBackend,
    T: TransportBridge,
{
    let config = config.validated();
    let (tx, rx) = mpsc::channel(config.command_channel_size);
    let (events, _) = broadcast::channel(config.event_capacity);
    let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

    let actor = CoordinatorActor {
        slot: ActorSlot::default(),
        state: CoordinatorState::Unauthenticated,
        identity: None,
        registry: SessionRegistry::new(),
        config,
        collaborators,
        receiver: rx,
        outcomes_tx,
        outcomes_rx,
        events: events.clone(),
    };

    tokio::spawn(actor.run());

    CoordinatorHandle::new(tx, events)
}
