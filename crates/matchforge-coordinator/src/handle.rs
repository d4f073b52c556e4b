//! `CoordinatorHandle`: the caller-facing side of a coordinator.

use matchforge_types::{
    ActorIdentity, ActorSlot, ConnectionDescriptor, SessionDescriptor,
    SessionSearchQuery, SessionSearchResult,
};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::actor::{Command, Reply};
use crate::{
    ActiveConnection, Completion, CoordinatorError, CoordinatorEvent,
    CoordinatorState, HostedSession,
};

/// A point-in-time copy of a coordinator's state and registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorSnapshot {
    pub slot: ActorSlot,
    pub state: CoordinatorState,
    pub identity: Option<ActorIdentity>,
    pub hosted: Option<HostedSession>,
    pub connection: Option<ActiveConnection>,
    pub search_results: Option<SessionSearchResult>,
}

/// Handle to a running coordinator.
///
/// Cheap to clone: it wraps an `mpsc::Sender` and a `broadcast::Sender`.
///
/// # Two-stage results
///
/// Operations that start an asynchronous request (`login`, `host`,
/// `discover`, `join`) return as soon as the coordinator has accepted or
/// refused them:
///
/// - `Err(..)`: a precondition failed (`Busy`, `NotAuthenticated`, ...);
///   nothing was requested and the state is unchanged.
/// - `Ok(Completion)`: the request is in flight. Await the completion for
///   the outcome.
///
/// ```rust,ignore
/// let identity = coordinator.login(ActorSlot(0)).await?.await?;
/// ```
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<Command>,
    events: broadcast::Sender<CoordinatorEvent>,
}

impl CoordinatorHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<Command>,
        events: broadcast::Sender<CoordinatorEvent>,
    ) -> Self {
        Self { sender, events }
    }

    /// Logs the actor in `slot` in.
    ///
    /// Already logged in: resolves immediately to the bound identity.
    pub async fn login(
        &self,
        slot: ActorSlot,
    ) -> Result<Completion<ActorIdentity>, CoordinatorError> {
        self.request(|reply| Command::Login { slot, reply }).await
    }

    /// Logs out, closing any hosted or joined session first. No-op when
    /// not logged in.
    pub async fn logout(&self) -> Result<(), CoordinatorError> {
        self.request(|reply| Command::Logout { reply }).await
    }

    /// Starts hosting a session described by `descriptor`.
    ///
    /// A synchronous refusal by the host collaborator comes back here as
    /// `Err(HostRejected)`; an asynchronous failure comes back through the
    /// completion.
    pub async fn host(
        &self,
        descriptor: SessionDescriptor,
    ) -> Result<Completion<HostedSession>, CoordinatorError> {
        self.request(|reply| Command::Host { descriptor, reply }).await
    }

    /// Searches for sessions matching `query`.
    ///
    /// The previous search result is discarded as soon as the search
    /// starts. An empty result is a success.
    pub async fn discover(
        &self,
        query: SessionSearchQuery,
    ) -> Result<Completion<SessionSearchResult>, CoordinatorError> {
        self.request(|reply| Command::Discover { query, reply }).await
    }

    /// Joins entry `index` of `result`, or the first entry when `index`
    /// is `None`.
    ///
    /// `result` must be this coordinator's current search result. A result
    /// from an earlier discovery, from another coordinator, or built by
    /// hand is refused with `InvalidSession`. On success the resolved
    /// connection has already been handed to the transport bridge when
    /// the completion resolves.
    pub async fn join(
        &self,
        result: &SessionSearchResult,
        index: Option<usize>,
    ) -> Result<Completion<ConnectionDescriptor>, CoordinatorError> {
        let result = result.clone();
        self.request(|reply| Command::Join {
            result,
            index,
            reply,
        })
        .await
    }

    /// Joins the first entry of `result`.
    pub async fn join_first(
        &self,
        result: &SessionSearchResult,
    ) -> Result<Completion<ConnectionDescriptor>, CoordinatorError> {
        self.join(result, None).await
    }

    /// Discovers sessions and joins the first one found.
    ///
    /// Waits for both requests. Returns `Ok(None)` if the search found
    /// nothing.
    pub async fn discover_and_join(
        &self,
        query: SessionSearchQuery,
    ) -> Result<Option<ConnectionDescriptor>, CoordinatorError> {
        let found = self.discover(query).await?.await?;
        if found.is_empty() {
            return Ok(None);
        }
        let connection = self.join_first(&found).await?.await?;
        Ok(Some(connection))
    }

    /// Closes the hosted or joined session. No-op when there is none.
    pub async fn close(&self) -> Result<(), CoordinatorError> {
        self.request(|reply| Command::Close { reply }).await
    }

    /// Returns a copy of the coordinator's state and registry.
    pub async fn snapshot(&self) -> Result<CoordinatorSnapshot, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Command::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| CoordinatorError::Unavailable)?;
        reply_rx.await.map_err(|_| CoordinatorError::Unavailable)
    }

    /// Returns the current state.
    pub async fn state(&self) -> Result<CoordinatorState, CoordinatorError> {
        Ok(self.snapshot().await?.state)
    }

    /// Subscribes to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.events.subscribe()
    }

    /// Stops the coordinator and waits until it has stopped.
    ///
    /// A hosted or joined session is destroyed first. A request still in
    /// flight is waited for and undone, and its completion resolves to
    /// `Unavailable`.
    pub async fn shutdown(&self) -> Result<(), CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Command::Shutdown { reply: reply_tx })
            .await
            .map_err(|_| CoordinatorError::Unavailable)?;
        reply_rx.await.map_err(|_| CoordinatorError::Unavailable)
    }

    /// Sends a command and waits for the coordinator's immediate answer.
    async fn request<R>(
        &self,
        make: impl FnOnce(Reply<R>) -> Command,
    ) -> Result<R, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| CoordinatorError::Unavailable)?;
        reply_rx.await.map_err(|_| CoordinatorError::Unavailable)?
    }
}
