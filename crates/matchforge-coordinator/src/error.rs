//! Error types for the coordinator.

use matchforge_types::ActorSlot;

use crate::CoordinatorState;

/// Errors reported by coordinator operations.
///
/// Precondition failures (`NotAuthenticated`, `Busy`, `AlreadyInSession`,
/// `InvalidSession`, `SlotMismatch`, a synchronous `HostRejected`) come
/// back from the call itself. Failures of the asynchronous request come
/// back through the operation's [`Completion`](crate::Completion), after
/// the state machine has returned to the state the operation started from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// The identity gateway could not be reached.
    #[error("identity gateway unavailable: {0}")]
    IdentityUnavailable(String),

    /// The identity gateway declined the login.
    #[error("login rejected: {0}")]
    AuthRejected(String),

    /// The operation needs a logged-in actor.
    #[error("actor is not authenticated")]
    NotAuthenticated,

    /// The operation needs an idle actor, but a session is hosted or
    /// joined. Close it first.
    #[error("actor already has an active session ({0})")]
    AlreadyInSession(CoordinatorState),

    /// The host collaborator refused or failed to create the session.
    #[error("host rejected: {0}")]
    HostRejected(String),

    /// The discovery request could not be carried out. A search that
    /// finds nothing is not an error.
    #[error("discovery failed: {0}")]
    DiscoveryError(String),

    /// The selected search entry cannot be joined: stale result, index out
    /// of range, or no resolvable connection.
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// The join collaborator refused or failed the join.
    #[error("join rejected: {0}")]
    JoinRejected(String),

    /// Another operation is in flight.
    #[error("coordinator is busy ({0})")]
    Busy(CoordinatorState),

    /// A login for a different slot was requested while logged in.
    #[error("coordinator is bound to {bound}, not {requested}")]
    SlotMismatch {
        bound: ActorSlot,
        requested: ActorSlot,
    },

    /// The coordinator task has stopped.
    #[error("coordinator is unavailable")]
    Unavailable,
}
