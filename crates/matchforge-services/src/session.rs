//! Session backend traits: create, find, join, destroy.
//!
//! A real backend usually implements all four on one type (an online
//! services SDK exposes them through a single session interface). They are
//! split so tests and adapters can reason about each contract on its own;
//! [`SessionBackend`] bundles them back together.

use std::future::Future;
use std::pin::Pin;

use matchforge_types::{
    ActorIdentity, ConnectionDescriptor, SessionDescriptor, SessionHandle,
    SessionSearchEntry, SessionSearchQuery,
};

use crate::ServiceError;

/// The asynchronous half of a create request.
///
/// Boxed so it owns everything it needs and can be moved into a spawned
/// task independently of the service and the arguments it was created from.
pub type PendingCreate =
    Pin<Box<dyn Future<Output = Result<SessionHandle, ServiceError>> + Send + 'static>>;

/// Creates hosted sessions.
pub trait HostService: Send + Sync + 'static {
    /// Starts creating a session owned by `actor`.
    ///
    /// The outer `Result` is the synchronous decision: `Err` means the
    /// request was refused outright and nothing is in flight. `Ok` carries
    /// the asynchronous outcome, which resolves exactly once to the new
    /// session's handle or to the reason creation failed.
    fn create(
        &self,
        actor: &ActorIdentity,
        descriptor: &SessionDescriptor,
    ) -> Result<PendingCreate, ServiceError>;
}

/// Finds advertised sessions.
pub trait DiscoveryService: Send + Sync + 'static {
    /// Returns the sessions matching `query`, in the backend's order.
    ///
    /// An empty `Vec` is a successful search that found nothing; `Err` is
    /// reserved for searches that could not be carried out.
    fn find(
        &self,
        query: &SessionSearchQuery,
    ) -> impl Future<Output = Result<Vec<SessionSearchEntry>, ServiceError>> + Send;
}

/// Joins discovered sessions and resolves where their host lives.
pub trait JoinService: Send + Sync + 'static {
    /// Registers `actor` as a member of the session behind `handle`.
    fn join(
        &self,
        actor: &ActorIdentity,
        handle: &SessionHandle,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Resolves the connection target of a joined session.
    ///
    /// Returns `None` if the backend has no address for it.
    fn resolve_connection(
        &self,
        handle: &SessionHandle,
    ) -> Option<ConnectionDescriptor>;
}

/// Destroys sessions. Fire-and-forget: no completion is reported.
pub trait TeardownService: Send + Sync + 'static {
    fn destroy(&self, handle: &SessionHandle);
}

/// Everything the coordinator needs from a session backend.
///
/// Blanket-implemented for any type that implements the four session
/// traits, so backends never implement it by hand.
pub trait SessionBackend:
    HostService + DiscoveryService + JoinService + TeardownService
{
}

impl<T> SessionBackend for T where
    T: HostService + DiscoveryService + JoinService + TeardownService
{
}
