//! In-process online service.
//!
//! [`LoopbackOnline`] is a session directory shared by every actor in the
//! process. Each coordinator talks to it through its own [`LoopbackClient`],
//! which implements all the collaborator traits and remembers the accounts
//! it logged in and the connections it travelled to.
//!
//! Rules the directory enforces:
//!
//! - at most `max_sessions` sessions exist (creation is refused
//!   synchronously beyond that);
//! - discovery only returns advertised sessions that match the query and
//!   still have an open public slot;
//! - joining requires an open public slot, and a started session only
//!   accepts joins if its descriptor allows join-in-progress;
//! - the host does not occupy one of its own public slots.
//!
//! Connection descriptors have the form `loopback://<session handle>`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use matchforge_coordinator::Collaborators;
use matchforge_services::{
    DiscoveryService, HostService, IdentityGateway, JoinService, LoginStatus,
    PendingCreate, ServiceError, TeardownService, TransportBridge,
};
use matchforge_types::{
    ActorIdentity, ActorSlot, ConnectionDescriptor, SessionDescriptor, SessionHandle,
    SessionSearchEntry, SessionSearchQuery,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix of every connection descriptor the loopback service resolves.
pub const CONNECTION_SCHEME: &str = "loopback://";

/// Loopback service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopbackConfig {
    /// Simulated round-trip time of every asynchronous request.
    pub latency_ms: u64,

    /// Maximum number of sessions that may exist at once.
    pub max_sessions: usize,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            max_sessions: 64,
        }
    }
}

// =========================================================================
// Directory
// =========================================================================

struct LoopbackSession {
    handle: SessionHandle,
    host: ActorIdentity,
    descriptor: SessionDescriptor,
    /// Remote actors that joined. The host is not listed.
    members: Vec<ActorIdentity>,
    in_progress: bool,
}

impl LoopbackSession {
    fn open_public_slots(&self) -> u32 {
        let used = u32::try_from(self.members.len()).unwrap_or(u32::MAX);
        self.descriptor.max_public_slots.saturating_sub(used)
    }

    fn accepts_joins(&self) -> bool {
        !self.in_progress || self.descriptor.allow_join_in_progress
    }

    fn entry(&self) -> SessionSearchEntry {
        SessionSearchEntry {
            handle: self.handle.clone(),
            host: self.host.clone(),
            open_public_slots: self.open_public_slots(),
            attributes: self.descriptor.attributes.clone(),
            connection: Some(connection_for(&self.handle)),
        }
    }
}

#[derive(Default)]
struct Directory {
    /// In creation order.
    sessions: Vec<LoopbackSession>,
    /// Creates accepted but not yet completed. They count against the
    /// session limit.
    reserved: usize,
}

impl Directory {
    fn position(&self, handle: &SessionHandle) -> Option<usize> {
        self.sessions.iter().position(|s| &s.handle == handle)
    }

    fn get_mut(&mut self, handle: &SessionHandle) -> Option<&mut LoopbackSession> {
        self.sessions.iter_mut().find(|s| &s.handle == handle)
    }
}

/// A directory slot held for a create that has not completed yet.
///
/// Dropping it unfilled gives the slot back, so an abandoned create does
/// not shrink the session limit.
struct Reservation {
    online: LoopbackOnline,
    filled: bool,
}

impl Reservation {
    fn take(online: &LoopbackOnline) -> Result<Self, ServiceError> {
        let mut directory = online.directory();
        let limit = online.config.max_sessions;
        if directory.sessions.len() + directory.reserved >= limit {
            return Err(ServiceError::Rejected(format!(
                "session limit of {limit} reached"
            )));
        }
        directory.reserved += 1;
        Ok(Self {
            online: online.clone(),
            filled: false,
        })
    }

    /// Swaps the reservation for the created session in one step.
    fn fill(mut self, session: LoopbackSession) {
        let mut directory = self.online.directory();
        directory.reserved = directory.reserved.saturating_sub(1);
        directory.sessions.push(session);
        self.filled = true;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.filled {
            let mut directory = self.online.directory();
            directory.reserved = directory.reserved.saturating_sub(1);
            tracing::debug!("abandoned create released its reservation");
        }
    }
}

// =========================================================================
// LoopbackOnline
// =========================================================================

/// The shared session directory. Cheap to clone.
#[derive(Clone)]
pub struct LoopbackOnline {
    config: LoopbackConfig,
    directory: Arc<Mutex<Directory>>,
    reachable: Arc<AtomicBool>,
}

impl LoopbackOnline {
    pub fn new(config: LoopbackConfig) -> Self {
        Self {
            config,
            directory: Arc::new(Mutex::new(Directory::default())),
            reachable: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn config(&self) -> &LoopbackConfig {
        &self.config
    }

    /// Creates a client for one local actor.
    pub fn client(&self) -> LoopbackClient {
        LoopbackClient {
            online: self.clone(),
            accounts: Mutex::new(Accounts::default()),
            travels: Mutex::new(Vec::new()),
        }
    }

    /// Creates a client and wraps it as the collaborators of one
    /// coordinator.
    pub fn collaborators(&self) -> Collaborators<LoopbackClient, LoopbackClient, LoopbackClient> {
        let client = Arc::new(self.client());
        Collaborators {
            identity: Arc::clone(&client),
            sessions: Arc::clone(&client),
            transport: client,
        }
    }

    /// Takes the service offline or brings it back. Offline, every
    /// request fails with `ServiceError::Unavailable`.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
        tracing::info!(reachable, "loopback service reachability changed");
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    /// Marks a session as started. Returns `false` if it does not exist.
    pub fn start_session(&self, handle: &SessionHandle) -> bool {
        match self.directory().get_mut(handle) {
            Some(session) => {
                session.in_progress = true;
                true
            }
            None => false,
        }
    }

    pub fn session_count(&self) -> usize {
        self.directory().sessions.len()
    }

    /// Remote actors currently joined to `handle`.
    pub fn members(&self, handle: &SessionHandle) -> Option<Vec<ActorIdentity>> {
        let directory = self.directory();
        let pos = directory.position(handle)?;
        Some(directory.sessions[pos].members.clone())
    }

    fn directory(&self) -> MutexGuard<'_, Directory> {
        self.directory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_reachable(&self) -> Result<(), ServiceError> {
        if self.is_reachable() {
            Ok(())
        } else {
            Err(ServiceError::Unavailable("loopback service is offline".into()))
        }
    }

    async fn delay(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

impl Default for LoopbackOnline {
    fn default() -> Self {
        Self::new(LoopbackConfig::default())
    }
}

// =========================================================================
// LoopbackClient
// =========================================================================

#[derive(Default)]
struct Accounts {
    logged_in: HashMap<ActorSlot, ActorIdentity>,
    pending: HashSet<ActorSlot>,
}

/// One actor's view of a [`LoopbackOnline`] service.
pub struct LoopbackClient {
    online: LoopbackOnline,
    accounts: Mutex<Accounts>,
    travels: Mutex<Vec<ConnectionDescriptor>>,
}

impl LoopbackClient {
    pub fn online(&self) -> &LoopbackOnline {
        &self.online
    }

    /// The account logged in on `slot`, if any.
    pub fn identity(&self, slot: ActorSlot) -> Option<ActorIdentity> {
        self.accounts().logged_in.get(&slot).cloned()
    }

    /// Every connection handed to [`TransportBridge::travel`], oldest first.
    pub fn travels(&self) -> Vec<ConnectionDescriptor> {
        self.travels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn accounts(&self) -> MutexGuard<'_, Accounts> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityGateway for LoopbackClient {
    async fn login(&self, slot: ActorSlot) -> Result<ActorIdentity, ServiceError> {
        self.online.ensure_reachable()?;
        self.accounts().pending.insert(slot);

        self.online.delay().await;

        let mut accounts = self.accounts();
        accounts.pending.remove(&slot);
        let identity = accounts
            .logged_in
            .entry(slot)
            .or_insert_with(|| ActorIdentity::new(format!("account-{}", generate_id())))
            .clone();
        tracing::debug!(%slot, %identity, "loopback login");
        Ok(identity)
    }

    fn current_status(&self, slot: ActorSlot) -> LoginStatus {
        let accounts = self.accounts();
        if accounts.logged_in.contains_key(&slot) {
            LoginStatus::LoggedIn
        } else if accounts.pending.contains(&slot) {
            LoginStatus::LoggingIn
        } else {
            LoginStatus::LoggedOut
        }
    }

    fn is_reachable(&self) -> bool {
        self.online.is_reachable()
    }

    fn logout(&self, slot: ActorSlot) {
        self.accounts().logged_in.remove(&slot);
    }
}

impl HostService for LoopbackClient {
    fn create(
        &self,
        actor: &ActorIdentity,
        descriptor: &SessionDescriptor,
    ) -> Result<PendingCreate, ServiceError> {
        descriptor
            .validate()
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;
        self.online.ensure_reachable()?;

        let reservation = Reservation::take(&self.online)?;

        let handle = SessionHandle::new(format!("session-{}", generate_id()));
        let host = actor.clone();
        let descriptor = descriptor.clone();
        Ok(Box::pin(async move {
            reservation.online.delay().await;
            reservation.fill(LoopbackSession {
                handle: handle.clone(),
                host,
                descriptor,
                members: Vec::new(),
                in_progress: false,
            });
            tracing::info!(%handle, "loopback session created");
            Ok::<_, ServiceError>(handle)
        }))
    }
}

impl DiscoveryService for LoopbackClient {
    async fn find(
        &self,
        query: &SessionSearchQuery,
    ) -> Result<Vec<SessionSearchEntry>, ServiceError> {
        self.online.ensure_reachable()?;
        self.online.delay().await;

        let directory = self.online.directory();
        let entries = directory
            .sessions
            .iter()
            .filter(|s| query.matches(&s.descriptor))
            .filter(|s| s.accepts_joins() && s.open_public_slots() > 0)
            .take(query.max_results)
            .map(LoopbackSession::entry)
            .collect();
        Ok(entries)
    }
}

impl JoinService for LoopbackClient {
    async fn join(
        &self,
        actor: &ActorIdentity,
        handle: &SessionHandle,
    ) -> Result<(), ServiceError> {
        self.online.ensure_reachable()?;
        self.online.delay().await;

        let mut directory = self.online.directory();
        let session = directory
            .get_mut(handle)
            .ok_or_else(|| ServiceError::Rejected(format!("session {handle} does not exist")))?;

        if &session.host == actor || session.members.contains(actor) {
            return Ok(());
        }
        if !session.accepts_joins() {
            return Err(ServiceError::Rejected(format!(
                "session {handle} is in progress"
            )));
        }
        if session.open_public_slots() == 0 {
            return Err(ServiceError::Rejected(format!("session {handle} is full")));
        }
        session.members.push(actor.clone());
        tracing::debug!(%handle, %actor, "loopback join");
        Ok(())
    }

    fn resolve_connection(&self, handle: &SessionHandle) -> Option<ConnectionDescriptor> {
        let directory = self.online.directory();
        directory.position(handle).map(|_| connection_for(handle))
    }
}

impl TeardownService for LoopbackClient {
    /// Destroys the session if this client hosts it, otherwise leaves it.
    fn destroy(&self, handle: &SessionHandle) {
        let mut directory = self.online.directory();
        let Some(pos) = directory.position(handle) else {
            tracing::debug!(%handle, "destroy for unknown session ignored");
            return;
        };

        let accounts = self.accounts();
        let mine = |identity: &ActorIdentity| accounts.logged_in.values().any(|a| a == identity);

        if mine(&directory.sessions[pos].host) {
            directory.sessions.remove(pos);
            tracing::info!(%handle, "loopback session destroyed");
        } else {
            directory.sessions[pos].members.retain(|m| !mine(m));
            tracing::debug!(%handle, "left loopback session");
        }
    }
}

impl TransportBridge for LoopbackClient {
    fn travel(&self, descriptor: ConnectionDescriptor) {
        tracing::info!(%descriptor, "loopback travel");
        self.travels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(descriptor);
    }
}

fn connection_for(handle: &SessionHandle) -> ConnectionDescriptor {
    ConnectionDescriptor::new(format!("{CONNECTION_SCHEME}{handle}"))
}

/// Generates a random 32-character hex string (128 bits).
fn generate_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
