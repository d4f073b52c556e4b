//! Scripted collaborators for coordinator tests.
//!
//! `MockBackend` implements every collaborator trait. Each outcome is a
//! field the test sets before issuing the operation, and every
//! asynchronous request waits on a shared [`Gate`] so a test can hold a
//! request in flight and observe the busy state.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use matchforge_coordinator::{
    spawn_coordinator, Collaborators, CoordinatorConfig, CoordinatorEvent,
    CoordinatorHandle,
};
use matchforge_services::{
    DiscoveryService, HostService, IdentityGateway, JoinService, LoginStatus,
    PendingCreate, ServiceError, TeardownService, TransportBridge,
};
use matchforge_types::{
    ActorIdentity, ActorSlot, ConnectionDescriptor, SessionDescriptor,
    SessionHandle, SessionSearchEntry, SessionSearchQuery,
};
use tokio::sync::{broadcast, Notify};

// =========================================================================
// Gate
// =========================================================================

/// Holds asynchronous requests until released. Open by default.
#[derive(Clone)]
pub struct Gate {
    open: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Gate {
    fn new() -> Self {
        Self {
            open: Arc::new(AtomicBool::new(true)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn hold(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.open.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.open.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}

// =========================================================================
// MockBackend
// =========================================================================

pub struct MockBackend {
    pub gate: Gate,

    pub reachable: AtomicBool,
    pub login_result: Mutex<Result<ActorIdentity, ServiceError>>,
    pub login_calls: AtomicUsize,
    pub logouts: AtomicUsize,

    pub create_refusal: Mutex<Option<ServiceError>>,
    pub create_result: Mutex<Result<SessionHandle, ServiceError>>,
    pub create_calls: AtomicUsize,

    pub find_result: Mutex<Result<Vec<SessionSearchEntry>, ServiceError>>,
    pub find_calls: AtomicUsize,

    pub join_result: Mutex<Result<(), ServiceError>>,
    pub join_calls: AtomicUsize,
    pub resolve_result: Mutex<Option<ConnectionDescriptor>>,

    pub destroyed: Mutex<Vec<SessionHandle>>,
    pub travels: Mutex<Vec<ConnectionDescriptor>>,
}

impl MockBackend {
    /// A backend where every request succeeds.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Gate::new(),
            reachable: AtomicBool::new(true),
            login_result: Mutex::new(Ok(ActorIdentity::new("acct-1"))),
            login_calls: AtomicUsize::new(0),
            logouts: AtomicUsize::new(0),
            create_refusal: Mutex::new(None),
            create_result: Mutex::new(Ok(SessionHandle::new("hosted-1"))),
            create_calls: AtomicUsize::new(0),
            find_result: Mutex::new(Ok(vec![entry("remote-1")])),
            find_calls: AtomicUsize::new(0),
            join_result: Mutex::new(Ok(())),
            join_calls: AtomicUsize::new(0),
            resolve_result: Mutex::new(Some(ConnectionDescriptor::new("10.0.0.4:7777"))),
            destroyed: Mutex::new(Vec::new()),
            travels: Mutex::new(Vec::new()),
        })
    }

    pub fn set_login(&self, result: Result<ActorIdentity, ServiceError>) {
        *self.login_result.lock().unwrap() = result;
    }

    pub fn set_find(&self, result: Result<Vec<SessionSearchEntry>, ServiceError>) {
        *self.find_result.lock().unwrap() = result;
    }

    pub fn travels(&self) -> Vec<ConnectionDescriptor> {
        self.travels.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<SessionHandle> {
        self.destroyed.lock().unwrap().clone()
    }
}

/// A joinable search entry for `id`.
pub fn entry(id: &str) -> SessionSearchEntry {
    SessionSearchEntry {
        handle: SessionHandle::new(id),
        host: ActorIdentity::new("remote-host"),
        open_public_slots: 3,
        attributes: Default::default(),
        connection: Some(ConnectionDescriptor::new(format!("{id}:7777"))),
    }
}

impl IdentityGateway for MockBackend {
    async fn login(&self, _slot: ActorSlot) -> Result<ActorIdentity, ServiceError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.gate.wait().await;
        self.login_result.lock().unwrap().clone()
    }

    fn current_status(&self, _slot: ActorSlot) -> LoginStatus {
        LoginStatus::LoggedIn
    }

    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    fn logout(&self, _slot: ActorSlot) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}

impl HostService for MockBackend {
    fn create(
        &self,
        _actor: &ActorIdentity,
        _descriptor: &SessionDescriptor,
    ) -> Result<PendingCreate, ServiceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(refusal) = self.create_refusal.lock().unwrap().clone() {
            return Err(refusal);
        }
        let gate = self.gate.clone();
        let result = self.create_result.lock().unwrap().clone();
        Ok(Box::pin(async move {
            gate.wait().await;
            result
        }))
    }
}

impl DiscoveryService for MockBackend {
    async fn find(
        &self,
        _query: &SessionSearchQuery,
    ) -> Result<Vec<SessionSearchEntry>, ServiceError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.gate.wait().await;
        self.find_result.lock().unwrap().clone()
    }
}

impl JoinService for MockBackend {
    async fn join(
        &self,
        _actor: &ActorIdentity,
        _handle: &SessionHandle,
    ) -> Result<(), ServiceError> {
        self.join_calls.fetch_add(1, Ordering::SeqCst);
        self.gate.wait().await;
        self.join_result.lock().unwrap().clone()
    }

    fn resolve_connection(&self, _handle: &SessionHandle) -> Option<ConnectionDescriptor> {
        self.resolve_result.lock().unwrap().clone()
    }
}

impl TeardownService for MockBackend {
    fn destroy(&self, handle: &SessionHandle) {
        self.destroyed.lock().unwrap().push(handle.clone());
    }
}

impl TransportBridge for MockBackend {
    fn travel(&self, descriptor: ConnectionDescriptor) {
        self.travels.lock().unwrap().push(descriptor);
    }
}

// =========================================================================
// Helpers
// =========================================================================

pub fn spawn(mock: &Arc<MockBackend>) -> CoordinatorHandle {
    spawn_with(mock, CoordinatorConfig::default())
}

pub fn spawn_with(mock: &Arc<MockBackend>, config: CoordinatorConfig) -> CoordinatorHandle {
    let collaborators = Collaborators {
        identity: Arc::clone(mock),
        sessions: Arc::clone(mock),
        transport: Arc::clone(mock),
    };
    spawn_coordinator(collaborators, config)
}

/// Spawns a coordinator and logs it in on slot 0.
pub async fn logged_in(mock: &Arc<MockBackend>) -> CoordinatorHandle {
    let coordinator = spawn(mock);
    coordinator
        .login(ActorSlot(0))
        .await
        .expect("login accepted")
        .await
        .expect("login completed");
    coordinator
}

/// Drains every event currently queued on `rx`.
pub fn drain(rx: &mut broadcast::Receiver<CoordinatorEvent>) -> Vec<CoordinatorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
