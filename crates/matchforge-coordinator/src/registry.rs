//! The session registry: what one actor is hosting, joined to, or has
//! found.
//!
//! The registry is pure storage. It has no idea which state the
//! coordinator is in and never calls a collaborator. It is crate-private:
//! the coordinator actor is its only writer, which is what lets it live
//! without locks.
//!
//! # Search generations
//!
//! Every discovery bumps a generation counter before it starts and clears
//! the previous result. A [`SessionSearchResult`] carries the generation
//! it was produced under, so a result handed out earlier can be recognised
//! as superseded when it is passed back to `join`. `join` also compares
//! the whole result against the stored one.

use matchforge_types::{
    ConnectionDescriptor, SessionDescriptor, SessionHandle, SessionSearchResult,
};
use serde::Serialize;

/// A session this actor is hosting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostedSession {
    pub handle: SessionHandle,
    /// The descriptor as advertised. Never modified after creation.
    pub descriptor: SessionDescriptor,
}

/// A remote session this actor has joined and travelled to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveConnection {
    pub handle: SessionHandle,
    pub connection: ConnectionDescriptor,
}

/// Per-actor session storage.
#[derive(Debug, Default)]
pub(crate) struct SessionRegistry {
    hosted: Option<HostedSession>,
    active: Option<ActiveConnection>,
    search: Option<SessionSearchResult>,
    generation: u64,
}

impl SessionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // -- Hosted session ---------------------------------------------------

    /// Records the hosted session, replacing any previous one.
    pub(crate) fn set_hosted_session(&mut self, session: HostedSession) {
        debug_assert!(
            self.active.is_none(),
            "hosting while joined to a remote session"
        );
        self.hosted = Some(session);
    }

    /// Forgets the hosted session and returns it, if any.
    pub(crate) fn clear_hosted_session(&mut self) -> Option<HostedSession> {
        self.hosted.take()
    }

    pub(crate) fn hosted_session(&self) -> Option<&HostedSession> {
        self.hosted.as_ref()
    }

    // -- Active connection ------------------------------------------------

    pub(crate) fn set_active_connection(&mut self, connection: ActiveConnection) {
        debug_assert!(
            self.hosted.is_none(),
            "joining a remote session while hosting"
        );
        self.active = Some(connection);
    }

    pub(crate) fn clear_active_connection(&mut self) -> Option<ActiveConnection> {
        self.active.take()
    }

    pub(crate) fn active_connection(&self) -> Option<&ActiveConnection> {
        self.active.as_ref()
    }

    // -- Search results ---------------------------------------------------

    /// Starts a new search: drops the previous result and returns the
    /// generation the new result must carry.
    pub(crate) fn begin_search(&mut self) -> u64 {
        self.search = None;
        self.generation += 1;
        self.generation
    }

    /// Stores a completed search result.
    ///
    /// Results from an older generation are ignored: a newer search has
    /// already superseded them.
    pub(crate) fn set_search_results(&mut self, result: SessionSearchResult) {
        if result.generation != self.generation {
            tracing::debug!(
                stale = result.generation,
                current = self.generation,
                "dropping superseded search result"
            );
            return;
        }
        self.search = Some(result);
    }

    pub(crate) fn search_results(&self) -> Option<&SessionSearchResult> {
        self.search.as_ref()
    }

    /// Returns `true` if `result` is exactly the stored current result.
    ///
    /// Generations only count per registry, so the entries and the query
    /// are compared too. A result from another coordinator or one built by
    /// hand never matches.
    pub(crate) fn is_current(&self, result: &SessionSearchResult) -> bool {
        self.search.as_ref() == Some(result)
    }

    pub(crate) fn clear_search_results(&mut self) {
        self.search = None;
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionRegistry`, named
    //! `test_{function}_{scenario}_{expected}`.

    use matchforge_types::{SessionSearchEntry, SessionSearchQuery};

    use super::*;

    fn hosted(id: &str) -> HostedSession {
        HostedSession {
            handle: SessionHandle::new(id),
            descriptor: SessionDescriptor::default(),
        }
    }

    fn result(generation: u64, entries: Vec<SessionSearchEntry>) -> SessionSearchResult {
        SessionSearchResult::new(generation, SessionSearchQuery::new(), entries)
    }

    #[test]
    fn test_new_registry_is_empty() {
        let reg = SessionRegistry::new();
        assert!(reg.hosted_session().is_none());
        assert!(reg.active_connection().is_none());
        assert!(reg.search_results().is_none());
    }

    #[test]
    fn test_clear_hosted_session_returns_previous() {
        let mut reg = SessionRegistry::new();
        reg.set_hosted_session(hosted("s-1"));

        let cleared = reg.clear_hosted_session();

        assert_eq!(cleared, Some(hosted("s-1")));
        assert!(reg.hosted_session().is_none());
        assert!(reg.clear_hosted_session().is_none(), "second clear is a no-op");
    }

    #[test]
    fn test_set_active_connection_then_clear() {
        let mut reg = SessionRegistry::new();
        let conn = ActiveConnection {
            handle: SessionHandle::new("s-2"),
            connection: ConnectionDescriptor::new("loopback://s-2"),
        };
        reg.set_active_connection(conn.clone());
        assert_eq!(reg.active_connection(), Some(&conn));

        assert_eq!(reg.clear_active_connection(), Some(conn));
        assert!(reg.active_connection().is_none());
    }

    #[test]
    fn test_begin_search_clears_previous_result() {
        let mut reg = SessionRegistry::new();
        let g1 = reg.begin_search();
        reg.set_search_results(result(g1, Vec::new()));
        assert!(reg.search_results().is_some());

        let g2 = reg.begin_search();

        assert_eq!(g2, g1 + 1);
        assert!(reg.search_results().is_none(), "old result must be gone");
    }

    #[test]
    fn test_set_search_results_ignores_stale_generation() {
        let mut reg = SessionRegistry::new();
        let g1 = reg.begin_search();
        let _g2 = reg.begin_search();

        reg.set_search_results(result(g1, Vec::new()));

        assert!(reg.search_results().is_none());
    }

    #[test]
    fn test_is_current_rejects_other_generation() {
        let mut reg = SessionRegistry::new();
        let g = reg.begin_search();
        reg.set_search_results(result(g, Vec::new()));

        assert!(reg.is_current(&result(g, Vec::new())));
        assert!(!reg.is_current(&result(g + 1, Vec::new())));
        assert!(!reg.is_current(&result(g - 1, Vec::new())));
    }

    #[test]
    fn test_is_current_rejects_same_generation_other_entries() {
        let mut reg = SessionRegistry::new();
        let g = reg.begin_search();
        reg.set_search_results(result(g, Vec::new()));

        let entry = SessionSearchEntry {
            handle: SessionHandle::new("elsewhere"),
            host: matchforge_types::ActorIdentity::new("other-host"),
            open_public_slots: 1,
            attributes: Default::default(),
            connection: Some(ConnectionDescriptor::new("elsewhere:7777")),
        };

        assert!(!reg.is_current(&result(g, vec![entry])));
    }

    #[test]
    fn test_is_current_without_search_is_false() {
        let reg = SessionRegistry::new();
        assert!(!reg.is_current(&result(1, Vec::new())));
    }

    #[test]
    fn test_clear_search_results() {
        let mut reg = SessionRegistry::new();
        let g = reg.begin_search();
        reg.set_search_results(result(g, Vec::new()));

        reg.clear_search_results();

        assert!(reg.search_results().is_none());
    }
}
