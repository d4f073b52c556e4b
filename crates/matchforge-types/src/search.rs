//! Discovery types: queries and the results they produce.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    ActorIdentity, AttributeValue, ConnectionDescriptor, SessionDescriptor,
    SessionHandle,
};

// ---------------------------------------------------------------------------
// SessionSearchQuery
// ---------------------------------------------------------------------------

/// Equality filters used to discover advertised sessions.
///
/// Every predicate must hold for a session to match: each attribute filter
/// must equal the session's attribute of the same key, and the optional
/// flag predicates must equal the session's presence/lobby flags.
/// Unadvertised sessions never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSearchQuery {
    /// Attribute equality predicates.
    pub filters: BTreeMap<String, AttributeValue>,

    /// Only match sessions whose presence flag equals this value.
    pub presence: Option<bool>,

    /// Only match sessions whose lobby flag equals this value.
    pub lobbies: Option<bool>,

    /// Upper bound on the number of entries a discovery returns.
    pub max_results: usize,
}

impl Default for SessionSearchQuery {
    fn default() -> Self {
        Self {
            filters: BTreeMap::new(),
            presence: None,
            lobbies: None,
            max_results: Self::DEFAULT_MAX_RESULTS,
        }
    }
}

impl SessionSearchQuery {
    pub const DEFAULT_MAX_RESULTS: usize = 50;

    /// An empty query: matches every advertised session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute equality predicate.
    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Requires the presence flag to equal `value`.
    pub fn presence(mut self, value: bool) -> Self {
        self.presence = Some(value);
        self
    }

    /// Requires the lobby flag to equal `value`.
    pub fn lobbies(mut self, value: bool) -> Self {
        self.lobbies = Some(value);
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Returns `true` if `descriptor` satisfies every predicate.
    pub fn matches(&self, descriptor: &SessionDescriptor) -> bool {
        if !descriptor.advertise {
            return false;
        }
        if self.presence.is_some_and(|p| p != descriptor.uses_presence) {
            return false;
        }
        if self.lobbies.is_some_and(|l| l != descriptor.use_lobbies) {
            return false;
        }
        self.filters
            .iter()
            .all(|(key, value)| descriptor.attribute(key) == Some(value))
    }
}

// ---------------------------------------------------------------------------
// SessionSearchEntry
// ---------------------------------------------------------------------------

/// One discovered session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSearchEntry {
    /// Backend handle used to join the session.
    pub handle: SessionHandle,

    /// The actor hosting the session.
    pub host: ActorIdentity,

    /// Public slots still free at discovery time.
    pub open_public_slots: u32,

    /// The session's advertised attributes.
    pub attributes: BTreeMap<String, AttributeValue>,

    /// Where the host can be reached. `None` when the backend could not
    /// resolve an address for this entry; such entries cannot be joined.
    pub connection: Option<ConnectionDescriptor>,
}

impl SessionSearchEntry {
    /// Returns `true` if the entry carries a resolvable connection.
    pub fn is_joinable(&self) -> bool {
        self.connection.is_some()
    }
}

// ---------------------------------------------------------------------------
// SessionSearchResult
// ---------------------------------------------------------------------------

/// The ordered result of one completed discovery.
///
/// `generation` identifies the query that produced it. A newer discovery
/// replaces the result wholesale, so a result whose generation is no longer
/// current is stale and cannot be joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSearchResult {
    pub generation: u64,
    pub query: SessionSearchQuery,
    pub entries: Vec<SessionSearchEntry>,
}

impl SessionSearchResult {
    pub fn new(
        generation: u64,
        query: SessionSearchQuery,
        entries: Vec<SessionSearchEntry>,
    ) -> Self {
        Self {
            generation,
            query,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SessionSearchEntry> {
        self.entries.get(index)
    }

    /// The entry a join without an explicit index selects.
    pub fn first(&self) -> Option<&SessionSearchEntry> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SessionSearchEntry> {
        self.entries.iter()
    }
}
