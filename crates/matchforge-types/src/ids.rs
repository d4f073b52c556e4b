//! Identifier newtypes.
//!
//! Each identifier wraps a primitive so a `SessionHandle` can never be
//! passed where a `ConnectionDescriptor` is expected, even though both are
//! strings underneath. `#[serde(transparent)]` keeps the JSON form as the
//! bare inner value.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ActorSlot
// ---------------------------------------------------------------------------

/// The local controller index an actor is bound to.
///
/// A split-screen game has one slot per local player; a headless client
/// usually only uses slot 0. Identity gateways key their login state on
/// this value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ActorSlot(pub u32);

impl fmt::Display for ActorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ActorIdentity
// ---------------------------------------------------------------------------

/// Stable account identifier returned by a successful login.
///
/// Opaque to the coordinator: it is only compared, logged, and handed back
/// to the session collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorIdentity(pub String);

impl ActorIdentity {
    /// Creates an identity from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Opaque identifier of a session known to the session backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(pub String);

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ConnectionDescriptor
// ---------------------------------------------------------------------------

/// How to reach a session's host, e.g. `"10.0.0.4:7777"` or a relay URL.
///
/// Obtained only after a successful join and handed to the transport
/// bridge exactly once. The coordinator never parses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionDescriptor(pub String);

impl ConnectionDescriptor {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
