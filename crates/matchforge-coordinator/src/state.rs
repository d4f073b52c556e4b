//! The coordinator's lifecycle state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a hosted session has finished being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostPhase {
    /// The create request was accepted and is still in flight.
    Pending,
    /// The session exists and is advertised.
    Active,
}

/// The lifecycle state of one local actor.
///
/// ```text
/// Unauthenticated ──login──→ Authenticating ──→ Authenticated
/// Authenticated   ──host───→ Hosting(Pending) ──→ Hosting(Active)
/// Authenticated   ──discover→ Discovering ──→ Authenticated
/// Authenticated   ──join───→ Joining ──→ Connected
/// Hosting(Active) ──close──→ Closing ──→ Authenticated
/// Connected       ──close──→ Closing ──→ Authenticated
/// ```
///
/// A failed asynchronous operation always returns to the state the
/// operation started from.
///
/// - **Busy** states (`Authenticating`, `Hosting(Pending)`, `Discovering`,
///   `Joining`, `Closing`) have a request in flight and reject every new
///   operation.
/// - **Session** states (`Hosting(Active)`, `Connected`) hold exactly one
///   hosted or joined session; hosting and being connected are mutually
///   exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatorState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Hosting(HostPhase),
    Discovering,
    Joining,
    Connected,
    Closing,
}

impl CoordinatorState {
    /// Returns `true` if an asynchronous operation is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Authenticating
                | Self::Hosting(HostPhase::Pending)
                | Self::Discovering
                | Self::Joining
                | Self::Closing
        )
    }

    /// Returns `true` if the actor holds a hosted or joined session.
    pub fn has_session(&self) -> bool {
        matches!(self, Self::Hosting(HostPhase::Active) | Self::Connected)
    }

    /// Returns `true` if the actor is logged in and idle (no session, no
    /// request in flight).
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::Authenticating => write!(f, "Authenticating"),
            Self::Authenticated => write!(f, "Authenticated"),
            Self::Hosting(HostPhase::Pending) => write!(f, "Hosting(pending)"),
            Self::Hosting(HostPhase::Active) => write!(f, "Hosting(active)"),
            Self::Discovering => write!(f, "Discovering"),
            Self::Joining => write!(f, "Joining"),
            Self::Connected => write!(f, "Connected"),
            Self::Closing => write!(f, "Closing"),
        }
    }
}
