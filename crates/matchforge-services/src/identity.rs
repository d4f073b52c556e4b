//! Identity gateway: who is the local actor?
//!
//! Matchforge doesn't implement authentication itself. An identity
//! provider (a platform account portal, a developer login tool, a custom
//! token exchange) does, and the coordinator reaches it through the
//! [`IdentityGateway`] trait.

use std::fmt;
use std::future::Future;

use matchforge_types::{ActorIdentity, ActorSlot};
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// The gateway's own view of a slot's login state.
///
/// The coordinator logs this when a redundant login is skipped; it never
/// drives state transitions from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginStatus {
    LoggedOut,
    LoggingIn,
    LoggedIn,
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedOut => write!(f, "LoggedOut"),
            Self::LoggingIn => write!(f, "LoggingIn"),
            Self::LoggedIn => write!(f, "LoggedIn"),
        }
    }
}

/// Authenticates local actors and reports their login status.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the gateway is shared behind an `Arc` with
///   the coordinator task and the tasks it spawns per request.
///
/// # Example
///
/// ```rust
/// use matchforge_services::{IdentityGateway, LoginStatus, ServiceError};
/// use matchforge_types::{ActorIdentity, ActorSlot};
///
/// /// Logs every slot in as `dev-<slot>`. Development only.
/// struct DevGateway;
///
/// impl IdentityGateway for DevGateway {
///     async fn login(
///         &self,
///         slot: ActorSlot,
///     ) -> Result<ActorIdentity, ServiceError> {
///         Ok(ActorIdentity::new(format!("dev-{}", slot.0)))
///     }
///
///     fn current_status(&self, _slot: ActorSlot) -> LoginStatus {
///         LoginStatus::LoggedOut
///     }
/// }
/// ```
pub trait IdentityGateway: Send + Sync + 'static {
    /// Logs the actor in `slot` in and returns its account identity.
    ///
    /// # Returns
    /// - `Ok(ActorIdentity)`: login succeeded
    /// - `Err(ServiceError::Rejected)`: the provider declined
    /// - `Err(ServiceError::Unavailable)`: the provider could not be reached
    fn login(
        &self,
        slot: ActorSlot,
    ) -> impl Future<Output = Result<ActorIdentity, ServiceError>> + Send;

    /// Current login status of `slot` as the gateway sees it.
    fn current_status(&self, slot: ActorSlot) -> LoginStatus;

    /// Whether the gateway can be reached right now.
    ///
    /// Checked synchronously before a login is issued. Gateways without a
    /// cheap reachability check keep the default and report unavailability
    /// through [`login`](Self::login) instead.
    fn is_reachable(&self) -> bool {
        true
    }

    /// Forgets the login of `slot`. Fire-and-forget.
    fn logout(&self, _slot: ActorSlot) {}
}
