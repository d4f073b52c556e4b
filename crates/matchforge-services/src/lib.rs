//! Collaborator interfaces for Matchforge.
//!
//! The session coordinator does not authenticate anyone, advertise
//! anything, or open sockets. It sequences calls into collaborators that
//! do, and this crate defines their shapes:
//!
//! 1. **Identity** — logging a local actor in ([`IdentityGateway`])
//! 2. **Sessions** — creating, finding, joining, and destroying sessions
//!    ([`HostService`], [`DiscoveryService`], [`JoinService`],
//!    [`TeardownService`], bundled as [`SessionBackend`])
//! 3. **Transport** — travelling to a resolved host ([`TransportBridge`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Coordinator (above)  ← calls these traits and reacts to their outcomes
//!     ↕
//! Services (this crate)
//!     ↕
//! Your backend (below) ← an online-services SDK, a relay, the loopback
//! ```

mod error;
mod identity;
mod session;
mod transport;

pub use error::ServiceError;
pub use identity::{IdentityGateway, LoginStatus};
pub use session::{
    DiscoveryService, HostService, JoinService, PendingCreate,
    SessionBackend, TeardownService,
};
pub use transport::TransportBridge;
