//! # Matchforge
//!
//! Session matchmaking coordination for multiplayer games.
//!
//! Each local actor gets a coordinator that sequences
//! login → host or discover → join → close against pluggable online-service
//! collaborators, reports outcomes asynchronously, and announces scene
//! transitions as events. This crate ties the layers together and adds an
//! in-process [`loopback`] backend.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matchforge::prelude::*;
//!
//! # async fn run() -> Result<(), MatchforgeError> {
//! let matchforge = Matchforge::builder().loopback()?;
//!
//! let host = matchforge.spawn();
//! host.login(ActorSlot(0)).await?.await?;
//! host.host(SessionDescriptor::default().with_attribute("mode", "Custom"))
//!     .await?
//!     .await?;
//!
//! let guest = matchforge.spawn();
//! guest.login(ActorSlot(0)).await?.await?;
//! let joined = guest
//!     .discover_and_join(SessionSearchQuery::new().with("mode", "Custom"))
//!     .await?;
//! assert!(joined.is_some());
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod error;
pub mod loopback;
pub mod telemetry;

pub use builder::{LocalActor, Matchforge, MatchforgeBuilder};
pub use config::{ConfigError, MatchforgeConfig};
pub use error::MatchforgeError;

pub use matchforge_coordinator as coordinator;
pub use matchforge_services as services;
pub use matchforge_types as types;

pub mod prelude {
    pub use crate::loopback::{LoopbackClient, LoopbackConfig, LoopbackOnline};
    pub use crate::{
        ConfigError, LocalActor, Matchforge, MatchforgeBuilder, MatchforgeConfig,
        MatchforgeError,
    };
    pub use matchforge_coordinator::{
        Collaborators, Completion, CoordinatorConfig, CoordinatorError, CoordinatorEvent,
        CoordinatorHandle, CoordinatorSnapshot, CoordinatorState, HostPhase, HostedSession,
        ActiveConnection,
    };
    pub use matchforge_services::{
        DiscoveryService, HostService, IdentityGateway, JoinService, LoginStatus,
        ServiceError, SessionBackend, TeardownService, TransportBridge,
    };
    pub use matchforge_types::{
        ActorIdentity, ActorSlot, AttributeValue, ConnectionDescriptor, SessionDescriptor,
        SessionHandle, SessionSearchEntry, SessionSearchQuery, SessionSearchResult,
    };
}
