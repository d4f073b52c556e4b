//! Session lifecycle coordination for Matchforge.
//!
//! Each local actor gets its own coordinator: an isolated Tokio task that
//! owns the actor's [`CoordinatorState`] and session registry, and drives
//!
//! ```text
//! Login → Host / Discover → Join → Connected → Close
//! ```
//!
//! by issuing requests to the collaborators from `matchforge-services` and
//! reacting to their completions.
//!
//! # Key types
//!
//! - [`spawn_coordinator`] — starts a coordinator task for one actor
//! - [`CoordinatorHandle`] — sends operations to a running coordinator
//! - [`Completion`] — the asynchronous outcome of an accepted operation
//! - [`CoordinatorState`] — lifecycle state machine
//! - [`CoordinatorEvent`] — scene transitions, identity binding, state changes
//! - [`CoordinatorConfig`] — scene names, channel sizes, login refresh

mod actor;
mod completion;
mod config;
mod error;
mod event;
mod handle;
mod registry;
mod state;

pub use actor::{spawn_coordinator, Collaborators};
pub use completion::Completion;
pub use config::CoordinatorConfig;
pub use error::CoordinatorError;
pub use event::CoordinatorEvent;
pub use handle::{CoordinatorHandle, CoordinatorSnapshot};
pub use registry::{ActiveConnection, HostedSession};
pub use state::{CoordinatorState, HostPhase};
