//! Shared data types for Matchforge.
//!
//! This crate defines the values that flow between the session coordinator
//! and its collaborators:
//!
//! - **Identifiers** ([`ActorSlot`], [`ActorIdentity`], [`SessionHandle`],
//!   [`ConnectionDescriptor`]) — who is acting and what they act on.
//! - **Descriptors** ([`SessionDescriptor`], [`AttributeValue`]) — what a
//!   hosted session looks like.
//! - **Search** ([`SessionSearchQuery`], [`SessionSearchEntry`],
//!   [`SessionSearchResult`]) — how sessions are discovered.
//!
//! Nothing here talks to a network or holds state. Every type is plain
//! data with serde derives so higher layers can log, persist, or forward
//! it as JSON.
//!
//! ```text
//! Coordinator (above)  ← drives the lifecycle using these types
//!     ↕
//! Services (above)     ← collaborator traits speak in these types
//!     ↕
//! Types (this crate)
//! ```

mod descriptor;
mod error;
mod ids;
mod search;

pub use descriptor::{AttributeValue, SessionDescriptor};
pub use error::DescriptorError;
pub use ids::{ActorIdentity, ActorSlot, ConnectionDescriptor, SessionHandle};
pub use search::{SessionSearchEntry, SessionSearchQuery, SessionSearchResult};
