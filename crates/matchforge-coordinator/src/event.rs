//! Events a coordinator broadcasts to its subscribers.
//!
//! The coordinator never loads a level or writes a player record itself.
//! It announces what should happen and the game layer reacts.

use matchforge_types::{ActorIdentity, ActorSlot};
use serde::Serialize;

use crate::CoordinatorState;

/// Something observable happened to an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CoordinatorEvent {
    /// The state machine moved from `from` to `to`.
    StateChanged {
        slot: ActorSlot,
        from: CoordinatorState,
        to: CoordinatorState,
    },

    /// A login completed; the actor's persistent record should now carry
    /// `identity`. Emitted from the login completion, never from the call.
    IdentityBound {
        slot: ActorSlot,
        identity: ActorIdentity,
    },

    /// The actor logged out.
    IdentityCleared { slot: ActorSlot },

    /// The game should switch scenes. `listen` is set when the local
    /// actor becomes the host and must accept incoming connections.
    SceneTransition {
        slot: ActorSlot,
        scene: String,
        listen: bool,
    },
}
