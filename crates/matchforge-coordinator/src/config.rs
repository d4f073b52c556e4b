//! Coordinator configuration.

use serde::{Deserialize, Serialize};

/// Settings for one coordinator task.
///
/// Every field has a default, so a JSON config only needs the fields it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Scene announced (in listen mode) once a hosted session is active.
    pub session_scene: String,

    /// Scene announced after a session is closed.
    pub menu_scene: String,

    /// Capacity of the command channel. Senders wait when it is full.
    pub command_channel_size: usize,

    /// Capacity of the event broadcast. Slow subscribers skip events
    /// beyond this many.
    pub event_capacity: usize,

    /// Re-run the identity login when `login` is called while already
    /// authenticated and idle, instead of returning the cached identity.
    pub refresh_identity_on_login: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            session_scene: "session".to_string(),
            menu_scene: "menu".to_string(),
            command_channel_size: 64,
            event_capacity: 64,
            refresh_identity_on_login: false,
        }
    }
}

impl CoordinatorConfig {
    /// Fixes values the channels cannot be built with.
    ///
    /// Tokio channels panic on a capacity of zero; zero capacities are
    /// raised to 1. Called by [`spawn_coordinator`](crate::spawn_coordinator).
    pub fn validated(mut self) -> Self {
        if self.command_channel_size == 0 {
            tracing::warn!("command_channel_size is 0, raising to 1");
            self.command_channel_size = 1;
        }
        if self.event_capacity == 0 {
            tracing::warn!("event_capacity is 0, raising to 1");
            self.event_capacity = 1;
        }
        self
    }
}
