//! Configuration loading.
//!
//! A [`MatchforgeConfig`] bundles the coordinator settings and the loopback
//! backend settings. Every field has a default, so a JSON file only lists
//! what it overrides:
//!
//! ```json
//! {
//!   "coordinator": { "menu_scene": "MainMenu", "session_scene": "Arena" },
//!   "loopback": { "latency_ms": 20 }
//! }
//! ```

use std::path::{Path, PathBuf};

use matchforge_coordinator::CoordinatorConfig;
use serde::{Deserialize, Serialize};

use crate::loopback::LoopbackConfig;

/// Errors from loading or checking a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid JSON for [`MatchforgeConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but a value is unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level Matchforge settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchforgeConfig {
    pub coordinator: CoordinatorConfig,
    pub loopback: LoopbackConfig,
}

impl MatchforgeConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Checks values that would make the coordinator or the loopback
    /// backend misbehave.
    ///
    /// Zero channel capacities are not rejected here; the coordinator
    /// raises them itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coordinator.session_scene.trim().is_empty() {
            return Err(ConfigError::Invalid("coordinator.session_scene is empty".into()));
        }
        if self.coordinator.menu_scene.trim().is_empty() {
            return Err(ConfigError::Invalid("coordinator.menu_scene is empty".into()));
        }
        if self.loopback.max_sessions == 0 {
            return Err(ConfigError::Invalid("loopback.max_sessions must be at least 1".into()));
        }
        Ok(())
    }
}
