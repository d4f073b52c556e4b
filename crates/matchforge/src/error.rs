//! Unified error type for Matchforge.

use matchforge_coordinator::CoordinatorError;

use crate::config::ConfigError;

/// Top-level error for code driving coordinators through this crate.
///
/// Collaborator and descriptor failures reach callers as
/// `CoordinatorError` variants, so only the coordinator and configuration
/// errors surface here. `#[from]` lets `?` convert them automatically.
#[derive(Debug, thiserror::Error)]
pub enum MatchforgeError {
    /// An operation was refused or failed in the coordinator.
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
