//! `Matchforge` builder: wires configuration and collaborators into
//! coordinators.

use std::sync::Arc;

use matchforge_coordinator::{
    spawn_coordinator, Collaborators, CoordinatorConfig, CoordinatorHandle,
};
use matchforge_services::{IdentityGateway, SessionBackend, TransportBridge};

use crate::config::MatchforgeConfig;
use crate::loopback::{LoopbackClient, LoopbackOnline};
use crate::MatchforgeError;

type CollaboratorFactory<I, S, T> = dyn Fn() -> Collaborators<I, S, T> + Send + Sync;

/// Builder for a [`Matchforge`] instance.
///
/// # Example
///
/// ```rust,ignore
/// use matchforge::prelude::*;
///
/// let matchforge = Matchforge::builder()
///     .config(MatchforgeConfig::from_path("matchforge.json")?)
///     .loopback()?;
/// let host = matchforge.spawn();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MatchforgeBuilder {
    config: MatchforgeConfig,
}

impl MatchforgeBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: MatchforgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the coordinator settings only.
    pub fn coordinator_config(mut self, config: CoordinatorConfig) -> Self {
        self.config.coordinator = config;
        self
    }

    /// Builds an instance whose coordinators all share `collaborators`.
    pub fn collaborators<I, S, T>(
        self,
        collaborators: Collaborators<I, S, T>,
    ) -> Result<Matchforge<I, S, T>, MatchforgeError>
    where
        I: IdentityGateway,
        S: SessionBackend,
        T: TransportBridge,
    {
        self.config.validate()?;
        Ok(Matchforge {
            config: self.config.coordinator,
            factory: Arc::new(move || collaborators.clone()),
            loopback: None,
        })
    }

    /// Builds an instance backed by a fresh in-process
    /// [`LoopbackOnline`] service. Each coordinator gets its own
    /// [`LoopbackClient`].
    pub fn loopback(
        self,
    ) -> Result<Matchforge<LoopbackClient, LoopbackClient, LoopbackClient>, MatchforgeError> {
        self.config.validate()?;
        let online = LoopbackOnline::new(self.config.loopback);
        let source = online.clone();
        Ok(Matchforge {
            config: self.config.coordinator,
            factory: Arc::new(move || source.collaborators()),
            loopback: Some(online),
        })
    }
}

/// A coordinator together with the collaborators it drives.
pub struct LocalActor<I, S, T> {
    pub coordinator: CoordinatorHandle,
    pub collaborators: Collaborators<I, S, T>,
}

/// Spawns coordinators, one per local actor, with a shared configuration.
pub struct Matchforge<I, S, T> {
    config: CoordinatorConfig,
    factory: Arc<CollaboratorFactory<I, S, T>>,
    loopback: Option<LoopbackOnline>,
}

impl Matchforge<LoopbackClient, LoopbackClient, LoopbackClient> {
    /// Creates a new builder.
    pub fn builder() -> MatchforgeBuilder {
        MatchforgeBuilder::new()
    }
}

impl<I, S, T> Matchforge<I, S, T>
where
    I: IdentityGateway,
    S: SessionBackend,
    T: TransportBridge,
{
    /// Spawns a coordinator for a new local actor.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(&self) -> CoordinatorHandle {
        self.spawn_actor().coordinator
    }

    /// Like [`spawn`](Self::spawn), but also returns the collaborators so
    /// the caller can inspect them.
    pub fn spawn_actor(&self) -> LocalActor<I, S, T> {
        let collaborators = (self.factory)();
        let coordinator = spawn_coordinator(collaborators.clone(), self.config.clone());
        tracing::debug!("coordinator spawned");
        LocalActor {
            coordinator,
            collaborators,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// The loopback service, if this instance was built with
    /// [`MatchforgeBuilder::loopback`].
    pub fn loopback_service(&self) -> Option<&LoopbackOnline> {
        self.loopback.as_ref()
    }
}

impl<I, S, T> Clone for Matchforge<I, S, T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            factory: Arc::clone(&self.factory),
            loopback: self.loopback.clone(),
        }
    }
}
