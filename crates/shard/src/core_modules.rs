//! Modules every `shard` process registers before any game modules.
use std::sync::Arc;

use async_trait::async_trait;
use shard_core::{BootPriority, Inject, InjectionPoint, Module, ModuleEntry, Result};
use uuid::Uuid;

/// Read-only view of who this server is
pub trait ServerIdentity: Send + Sync {
    fn game(&self) -> &str;
    fn server_name(&self) -> &str;
    fn uuid(&self) -> Uuid;
}

/// Publishes the server identity to other modules
#[derive(Debug)]
pub struct IdentityModule {
    game: String,
    name: String,
    uuid: Uuid,
}

impl IdentityModule {
    pub fn new(game: impl Into<String>, name: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            game: game.into(),
            name: name.into(),
            uuid,
        }
    }

    pub fn entry(self) -> ModuleEntry {
        ModuleEntry::builder(Arc::new(self))
            .provides(|m| m as Arc<dyn ServerIdentity>)
            .build()
    }
}

impl ServerIdentity for IdentityModule {
    fn game(&self) -> &str {
        &self.game
    }

    fn server_name(&self) -> &str {
        &self.name
    }

    fn uuid(&self) -> Uuid {
        self.uuid
    }
}

#[async_trait]
impl Module for IdentityModule {
    fn name(&self) -> &str {
        "identity"
    }

    fn boot_priority(&self) -> BootPriority {
        BootPriority::Critical
    }

    async fn initialize(&self) -> Result<()> {
        tracing::info!(game = %self.game, name = %self.name, uuid = %self.uuid, "Server identity registered");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}

/// Logs a line when the server becomes ready and when it stops
#[derive(Debug, Default)]
pub struct HeartbeatModule {
    identity: Inject<dyn ServerIdentity>,
}

#[async_trait]
impl Module for HeartbeatModule {
    fn name(&self) -> &str {
        "heartbeat"
    }

    fn boot_priority(&self) -> BootPriority {
        BootPriority::Normal
    }

    fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
        vec![&self.identity]
    }

    async fn initialize(&self) -> Result<()> {
        let identity = self
            .identity
            .get()
            .ok_or("server identity was not injected")?;
        tracing::info!(
            server = identity.server_name(),
            game = identity.game(),
            "Heartbeat ready"
        );
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if let Some(identity) = self.identity.get() {
            tracing::info!(server = identity.server_name(), "Heartbeat stopped");
        }
        Ok(())
    }
}
