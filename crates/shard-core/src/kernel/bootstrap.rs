use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::Span;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::kernel::runtime::ServerRuntime;
use crate::module_system::{
    resolve_load_order, Module, ModuleEntry, ModuleLoader, ModuleRegistry, ModuleSystemError,
    ModuleType,
};

/// A game server assembled from modules.
///
/// Construction only registers modules. [`Server::start`] resolves the load
/// order, loads every auto-loaded module and then hands control to the
/// runtime. `None` priority modules can be loaded later through
/// [`Server::load_module`].
pub struct Server {
    game: String,
    name: String,
    uuid: Uuid,
    host: String,
    port: u16,
    registry: Arc<ModuleRegistry>,
    loader: Mutex<ModuleLoader>,
    span: Span,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The registry, for modules that need to look up others directly
    pub fn registry(&self) -> Arc<ModuleRegistry> {
        self.registry.clone()
    }

    /// Compute the startup load order without loading anything.
    pub fn resolve_load_order(&self) -> Result<Vec<ModuleType>> {
        let _guard = self.span.enter();
        Ok(resolve_load_order(&self.registry)?)
    }

    /// Resolve the startup order in full, then load it. Nothing is
    /// initialized when resolution fails.
    pub async fn load_modules(&self) -> Result<()> {
        let order = self.resolve_load_order()?;
        let mut loader = self.loader.lock().await;
        loader.load_all(&self.registry, &order).await?;
        tracing::info!(parent: &self.span, loaded = loader.loaded_count(), "Modules loaded");
        Ok(())
    }

    /// Load all auto-loaded modules, then serve on the configured port.
    pub async fn start<R: ServerRuntime + ?Sized>(&self, runtime: &R) -> Result<()> {
        tracing::info!(parent: &self.span, "Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);
        self.load_modules().await?;
        runtime.serve(&self.name, &self.host, self.port).await
    }

    /// Compatible-type lookup, e.g. `find_module::<dyn ConfigStore>()`
    pub fn find_module<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.registry.find::<T>()
    }

    /// Untyped compatible-type lookup
    pub fn find_module_by_type(&self, module_type: ModuleType) -> Option<Arc<dyn Module>> {
        self.registry
            .find_compatible(module_type)
            .map(|entry| entry.module().clone())
    }

    /// Explicitly load a `None` priority module (and whatever it needs).
    ///
    /// Must not be called from a module's `initialize`: the loader stays
    /// locked while modules initialize, so the call would never return.
    pub async fn load_module<T: ?Sized + 'static>(&self) -> Result<()> {
        self.load_module_by_type(ModuleType::of::<T>()).await
    }

    pub async fn load_module_by_type(&self, module_type: ModuleType) -> Result<()> {
        let mut loader = self.loader.lock().await;
        Ok(loader.load_by_type(&self.registry, module_type).await?)
    }

    pub async fn is_module_loaded<T: ?Sized + 'static>(&self) -> bool {
        self.is_module_loaded_by_type(ModuleType::of::<T>()).await
    }

    pub async fn is_module_loaded_by_type(&self, module_type: ModuleType) -> bool {
        self.loader.lock().await.is_loaded(&self.registry, module_type)
    }

    /// Modules in the order they finished loading
    pub async fn loaded_modules(&self) -> Vec<ModuleType> {
        self.loader.lock().await.load_order().to_vec()
    }

    /// Call `stop` on one module. The kernel does not track stopped modules.
    pub async fn stop_module<T: ?Sized + 'static>(&self) -> Result<()> {
        let module_type = ModuleType::of::<T>();
        let entry = self.registry.find_compatible(module_type).ok_or_else(|| {
            ModuleSystemError::ModuleNotFound {
                module_type: module_type.short_name(),
            }
        })?;
        let loader = self.loader.lock().await;
        Ok(loader.stop(entry).await?)
    }

    /// Stop every loaded module in reverse load order.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!(parent: &self.span, "Shutting down modules");
        let loader = self.loader.lock().await;
        loader
            .shutdown(&self.registry)
            .await
            .map_err(|e| Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Shutdown,
                server_name: self.name.clone(),
                message: "One or more modules failed to stop".to_string(),
                source: Some(Box::new(e)),
            })
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("game", &self.game)
            .field("name", &self.name)
            .field("uuid", &self.uuid)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Builder for [`Server`]. `game`, `name` and a positive `port` are required.
#[derive(Default)]
pub struct ServerBuilder {
    game: Option<String>,
    name: Option<String>,
    uuid: Option<Uuid>,
    host: Option<String>,
    port: u16,
    modules: Vec<ModuleEntry>,
}

impl ServerBuilder {
    /// Seed the builder from a loaded configuration file
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            game: Some(config.game.clone()),
            name: Some(config.name.clone()),
            uuid: config.uuid,
            host: Some(config.host.clone()),
            port: config.port,
            modules: Vec::new(),
        }
    }

    pub fn game(mut self, game: impl Into<String>) -> Self {
        self.game = Some(game.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Register a module exposing only its concrete type
    pub fn module<M: Module>(self, module: M) -> Self {
        self.entry(ModuleEntry::new(module))
    }

    /// Register a module instance that is also shared elsewhere
    pub fn shared_module<M: Module>(self, module: Arc<M>) -> Self {
        self.entry(ModuleEntry::builder(module).build())
    }

    /// Register a prepared entry, e.g. one with capability views
    pub fn entry(mut self, entry: impl Into<ModuleEntry>) -> Self {
        self.modules.push(entry.into());
        self
    }

    pub fn entries(mut self, entries: impl IntoIterator<Item = ModuleEntry>) -> Self {
        self.modules.extend(entries);
        self
    }

    pub fn build(self) -> Result<Server> {
        let game = required("game", self.game)?;
        let name = required("name", self.name)?;
        if self.port == 0 {
            return Err(Error::InvalidServerSetting {
                field: "port",
                message: "port must be greater than 0".to_string(),
            });
        }
        let uuid = self.uuid.unwrap_or_else(Uuid::new_v4);
        let host = self
            .host
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| constants::DEFAULT_HOST.to_string());

        let registry = ModuleRegistry::new(self.modules)?;
        let span = tracing::info_span!("server", name = %name, game = %game, uuid = %uuid);
        tracing::debug!(parent: &span, modules = registry.len(), "Server built");

        Ok(Server {
            game,
            name,
            uuid,
            host,
            port: self.port,
            registry: Arc::new(registry),
            loader: Mutex::new(ModuleLoader::new(span.clone())),
            span,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(Error::InvalidServerSetting {
            field,
            message: format!("{} must not be empty", field),
        }),
        None => Err(Error::InvalidServerSetting {
            field,
            message: format!("{} is required", field),
        }),
    }
}
