use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use tracing::Span;

use crate::module_system::error::ModuleSystemError;
use crate::module_system::registry::{ModuleEntry, ModuleRegistry, ModuleType};

type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ModuleSystemError>> + Send + 'a>>;

/// Drives modules from registered to loaded, each exactly once.
///
/// Loading a module first loads its declared dependencies, then satisfies its
/// injection points (loading providers on demand), then runs `initialize`.
/// The loader stays usable after startup so `None` priority modules can be
/// loaded later.
///
/// All log output goes through the span handed in at construction, which
/// carries the owning server's identity.
#[derive(Debug)]
pub struct ModuleLoader {
    loaded: HashSet<ModuleType>,
    load_order: Vec<ModuleType>,
    span: Span,
}

impl ModuleLoader {
    pub fn new(span: Span) -> Self {
        Self {
            loaded: HashSet::new(),
            load_order: Vec::new(),
            span,
        }
    }

    /// Whether the module found by compatible lookup for `module_type` is loaded
    pub fn is_loaded(&self, registry: &ModuleRegistry, module_type: ModuleType) -> bool {
        registry
            .find_compatible(module_type)
            .is_some_and(|entry| self.loaded.contains(&entry.module_type()))
    }

    /// Concrete module types in the order their `initialize` completed
    pub fn load_order(&self) -> &[ModuleType] {
        &self.load_order
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Load every module of a resolved startup order. The first failure halts
    /// the sequence.
    pub async fn load_all(
        &mut self,
        registry: &ModuleRegistry,
        order: &[ModuleType],
    ) -> Result<(), ModuleSystemError> {
        for &module_type in order {
            let entry = registry
                .get(module_type)
                .ok_or_else(|| ModuleSystemError::ModuleNotFound {
                    module_type: module_type.short_name(),
                })?;
            if self.loaded.contains(&module_type) {
                tracing::debug!(parent: &self.span, module = %entry.name(), "Module already loaded, skipping");
                continue;
            }
            self.load(registry, entry).await?;
        }
        Ok(())
    }

    /// Load a single module. No-op if it is already loaded.
    pub async fn load(
        &mut self,
        registry: &ModuleRegistry,
        entry: &ModuleEntry,
    ) -> Result<(), ModuleSystemError> {
        let mut loading = Vec::new();
        self.load_recursive(registry, entry, &mut loading).await
    }

    /// Explicit on-demand load by type.
    ///
    /// Only `None` priority modules are loaded here; modules with an
    /// automatic priority belong to the startup sequence and the call is a
    /// no-op for them.
    pub async fn load_by_type(
        &mut self,
        registry: &ModuleRegistry,
        module_type: ModuleType,
    ) -> Result<(), ModuleSystemError> {
        let entry = registry
            .find_compatible(module_type)
            .ok_or_else(|| ModuleSystemError::ModuleNotFound {
                module_type: module_type.short_name(),
            })?;

        if entry.module().boot_priority().is_auto_loaded() {
            tracing::debug!(
                parent: &self.span,
                module = %entry.name(),
                priority = %entry.module().boot_priority(),
                "Module is loaded at startup, ignoring explicit load request"
            );
            return Ok(());
        }

        self.load(registry, entry).await
    }

    /// Direct call-through to the module's `stop`. The loaded set is not touched.
    pub async fn stop(&self, entry: &ModuleEntry) -> Result<(), ModuleSystemError> {
        tracing::info!(parent: &self.span, module = %entry.name(), "Stopping module");
        entry
            .module()
            .stop()
            .await
            .map_err(|e| ModuleSystemError::StopFailed {
                module: entry.name().to_string(),
                source: Box::new(e),
            })
    }

    /// Stop every loaded module in reverse load order. Failures are logged and
    /// collected; the remaining modules are still stopped.
    pub async fn shutdown(&self, registry: &ModuleRegistry) -> Result<(), ModuleSystemError> {
        let mut failures = Vec::new();
        for &module_type in self.load_order.iter().rev() {
            let Some(entry) = registry.get(module_type) else {
                continue;
            };
            if let Err(e) = self.stop(entry).await {
                tracing::error!(parent: &self.span, module = %entry.name(), error = %e, "Error stopping module");
                failures.push(e.to_string());
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ModuleSystemError::ShutdownFailed(failures))
        }
    }

    /// `loading` is the stack of modules whose load is in progress; meeting
    /// one of them again means the wiring is circular.
    fn load_recursive<'a>(
        &'a mut self,
        registry: &'a ModuleRegistry,
        entry: &'a ModuleEntry,
        loading: &'a mut Vec<ModuleType>,
    ) -> LoadFuture<'a> {
        Box::pin(async move {
            let module_type = entry.module_type();
            if self.loaded.contains(&module_type) {
                return Ok(());
            }

            if let Some(start) = loading.iter().position(|t| *t == module_type) {
                let mut path: Vec<String> = loading[start..]
                    .iter()
                    .map(|t| {
                        registry
                            .get(*t)
                            .map(|e| e.name().to_string())
                            .unwrap_or_else(|| t.short_name())
                    })
                    .collect();
                path.push(entry.name().to_string());
                return Err(ModuleSystemError::CircularDependency {
                    module: entry.name().to_string(),
                    path,
                });
            }
            loading.push(module_type);

            let module = entry.module().clone();
            tracing::info!(parent: &self.span, module = %module.name(), "Loading module");

            for dependency in module.dependencies() {
                let dep_entry = registry.find_compatible(dependency).ok_or_else(|| {
                    ModuleSystemError::MissingDependency {
                        module: module.name().to_string(),
                        dependency: dependency.short_name(),
                    }
                })?;
                if !self.loaded.contains(&dep_entry.module_type()) {
                    self.load_recursive(registry, dep_entry, loading).await?;
                }
            }

            for point in module.injection_points() {
                if point.is_bound() {
                    continue;
                }

                let target = point.target();
                let provider = registry.find_compatible(target).ok_or_else(|| {
                    ModuleSystemError::InjectionUnsatisfied {
                        module: module.name().to_string(),
                        capability: target.short_name(),
                    }
                })?;

                if !self.loaded.contains(&provider.module_type()) {
                    self.load_recursive(registry, provider, loading).await?;
                }

                if !point.bind(provider) {
                    return Err(ModuleSystemError::InjectionFailed {
                        module: module.name().to_string(),
                        capability: target.short_name(),
                        provider: provider.name().to_string(),
                    });
                }
                tracing::info!(parent: &self.span, "Injected {} into {}", provider.name(), module.name());
            }

            let started = Instant::now();
            module
                .initialize()
                .await
                .map_err(|e| ModuleSystemError::InitializationFailed {
                    module: module.name().to_string(),
                    source: Box::new(e),
                })?;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            self.loaded.insert(module_type);
            self.load_order.push(module_type);
            loading.pop();

            tracing::info!(parent: &self.span, module = %module.name(), elapsed_ms, "Loaded module");
            Ok(())
        })
    }
}
