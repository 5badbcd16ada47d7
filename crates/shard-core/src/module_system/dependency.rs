use std::collections::HashMap;

use crate::module_system::error::ModuleSystemError;
use crate::module_system::registry::{ModuleEntry, ModuleRegistry, ModuleType};

/// Visitation state of a module during resolution. Unvisited modules have no
/// entry in the state map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    /// On the current DFS path
    Resolving,
    /// Position in the output is final
    Resolved,
}

/// Computes the startup load order for the auto-loaded modules of a registry.
///
/// The output contains every module with a priority above `None` exactly
/// once, with each module's declared dependencies ahead of it. Modules are
/// visited in descending priority (registration order breaks ties), so a
/// higher priority module loads first unless a dependency edge says otherwise,
/// and its dependencies are pulled forward with it.
///
/// Dependencies on registered `None` modules are validated but left out of
/// the order; the loader brings those in when the dependent module loads.
pub struct DependencyResolver<'a> {
    registry: &'a ModuleRegistry,
    states: HashMap<ModuleType, VisitState>,
    path: Vec<ModuleType>,
    resolved: Vec<ModuleType>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        Self {
            registry,
            states: HashMap::new(),
            path: Vec::new(),
            resolved: Vec::new(),
        }
    }

    /// Resolve the full order or fail without side effects.
    pub fn resolve(mut self) -> Result<Vec<ModuleType>, ModuleSystemError> {
        let registry = self.registry;
        let mut seeds: Vec<&'a ModuleEntry> = registry.eligible().collect();
        // Stable, so equal priorities keep registration order
        seeds.sort_by(|a, b| {
            b.module()
                .boot_priority()
                .cmp(&a.module().boot_priority())
        });

        for entry in seeds {
            self.visit(entry)?;
        }

        tracing::info!(
            modules = ?self.resolved.iter().map(ModuleType::short_name).collect::<Vec<_>>(),
            "Module dependency order resolved"
        );
        Ok(self.resolved)
    }

    fn visit(&mut self, entry: &'a ModuleEntry) -> Result<(), ModuleSystemError> {
        let module_type = entry.module_type();
        match self.states.get(&module_type) {
            Some(VisitState::Resolved) => return Ok(()),
            Some(VisitState::Resolving) => {
                return Err(self.cycle_error(entry));
            }
            None => {}
        }

        self.states.insert(module_type, VisitState::Resolving);
        self.path.push(module_type);

        let registry = self.registry;
        for dependency in entry.module().dependencies() {
            let dep_entry = registry.find_compatible(dependency).ok_or_else(|| {
                ModuleSystemError::MissingDependency {
                    module: entry.name().to_string(),
                    dependency: dependency.short_name(),
                }
            })?;

            if dep_entry.module().boot_priority().is_auto_loaded() {
                self.visit(dep_entry)?;
            }
        }

        self.path.pop();
        self.states.insert(module_type, VisitState::Resolved);
        self.resolved.push(module_type);
        Ok(())
    }

    /// Cycle error naming `entry` and the path from its first occurrence back to it
    fn cycle_error(&self, entry: &ModuleEntry) -> ModuleSystemError {
        let start = self
            .path
            .iter()
            .position(|t| *t == entry.module_type())
            .unwrap_or(0);
        let mut path: Vec<String> = self.path[start..]
            .iter()
            .map(|t| self.display_name(*t))
            .collect();
        path.push(entry.name().to_string());
        ModuleSystemError::CircularDependency {
            module: entry.name().to_string(),
            path,
        }
    }

    fn display_name(&self, module_type: ModuleType) -> String {
        self.registry
            .get(module_type)
            .map(|e| e.name().to_string())
            .unwrap_or_else(|| module_type.short_name())
    }
}

/// Convenience wrapper around [`DependencyResolver`]
pub fn resolve_load_order(registry: &ModuleRegistry) -> Result<Vec<ModuleType>, ModuleSystemError> {
    DependencyResolver::new(registry).resolve()
}
