use std::any::Any;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::kernel::error::Result;
use crate::module_system::inject::InjectionPoint;
use crate::module_system::registry::ModuleType;

/// Boot priority of a module.
///
/// Higher values load earlier during startup when no dependency forces
/// otherwise. `None` modules are never part of the automatic startup
/// sequence and only load on request or when another module needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BootPriority {
    /// Will only load when requested explicitly or through a dependency
    None = 0,
    /// Low priority modules
    Lowest = 1,
    /// Intended for most game features
    Normal = 2,
    /// High priority modules
    Highest = 3,
    /// Intended for modules other modules cannot work without
    Critical = 4,
}

impl BootPriority {
    /// Get the numeric value of the priority
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Whether modules with this priority take part in automatic startup loading
    pub fn is_auto_loaded(&self) -> bool {
        *self > BootPriority::None
    }
}

impl fmt::Display for BootPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BootPriority::None => "none",
            BootPriority::Lowest => "lowest",
            BootPriority::Normal => "normal",
            BootPriority::Highest => "highest",
            BootPriority::Critical => "critical",
        };
        f.write_str(label)
    }
}

impl FromStr for BootPriority {
    type Err = String;

    /// Parse a priority label such as `"highest"` or its numeric value `"3"`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "0" => Ok(BootPriority::None),
            "lowest" | "1" => Ok(BootPriority::Lowest),
            "normal" | "2" => Ok(BootPriority::Normal),
            "highest" | "3" => Ok(BootPriority::Highest),
            "critical" | "4" => Ok(BootPriority::Critical),
            other => Err(format!("Unknown boot priority: {}", other)),
        }
    }
}

/// Capability contract every module implements.
///
/// The kernel only ever talks to modules through this trait. Concrete
/// modules (config store clients, cache clients, registry publishers, ...)
/// live outside the kernel.
#[async_trait]
pub trait Module: Any + Send + Sync {
    /// Stable display name used in logs and error messages
    fn name(&self) -> &str;

    /// Priority governing automatic startup inclusion and ordering
    fn boot_priority(&self) -> BootPriority;

    /// Module types that must be loaded before this one.
    ///
    /// Each entry is resolved with compatible-type lookup, so a capability
    /// trait object type (`ModuleType::of::<dyn ConfigStore>()`) works as well
    /// as a concrete module type.
    fn dependencies(&self) -> Vec<ModuleType> {
        Vec::new()
    }

    /// Typed slots the loader fills before `initialize` runs.
    ///
    /// Modules built on top of a shared base struct should chain the base's
    /// points into the returned list.
    fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
        Vec::new()
    }

    /// Perform setup. A failure aborts loading of this module.
    async fn initialize(&self) -> Result<()>;

    /// Perform teardown. Not tracked by the kernel.
    async fn stop(&self) -> Result<()>;
}
