//! # Shard Module System
//!
//! Resolves, wires and loads the modules a server is built from.
//!
//! - [`ModuleRegistry`]: the fixed set of registered module instances, with
//!   lookup by exact concrete type and by compatible (capability) type.
//! - [`DependencyResolver`]: computes the startup load order from declared
//!   dependencies and boot priorities, rejecting cycles and missing modules.
//! - [`ModuleLoader`]: loads each module exactly once, resolving declared
//!   dependencies and [`Inject`] points first, loading providers on demand.
//!
//! Modules implement the [`Module`] trait and are registered as
//! [`ModuleEntry`] values, optionally exposing capability views:
//!
//! ```ignore
//! let config = Arc::new(ConsulConfig::default());
//! let entries = vec![
//!     ModuleEntry::builder(config.clone())
//!         .provides(|m| m as Arc<dyn ConfigStore>)
//!         .build(),
//!     ModuleEntry::new(CacheModule::default()),
//! ];
//! ```
pub mod dependency;
pub mod error;
pub mod inject;
pub mod loader;
pub mod registry;
pub mod traits;

pub use dependency::{resolve_load_order, DependencyResolver};
pub use error::{ErrorKind, ModuleSystemError};
pub use inject::{Inject, InjectionPoint};
pub use loader::ModuleLoader;
pub use registry::{ModuleEntry, ModuleEntryBuilder, ModuleRegistry, ModuleType};
pub use traits::{BootPriority, Module};

#[cfg(test)]
pub(crate) mod tests;
