//! Module dependency resolution and lifecycle kernel for shard game servers.
//!
//! A [`Server`] is built from independently implemented [`Module`]s. On start
//! the kernel resolves a safe load order from declared dependencies and boot
//! priorities, injects dependencies between modules, initializes each module
//! exactly once and then hands control to a [`ServerRuntime`].
pub mod config;
pub mod kernel;
pub mod module_system;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and modules
pub use config::{ConfigError, ServerConfig};
pub use kernel::error::Error as KernelError;
pub use kernel::{Result, Server, ServerBuilder, ServerRuntime, TcpRuntime};
pub use module_system::{
    BootPriority, Inject, InjectionPoint, Module, ModuleEntry, ModuleSystemError, ModuleType,
};
