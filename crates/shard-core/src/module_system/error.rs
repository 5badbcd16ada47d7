//! # Shard Module System Errors
//!
//! Defines [`ModuleSystemError`], covering every failure the module kernel can
//! report: broken wiring detected while resolving the load order, injection
//! points nothing can satisfy, and failures raised by modules themselves.
//! Each variant names the offending module so an operator can fix the wiring
//! without reading source.
use thiserror::Error;

use crate::kernel::error::Error as KernelError;

/// Broad category of a [`ModuleSystemError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Cycles, missing dependencies, unknown or duplicate module types
    Configuration,
    /// No module satisfies an injection point, or binding it failed
    Injection,
    /// A module's own `initialize` failed
    Initialization,
    /// A module's own `stop` failed
    Teardown,
}

#[derive(Debug, Error)]
pub enum ModuleSystemError {
    #[error("Module type '{module_type}' is registered more than once")]
    DuplicateModule { module_type: String },

    #[error("Circular dependency detected involving module '{module}': {}", path.join(" -> "))]
    CircularDependency { module: String, path: Vec<String> },

    #[error("Module '{module}' depends on '{dependency}' but it is not registered")]
    MissingDependency { module: String, dependency: String },

    #[error("Module '{module_type}' not found")]
    ModuleNotFound { module_type: String },

    #[error("Cannot inject dependency of type '{capability}' into module '{module}': no matching module found")]
    InjectionUnsatisfied { module: String, capability: String },

    #[error("Failed to inject '{provider}' as '{capability}' into module '{module}'")]
    InjectionFailed {
        module: String,
        capability: String,
        provider: String,
    },

    #[error("Module '{module}' failed to initialize: {source}")]
    InitializationFailed {
        module: String,
        #[source]
        source: Box<KernelError>,
    },

    #[error("Module '{module}' failed to stop: {source}")]
    StopFailed {
        module: String,
        #[source]
        source: Box<KernelError>,
    },

    #[error("Errors while stopping modules: {}", .0.join("; "))]
    ShutdownFailed(Vec<String>),
}

impl ModuleSystemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModuleSystemError::DuplicateModule { .. }
            | ModuleSystemError::CircularDependency { .. }
            | ModuleSystemError::MissingDependency { .. }
            | ModuleSystemError::ModuleNotFound { .. } => ErrorKind::Configuration,
            ModuleSystemError::InjectionUnsatisfied { .. }
            | ModuleSystemError::InjectionFailed { .. } => ErrorKind::Injection,
            ModuleSystemError::InitializationFailed { .. } => ErrorKind::Initialization,
            ModuleSystemError::StopFailed { .. } | ModuleSystemError::ShutdownFailed(_) => {
                ErrorKind::Teardown
            }
        }
    }
}
