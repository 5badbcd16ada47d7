//! # Shard Kernel Errors
//!
//! Defines the kernel [`Error`] type, which wraps the typed errors of each
//! subsystem ([`ModuleSystemError`], [`ConfigError`]) and adds the failures
//! owned by the kernel itself: invalid server settings and runtime failures.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::module_system::error::ModuleSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed module system error
    #[error("Module system error: {0}")]
    ModuleSystem(#[from] ModuleSystemError),

    /// Specific, typed configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A required server setting is missing or out of range
    #[error("Invalid server setting '{field}': {message}")]
    InvalidServerSetting { field: &'static str, message: String },

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        server_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Serve")]
    Serve,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// The module system error inside this error, if any
    pub fn as_module_error(&self) -> Option<&ModuleSystemError> {
        match self {
            Error::ModuleSystem(e) => Some(e),
            _ => None,
        }
    }
}
