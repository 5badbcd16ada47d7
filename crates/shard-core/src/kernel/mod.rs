//! # Shard Core Kernel
//!
//! The `kernel` module assembles a server from modules and drives it from
//! construction to shutdown.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Server Bootstrapping**: [`Server`](bootstrap::Server) and its
//!   [`ServerBuilder`](bootstrap::ServerBuilder) validate the server identity,
//!   register modules and run the load sequence before serving.
//! - **Runtime Hand-off**: the [`ServerRuntime`](runtime::ServerRuntime) trait is
//!   the seam to the game-server runtime started once modules are loaded.
//! - **Core Constants**: defaults shared by the library and the binary.
//! - **Error Handling**: kernel [`Error`](error::Error) and `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod error;
pub mod runtime;

pub use bootstrap::{Server, ServerBuilder};
pub use error::{Error, Result};
pub use runtime::{ServerRuntime, TcpRuntime};
