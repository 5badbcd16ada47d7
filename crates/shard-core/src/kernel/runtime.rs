use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::kernel::error::{Error, KernelLifecyclePhase, Result};

/// The game-server runtime a [`Server`](crate::kernel::Server) hands control to
/// once its modules are loaded.
#[async_trait]
pub trait ServerRuntime: Send + Sync {
    /// Serve on `host:port` until the runtime decides to stop.
    async fn serve(&self, server_name: &str, host: &str, port: u16) -> Result<()>;
}

/// Minimal runtime: accepts TCP connections and drops them, until Ctrl-C or
/// until [`TcpRuntime::shutdown_handle`] is notified.
#[derive(Debug, Default)]
pub struct TcpRuntime {
    shutdown: Arc<Notify>,
}

impl TcpRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify this to make a running `serve` return
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }
}

#[async_trait]
impl ServerRuntime for TcpRuntime {
    async fn serve(&self, server_name: &str, host: &str, port: u16) -> Result<()> {
        let listener = TcpListener::bind((host, port)).await.map_err(|e| {
            Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Serve,
                server_name: server_name.to_string(),
                message: format!("Failed to bind {}:{}", host, port),
                source: Some(Box::new(e)),
            }
        })?;
        let local_addr = listener.local_addr().ok();
        tracing::info!(server = server_name, address = ?local_addr, "Server listening");

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    tracing::info!(server = server_name, "Shutdown requested");
                    break;
                }
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                    }
                    tracing::info!(server = server_name, "Interrupt received");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((_, peer)) => tracing::debug!(server = server_name, %peer, "Accepted connection"),
                    Err(e) => tracing::warn!(server = server_name, error = %e, "Failed to accept connection"),
                },
            }
        }
        Ok(())
    }
}
