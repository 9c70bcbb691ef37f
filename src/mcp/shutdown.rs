//! Termination signal handling shared by both transports.

use std::io;

/// Waits for the process to be asked to stop.
#[cfg(unix)]
pub struct Shutdown {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Shutdown {
    /// Installs the SIGINT and SIGTERM handlers.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler cannot be registered.
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Resolves with the signal's name once one arrives. Cancel-safe.
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigint.recv() => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
        }
    }
}

/// Waits for the process to be asked to stop.
#[cfg(not(unix))]
pub struct Shutdown;

#[cfg(not(unix))]
impl Shutdown {
    /// Nothing to install; Ctrl+C is registered on first poll.
    ///
    /// # Errors
    ///
    /// Never fails on this platform.
    #[allow(clippy::unnecessary_wraps)]
    pub const fn install() -> io::Result<Self> {
        Ok(Self)
    }

    /// Resolves once Ctrl+C is pressed.
    pub async fn recv(&mut self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        "Ctrl+C"
    }
}
