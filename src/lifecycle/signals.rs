//! OS signal handling.
//!
//! # Responsibilities
//! - Register termination handlers (SIGTERM, SIGINT) before startup begins
//! - Resolve once the host asks the process to stop
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered up front so an early SIGTERM is not lost

use std::fmt;
use std::io;

/// The signal that ended serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Terminate,
    Interrupt,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminate => f.write_str("SIGTERM"),
            Self::Interrupt => f.write_str("SIGINT"),
        }
    }
}

/// Registered termination handlers.
#[cfg(unix)]
pub struct Termination {
    terminate: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Termination {
    /// Register SIGTERM and SIGINT handlers.
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for the first termination signal.
    pub async fn recv(mut self) -> TerminationSignal {
        tokio::select! {
            _ = self.terminate.recv() => TerminationSignal::Terminate,
            _ = self.interrupt.recv() => TerminationSignal::Interrupt,
        }
    }

    /// Wait for the first termination signal and log it.
    pub async fn wait(self) {
        let signal = self.recv().await;
        tracing::info!(signal = %signal, "Termination signal received");
    }
}

/// Registered termination handlers.
#[cfg(not(unix))]
pub struct Termination;

#[cfg(not(unix))]
impl Termination {
    pub fn install() -> io::Result<Self> {
        Ok(Self)
    }

    pub async fn recv(self) -> TerminationSignal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C, shutting down");
        }
        TerminationSignal::Interrupt
    }

    pub async fn wait(self) {
        let signal = self.recv().await;
        tracing::info!(signal = %signal, "Termination signal received");
    }
}
