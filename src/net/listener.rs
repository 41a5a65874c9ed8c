//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Classify bind failures (address in use, permission denied)
//! - Own the socket until it is handed to the serving loop

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations. All variants are fatal.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("address {addr} is already in use")]
    AddressInUse {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("permission denied binding {addr}")]
    PermissionDenied {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Io {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

impl BindError {
    fn classify(addr: SocketAddr, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::AddrInUse => Self::AddressInUse { addr, source },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { addr, source },
            _ => Self::Io { addr, source },
        }
    }
}

/// The single listening socket of the process.
///
/// Dropping it releases the port.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to the configured address. No retry on failure.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, BindError> {
        let addr = config.bind_addr();

        let inner = TcpListener::bind(addr)
            .await
            .map_err(|e| BindError::classify(addr, e))?;

        let local_addr = inner.local_addr().map_err(|e| BindError::classify(addr, e))?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Hand the socket to the serving loop.
    pub fn into_inner(self) -> TcpListener {
        self.inner
    }
}
