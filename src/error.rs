//! Fatal startup and serving errors, mapped to process exit codes.

use thiserror::Error;

use crate::app::AppLoadError;
use crate::config::ConfigError;
use crate::lifecycle::TransitionError;
use crate::net::BindError;
use crate::privilege::PrivilegeError;

/// Exit codes, following `sysexits.h` where one fits.
pub mod exit_code {
    /// Internal software error (bad lifecycle transition, unresolvable app).
    pub const SOFTWARE: u8 = 70;
    /// Signal handlers could not be installed.
    pub const OS_ERROR: u8 = 71;
    /// Serving loop I/O failure.
    pub const IO_ERROR: u8 = 74;
    /// Listening endpoint could not be claimed.
    pub const UNAVAILABLE: u8 = 75;
    /// Run identity could not be assumed.
    pub const NO_PERMISSION: u8 = 77;
    /// Configuration could not be resolved.
    pub const CONFIG: u8 = 78;
}

/// Any condition that moves the supervisor to `FAILED`.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("privilege de-escalation failed: {0}")]
    Privilege(#[from] PrivilegeError),

    #[error("failed to claim listening endpoint: {0}")]
    Bind(#[from] BindError),

    #[error("failed to load application: {0}")]
    AppLoad(#[from] AppLoadError),

    #[error("serving loop failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl StartupError {
    /// Process exit status for this failure. Never zero.
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::Config(_) => exit_code::CONFIG,
            StartupError::Privilege(_) => exit_code::NO_PERMISSION,
            StartupError::Bind(_) => exit_code::UNAVAILABLE,
            StartupError::AppLoad(_) => exit_code::SOFTWARE,
            StartupError::Serve(_) => exit_code::IO_ERROR,
            StartupError::Transition(_) => exit_code::SOFTWARE,
        }
    }
}
