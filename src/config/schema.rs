//! Configuration schema definitions.
//!
//! This module defines the process configuration resolved once at startup.
//! File-backed sections derive Serde traits; the output and application
//! sections are never read from disk and only come from the environment
//! and the command line.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::AppTarget;
use crate::config::env::BufferingMode;

/// Port the packaged service listens on when nothing overrides it.
pub const DEFAULT_PORT: u16 = 8000;

/// Account the service is expected to run as inside its container.
pub const DEFAULT_RUN_USER: &str = "appuser";

/// Immutable process configuration.
///
/// Built once during the `CONFIGURING` phase and shared by `Arc` with every
/// component afterwards.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProcessConfig {
    /// Listening endpoint.
    pub listener: ListenerConfig,

    /// Non-privileged run identity.
    pub identity: IdentityConfig,

    /// Shutdown drain settings.
    pub shutdown: ShutdownConfig,

    /// Per-request settings for the serving loop.
    pub http: HttpConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Output buffering, resolved from the environment.
    #[serde(skip)]
    pub output: OutputConfig,

    /// Application object to serve, resolved from the command line.
    #[serde(skip)]
    pub app: AppTarget,
}

impl ProcessConfig {
    /// Socket address the network binder claims.
    pub fn bind_addr(&self) -> SocketAddr {
        self.listener.bind_addr()
    }

    pub fn buffering_mode(&self) -> BufferingMode {
        self.output.buffering_mode
    }

    pub fn run_user(&self) -> &str {
        &self.identity.run_user
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address to listen on (`0.0.0.0` means all interfaces).
    pub bind_host: IpAddr,

    /// TCP port to listen on.
    pub bind_port: u16,
}

impl ListenerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.bind_port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            bind_port: DEFAULT_PORT,
        }
    }
}

/// Identity the serving process runs under.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Name of the pre-provisioned, non-privileged account.
    pub run_user: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            run_user: DEFAULT_RUN_USER.to_string(),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Time in-flight requests get to finish after a termination signal.
    pub grace_period_secs: u64,
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 30,
        }
    }
}

/// Serving loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Output configuration. Never read from the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub buffering_mode: BufferingMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_packaged_service() {
        let config = ProcessConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.run_user(), "appuser");
        assert_eq!(config.buffering_mode(), BufferingMode::Unbuffered);
        assert_eq!(config.app.to_string(), "main:app");
        assert_eq!(config.shutdown.grace_period(), Duration::from_secs(30));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ProcessConfig = toml::from_str(
            r#"
            [listener]
            bind_port = 9000

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_port, 9000);
        assert_eq!(config.listener.bind_host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.identity.run_user, DEFAULT_RUN_USER);
    }
}
