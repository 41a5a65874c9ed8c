//! Configuration loading and layering.
//!
//! Layers, lowest precedence first: built-in defaults, optional TOML file,
//! command-line overrides, environment.

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::app::AppTarget;
use crate::config::env::{resolve_buffering, EnvSource, EnvWarning};
use crate::config::schema::ProcessConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied on the command line. `None` keeps the lower layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub app: Option<AppTarget>,
    pub bind_host: Option<IpAddr>,
    pub bind_port: Option<u16>,
    pub run_user: Option<String>,
    pub grace_period_secs: Option<u64>,
}

/// A resolved configuration plus the environment values that were ignored.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ProcessConfig,
    pub warnings: Vec<EnvWarning>,
}

/// Load a TOML configuration file without validating it.
pub fn load_config(path: &Path) -> Result<ProcessConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the process configuration from every layer and validate it.
pub fn resolve_config<E>(overrides: &ConfigOverrides, env: &E) -> Result<ResolvedConfig, ConfigError>
where
    E: EnvSource + ?Sized,
{
    let mut config = match &overrides.config_file {
        Some(path) => load_config(path)?,
        None => ProcessConfig::default(),
    };

    if let Some(app) = &overrides.app {
        config.app = app.clone();
    }
    if let Some(host) = overrides.bind_host {
        config.listener.bind_host = host;
    }
    if let Some(port) = overrides.bind_port {
        config.listener.bind_port = port;
    }
    if let Some(user) = &overrides.run_user {
        config.identity.run_user = user.clone();
    }
    if let Some(secs) = overrides.grace_period_secs {
        config.shutdown.grace_period_secs = secs;
    }

    let (buffering_mode, warning) = resolve_buffering(env);
    config.output.buffering_mode = buffering_mode;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(ResolvedConfig {
        config,
        warnings: warning.into_iter().collect(),
    })
}
