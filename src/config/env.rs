//! Environment resolution.
//!
//! The only environment-driven option is the output buffering flag. It is
//! read once and never fails: a malformed value falls back to the default
//! and is reported as an [`EnvWarning`] once logging is up.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable controlling output buffering.
pub const UNBUFFERED_ENV: &str = "RUNNER_UNBUFFERED";

/// Read access to a set of environment variables.
pub trait EnvSource {
    /// Value of `key`, or `None` when it is not set.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Whether log output is flushed per record or accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferingMode {
    /// Every record is flushed as soon as it is written.
    #[default]
    Unbuffered,
    /// Records are accumulated and flushed in blocks.
    Buffered,
}

impl BufferingMode {
    /// Interpret a raw flag value. `None` means the value is not recognised.
    fn from_flag(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "1" | "true" | "yes" | "on" => Some(Self::Unbuffered),
            "0" | "false" | "no" | "off" => Some(Self::Buffered),
            _ => None,
        }
    }
}

impl fmt::Display for BufferingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbuffered => write!(f, "unbuffered"),
            Self::Buffered => write!(f, "buffered"),
        }
    }
}

/// A malformed environment value that was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ignoring malformed {key}={value:?}, using {fallback}")]
pub struct EnvWarning {
    pub key: &'static str,
    pub value: String,
    pub fallback: BufferingMode,
}

/// Resolve the buffering mode from `env`.
///
/// Unset and empty both yield the default ([`BufferingMode::Unbuffered`]).
pub fn resolve_buffering<E: EnvSource + ?Sized>(env: &E) -> (BufferingMode, Option<EnvWarning>) {
    let Some(raw) = env.var(UNBUFFERED_ENV) else {
        return (BufferingMode::default(), None);
    };

    match BufferingMode::from_flag(&raw) {
        Some(mode) => (mode, None),
        None => {
            let fallback = BufferingMode::default();
            let warning = EnvWarning {
                key: UNBUFFERED_ENV,
                value: raw,
                fallback,
            };
            (fallback, Some(warning))
        }
    }
}
