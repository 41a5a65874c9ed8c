//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file, CLI overrides)
//!     → env.rs (output buffering flag)
//!     → validation.rs (semantic checks)
//!     → ProcessConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is resolved once during startup and never mutated
//! - All fields have defaults to allow running with no file at all
//! - Malformed environment values fall back to defaults; a malformed file is fatal

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{BufferingMode, EnvSource, EnvWarning, ProcessEnv, UNBUFFERED_ENV};
pub use loader::{resolve_config, ConfigError, ConfigOverrides, ResolvedConfig};
pub use schema::{
    HttpConfig, IdentityConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProcessConfig,
    ShutdownConfig,
};
