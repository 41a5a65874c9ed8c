//! Application loading.
//!
//! # Data Flow
//! ```text
//! CLI `<module>:<object>`
//!     → target.rs (parse & validate)
//!     → registry.rs (resolve to a factory)
//!     → axum::Router handed to the serving loop
//! ```

pub mod builtin;
pub mod registry;
pub mod target;

pub use registry::{AppFactory, AppLoadError, AppRegistry};
pub use target::{AppTarget, AppTargetError};
