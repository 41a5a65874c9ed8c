//! Supervised bootstrap for a single-port HTTP service.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI / env / TOML
//!        │
//!        ▼
//!   ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌──────────┐   ┌──────────────┐
//!   │  config  │──▶│ privilege  │──▶│   net    │──▶│   app    │──▶│ http server  │
//!   │ resolve  │   │ de-escalate│   │ listener │   │  loader  │   │ serve/drain  │
//!   └──────────┘   └────────────┘   └──────────┘   └──────────┘   └──────────────┘
//!        └────────────────────── lifecycle::Supervisor ─────────────────────┘
//! ```
//!
//! Every arrow is a checked lifecycle transition; the listener never exists
//! while the process holds superuser rights.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod privilege;

pub use app::{AppRegistry, AppTarget};
pub use config::ProcessConfig;
pub use error::StartupError;
pub use lifecycle::{Lifecycle, Phase, Supervisor};
