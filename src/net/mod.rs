//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig (bind_host, bind_port)
//!     → listener.rs (bind exactly one socket, classify failures)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Exactly one listening socket per process
//! - Bind happens only after privileges are dropped
//! - Failures are never retried; the supervisor exits instead

pub mod listener;

pub use listener::{BindError, Listener};
