//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (filter, format, buffered or unbuffered stdout)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the HTTP trace spans
//! - No metrics endpoint: the process exposes exactly one port

pub mod logging;

pub use logging::{install, LogGuard, OutputSink};
