//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! Bound TCP listener
//!     → server.rs (Axum serve, graceful shutdown)
//!     → request.rs (assign / propagate request ID)
//!     → in_flight.rs (count active requests)
//!     → application router
//! ```

pub mod in_flight;
pub mod request;
pub mod server;

pub use in_flight::{InFlightGuard, InFlightTracker};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
