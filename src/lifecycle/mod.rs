//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (supervisor.rs):
//!     Resolve config → Drop privileges → Bind listener → Load app → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain requests (bounded) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! Phases (state.rs):
//!     Checked transitions, history, watch channel for observers
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then identity, then listener
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: forced exit after deadline

pub mod shutdown;
pub mod signals;
pub mod state;
pub mod supervisor;

pub use shutdown::{DrainOutcome, Shutdown, ShutdownReport};
pub use signals::{Termination, TerminationSignal};
pub use state::{Lifecycle, Phase, TransitionError};
pub use supervisor::Supervisor;
