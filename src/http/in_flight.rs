//! In-flight request tracking for graceful shutdown.
//!
//! # Responsibilities
//! - Count requests currently being handled
//! - Generate request sequence numbers for tracing
//! - Let the supervisor report how much work a forced shutdown abandoned

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tokio::sync::watch;

/// Tracks active requests.
///
#[derive(Debug, Clone)]
pub struct InFlightTracker {
    /// Sender holding the current count of active requests.
    count_tx: Arc<watch::Sender<u64>>,
    /// Monotonic sequence for request numbering.
    sequence: Arc<AtomicU64>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            count_tx: Arc::new(tx),
            sequence: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Record a new request. Returns a guard that decrements on drop.
    pub fn track(&self) -> InFlightGuard {
        self.count_tx.send_modify(|count| *count += 1);
        InFlightGuard {
            count_tx: Arc::clone(&self.count_tx),
            seq: self.sequence.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Current number of requests in flight.
    pub fn in_flight(&self) -> u64 {
        *self.count_tx.borrow()
    }
}

impl Default for InFlightTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that tracks a request's lifetime.
/// Decrements the active count when dropped, even if the handler panics.
#[derive(Debug)]
pub struct InFlightGuard {
    count_tx: Arc<watch::Sender<u64>>,
    seq: u64,
}

impl InFlightGuard {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count_tx.send_modify(|count| *count = count.saturating_sub(1));
        tracing::trace!(request_seq = self.seq, "Request finished");
    }
}

/// Middleware holding an [`InFlightGuard`] for the duration of each request.
pub async fn track_in_flight(
    State(tracker): State<InFlightTracker>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let guard = tracker.track();
    tracing::trace!(request_seq = guard.seq(), in_flight = tracker.in_flight(), "Request started");
    let response = next.run(request).await;
    drop(guard);
    response
}
