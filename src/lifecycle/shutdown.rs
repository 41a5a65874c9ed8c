//! Shutdown coordination for the serving loop.

use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::http::InFlightTracker;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// How the drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request finished inside the grace period.
    Drained,
    /// The grace period ran out; `in_flight` requests were abandoned.
    Abandoned { in_flight: u64 },
}

/// Summary of a completed shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    pub outcome: DrainOutcome,
    /// Time from the termination signal to the end of the drain.
    pub elapsed: Duration,
    pub grace_period: Duration,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.outcome == DrainOutcome::Drained
    }
}

/// Stop accepting, then wait up to `grace_period` for the serving task.
///
/// At the deadline the task is aborted and the remaining requests are
/// reported, never silently dropped.
pub async fn drain(
    shutdown: &Shutdown,
    mut serving: JoinHandle<std::io::Result<()>>,
    tracker: &InFlightTracker,
    grace_period: Duration,
) -> ShutdownReport {
    let started = Instant::now();
    tracing::info!(
        in_flight = tracker.in_flight(),
        grace_period_secs = grace_period.as_secs_f64(),
        "Draining in-flight requests"
    );
    shutdown.trigger();

    let outcome = match tokio::time::timeout(grace_period, &mut serving).await {
        Ok(result) => {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Serving loop failed while draining"),
                Err(e) => tracing::error!(error = %e, "Serving task ended abnormally while draining"),
            }
            DrainOutcome::Drained
        }
        Err(_) => {
            serving.abort();
            let in_flight = tracker.in_flight();
            tracing::error!(
                in_flight,
                grace_period_secs = grace_period.as_secs_f64(),
                "Grace period expired, abandoning in-flight requests"
            );
            DrainOutcome::Abandoned { in_flight }
        }
    };

    ShutdownReport {
        outcome,
        elapsed: started.elapsed(),
        grace_period,
    }
}
