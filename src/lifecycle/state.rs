//! Process lifecycle phases.
//!
//! # States
//! ```text
//! INIT → CONFIGURING → PRIVILEGE_DROPPED → BOUND → SERVING → SHUTTING_DOWN → TERMINATED
//!   └──────────┴───────────────┴─────────────┴────────┴────────────┴──→ FAILED
//! ```
//!
//! # Design Decisions
//! - Transitions are checked; the startup order cannot be skipped or reordered
//! - TERMINATED and FAILED are terminal
//! - Current phase is published on a watch channel, full history is kept

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use thiserror::Error;
use tokio::sync::watch;

/// A supervisor lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    Configuring,
    PrivilegeDropped,
    Bound,
    Serving,
    ShuttingDown,
    Terminated,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Terminated | Phase::Failed)
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_advance_to(self, next: Phase) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Phase::Failed {
            return true;
        }
        matches!(
            (self, next),
            (Phase::Init, Phase::Configuring)
                | (Phase::Configuring, Phase::PrivilegeDropped)
                | (Phase::PrivilegeDropped, Phase::Bound)
                | (Phase::Bound, Phase::Serving)
                | (Phase::Serving, Phase::ShuttingDown)
                | (Phase::ShuttingDown, Phase::Terminated)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Init => "INIT",
            Phase::Configuring => "CONFIGURING",
            Phase::PrivilegeDropped => "PRIVILEGE_DROPPED",
            Phase::Bound => "BOUND",
            Phase::Serving => "SERVING",
            Phase::ShuttingDown => "SHUTTING_DOWN",
            Phase::Terminated => "TERMINATED",
            Phase::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An illegal phase transition was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid lifecycle transition {from} -> {to}")]
pub struct TransitionError {
    pub from: Phase,
    pub to: Phase,
}

#[derive(Debug)]
struct Inner {
    phase_tx: watch::Sender<Phase>,
    history: Mutex<Vec<Phase>>,
    endpoint: OnceLock<SocketAddr>,
}

/// Shared handle on the supervisor's lifecycle.
///
/// Cloning is cheap; every clone observes the same state.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    inner: Arc<Inner>,
}

impl Lifecycle {
    /// A lifecycle in the `INIT` phase.
    pub fn new() -> Self {
        let (phase_tx, _) = watch::channel(Phase::Init);
        Self {
            inner: Arc::new(Inner {
                phase_tx,
                history: Mutex::new(vec![Phase::Init]),
                endpoint: OnceLock::new(),
            }),
        }
    }

    pub fn current(&self) -> Phase {
        *self.inner.phase_tx.borrow()
    }

    /// Every phase entered so far, in order.
    pub fn history(&self) -> Vec<Phase> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Move to `next`, or fail if the transition is not allowed.
    pub fn advance(&self, next: Phase) -> Result<(), TransitionError> {
        let mut history = self
            .inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = self.current();
        if !current.can_advance_to(next) {
            return Err(TransitionError { from: current, to: next });
        }

        history.push(next);
        self.inner.phase_tx.send_replace(next);
        tracing::debug!(from = %current, to = %next, "Lifecycle transition");
        Ok(())
    }

    /// Enter `FAILED` unless already terminal. Returns the phase failure happened in.
    pub fn fail(&self) -> Phase {
        let current = self.current();
        if self.advance(Phase::Failed).is_err() {
            tracing::debug!(phase = %current, "Lifecycle already terminal");
        }
        current
    }

    /// Subscribe to phase changes.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.inner.phase_tx.subscribe()
    }

    /// Wait until `phase` is reached or the lifecycle ends. Returns the phase observed.
    pub async fn wait_for(&self, phase: Phase) -> Phase {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let observed = match rx.wait_for(|p| *p == phase || p.is_terminal()).await {
            Ok(p) => *p,
            Err(_) => self.current(),
        };
        observed
    }

    /// Address the listener was bound to, once `BOUND` was reached.
    pub fn endpoint(&self) -> Option<SocketAddr> {
        self.inner.endpoint.get().copied()
    }

    pub(crate) fn record_endpoint(&self, addr: SocketAddr) {
        let _ = self.inner.endpoint.set(addr);
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
