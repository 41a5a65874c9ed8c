//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration and install logging
//! - Drop privileges, then bind the listener, then load the application
//! - Serve until terminated, then drain within the grace period
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and moves the lifecycle to FAILED
//! - Phases run strictly in order, never concurrently
//! - The listener is created only after privileges are dropped

use std::future::Future;
use std::sync::Arc;

use crate::app::AppRegistry;
use crate::config::{resolve_config, ConfigOverrides, EnvSource, ProcessConfig};
use crate::error::StartupError;
use crate::http::{HttpServer, InFlightTracker};
use crate::lifecycle::shutdown::{drain, Shutdown, ShutdownReport};
use crate::lifecycle::state::{Lifecycle, Phase};
use crate::net::Listener;
use crate::observability::{self, LogGuard};
use crate::privilege::{self, IdentityOps, SystemIdentity};

/// Drives the process through its lifecycle.
pub struct Supervisor {
    overrides: ConfigOverrides,
    registry: AppRegistry,
    identity: Arc<dyn IdentityOps>,
    lifecycle: Lifecycle,
    tracker: InFlightTracker,
    install_logging: bool,
}

impl Supervisor {
    /// A supervisor using the host's real identity primitives.
    pub fn new(overrides: ConfigOverrides, registry: AppRegistry) -> Self {
        Self {
            overrides,
            registry,
            identity: Arc::new(SystemIdentity),
            lifecycle: Lifecycle::new(),
            tracker: InFlightTracker::new(),
            install_logging: true,
        }
    }

    /// Replace the identity primitives.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityOps>) -> Self {
        self.identity = identity;
        self
    }

    /// Leave the global tracing subscriber alone.
    pub fn without_logging(mut self) -> Self {
        self.install_logging = false;
        self
    }

    /// Handle for observing phases from outside the run.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    /// Handle for observing in-flight requests from outside the run.
    pub fn tracker(&self) -> InFlightTracker {
        self.tracker.clone()
    }

    /// Run every phase until `termination` resolves and the drain completes.
    ///
    /// Any error leaves the lifecycle in `FAILED`.
    pub async fn run<E, F>(self, env: &E, termination: F) -> Result<ShutdownReport, StartupError>
    where
        E: EnvSource + ?Sized,
        F: Future<Output = ()> + Send,
    {
        let lifecycle = self.lifecycle.clone();
        let mut log_guard = None;

        let result = self.run_phases(env, termination, &mut log_guard).await;
        if let Err(err) = &result {
            let phase = lifecycle.fail();
            tracing::error!(phase = %phase, error = %err, exit_code = err.exit_code(), "Startup failed");
        }

        drop(log_guard);
        result
    }

    async fn run_phases<E, F>(
        self,
        env: &E,
        termination: F,
        log_guard: &mut Option<LogGuard>,
    ) -> Result<ShutdownReport, StartupError>
    where
        E: EnvSource + ?Sized,
        F: Future<Output = ()> + Send,
    {
        let lifecycle = &self.lifecycle;

        lifecycle.advance(Phase::Configuring)?;
        let resolved = resolve_config(&self.overrides, env)?;
        let config = Arc::new(resolved.config);

        if self.install_logging {
            *log_guard = Some(observability::install(&config));
        }
        for warning in &resolved.warnings {
            tracing::warn!(%warning, "Environment value ignored");
        }
        log_config(&config);

        let dropped = privilege::deescalate(&config.identity, self.identity.as_ref())?;
        lifecycle.advance(Phase::PrivilegeDropped)?;
        tracing::info!(user = %dropped.account.name, switched = dropped.switched, "Running unprivileged");

        let listener = Listener::bind(&config.listener).await?;
        lifecycle.record_endpoint(listener.local_addr());
        lifecycle.advance(Phase::Bound)?;

        // A load failure returns here and drops `listener`, releasing the port.
        let app = self.registry.load(&config.app)?;
        tracing::info!(app = %config.app, "Application loaded");

        let server = HttpServer::new(app, &config, self.tracker.clone());
        let shutdown = Shutdown::new();
        let mut serving = tokio::spawn(server.run(listener.into_inner(), shutdown.subscribe()));
        lifecycle.advance(Phase::Serving)?;

        tokio::select! {
            _ = termination => {}
            result = &mut serving => {
                let err = match result {
                    Ok(Ok(())) => std::io::Error::other("serving loop exited without a shutdown request"),
                    Ok(Err(e)) => e,
                    Err(e) => std::io::Error::other(e),
                };
                return Err(StartupError::Serve(err));
            }
        }

        lifecycle.advance(Phase::ShuttingDown)?;
        let report = drain(&shutdown, serving, &self.tracker, config.shutdown.grace_period()).await;
        lifecycle.advance(Phase::Terminated)?;

        tracing::info!(
            outcome = ?report.outcome,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Shutdown complete"
        );
        Ok(report)
    }
}

fn log_config(config: &ProcessConfig) {
    tracing::info!(
        bind_address = %config.bind_addr(),
        buffering_mode = %config.buffering_mode(),
        run_user = %config.run_user(),
        app = %config.app,
        grace_period_secs = config.shutdown.grace_period_secs,
        request_timeout_secs = config.http.request_timeout_secs,
        "Configuration loaded"
    );
}
