//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the application router with middleware (request ID, tracing, timeout)
//! - Track in-flight requests for shutdown accounting
//! - Serve on the handed-off listener until the shutdown broadcast fires

use std::net::SocketAddr;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProcessConfig;
use crate::http::in_flight::{track_in_flight, InFlightTracker};
use crate::http::request::{UuidRequestId, X_REQUEST_ID};

/// The serving loop.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Wrap `app` with the serving middleware.
    pub fn new(app: Router, config: &ProcessConfig, tracker: InFlightTracker) -> Self {
        let router = Self::build_router(app, config, tracker);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(app: Router, config: &ProcessConfig, tracker: InFlightTracker) -> Router {
        app.layer(middleware::from_fn_with_state(tracker, track_in_flight))
            .layer(TimeoutLayer::new(config.http.request_timeout()))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns once the shutdown broadcast fires and every open connection
    /// has finished.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server no longer accepting connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
