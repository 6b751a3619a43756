//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, rate limit, security headers)
//! - Bind the server to a listener and serve until shutdown

use axum::{error_handling::HandleErrorLayer, middleware, routing::get, BoxError, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::audit::AuditService;
use crate::config::AuditConfig;
use crate::http::{handlers, response};
use crate::report::ReportRenderer;
use crate::security::{self, rate_limit::RateLimiterState};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub audits: Arc<AuditService>,
    pub renderer: Arc<dyn ReportRenderer>,
}

/// HTTP front end of the audit service.
pub struct HttpServer {
    router: Router,
    config: AuditConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AuditConfig, audits: Arc<AuditService>, renderer: Arc<dyn ReportRenderer>) -> Self {
        let state = AppState { audits, renderer };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AuditConfig, state: AppState) -> Router {
        let mut audit_routes = Router::new()
            .route("/audit", get(handlers::audit))
            .route("/report", get(handlers::report));

        if config.rate_limit.enabled {
            let limiter = Arc::new(RateLimiterState::new(&config.rate_limit));
            audit_routes = audit_routes.layer(middleware::from_fn_with_state(
                limiter,
                security::rate_limit::rate_limit_middleware,
            ));
        }

        let request_timeout = Duration::from_secs(config.timeouts.request_secs);
        let router = Router::new()
            .route("/health", get(handlers::health))
            .merge(audit_routes)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                        response::middleware_error(err, request_timeout)
                    }))
                    .layer(TimeoutLayer::new(request_timeout)),
            );

        if config.security.enable_headers {
            security::headers::apply(router)
        } else {
            router
        }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rate_limit = self.config.rate_limit.enabled,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
