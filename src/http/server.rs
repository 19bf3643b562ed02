//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the passthrough fetcher and search aggregator from config
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, CORS, timeout)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::Method, routing::get, BoxError, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{
    timeout::{error::Elapsed, TimeoutLayer},
    ServiceBuilder,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::response::GatewayError;
use crate::lifecycle::{shutdown, signals};
use crate::passthrough::PassthroughFetcher;
use crate::search::{Aggregator, Registry, RegistryError};
use crate::security::Allowlist;

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid backend registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: PassthroughFetcher,
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ServerError> {
        let allowlist = Arc::new(Allowlist::new(config.allowlist.entries.clone()));
        let registry = Arc::new(Registry::from_config(&config.families)?);

        Ok(Self {
            fetcher: PassthroughFetcher::new(allowlist, config.passthrough.clone())?,
            aggregator: Aggregator::new(registry, config.search.clone())?,
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;

        tracing::info!(
            allowlist_entries = config.allowlist.entries.len(),
            families = state.aggregator.registry().families().len(),
            instances = state.aggregator.registry().instance_count(),
            "Gateway state initialized"
        );

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any);

        Router::new()
            .route("/proxy", get(handlers::proxy))
            .route("/search", get(handlers::search))
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(cors)
                    .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                        middleware_error(err, request_timeout)
                    }))
                    .layer(TimeoutLayer::new(request_timeout)),
            )
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until an OS signal arrives or `stop` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        stop: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = signals::os_signal() => {}
                    _ = shutdown::wait_for(stop) => {
                        tracing::info!("Shutdown triggered");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Render a middleware failure with the same JSON envelope as handler errors.
fn middleware_error(err: BoxError, request_timeout: Duration) -> GatewayError {
    if err.is::<Elapsed>() {
        tracing::warn!(timeout = ?request_timeout, "Request exceeded gateway deadline");
        GatewayError::Unexpected(format!("request timed out after {request_timeout:?}"))
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        GatewayError::Unexpected(err.to_string())
    }
}
