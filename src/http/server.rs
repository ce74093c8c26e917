//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the generation endpoints and `/health`
//! - Wire up middleware (tracing, request ID, timeout, CORS, limits, headers)
//! - Gate the API routes on request origin
//! - Bind server to listener and shut down gracefully

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::endpoints::{self, Endpoint};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::security::headers::{cors_layer, nosniff_layer};
use crate::security::limits::{body_limit_layer, payload_too_large_json};
use crate::security::origin::{origin_gate_middleware, OriginPolicy};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub origins: Arc<OriginPolicy>,
}

impl AppState {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(&config.upstream, &config.timeouts)?;
        Ok(Self {
            upstream: Arc::new(upstream),
            origins: Arc::new(OriginPolicy::new(config.security.allowed_origins.clone())),
        })
    }
}

/// HTTP server for the chat proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails when the upstream client cannot be built, most notably when the
    /// credential is missing.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamError> {
        let state = AppState::from_config(&config)?;

        tracing::info!(
            upstream = %state.upstream.redacted_endpoint(),
            allowed_origins = ?state.origins.allowed_origins(),
            "Proxy state initialized"
        );

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let api = Router::new()
            .route(Endpoint::Chat.path(), post(endpoints::chat))
            .route(Endpoint::Planner.path(), post(endpoints::planner))
            .route(Endpoint::CourseOutline.path(), post(endpoints::course_outline))
            .layer(DefaultBodyLimit::disable())
            .layer(body_limit_layer(&config.security))
            .layer(middleware::map_response(payload_too_large_json))
            .route_layer(middleware::from_fn_with_state(
                state.origins.clone(),
                origin_gate_middleware,
            ))
            .with_state(state.clone());

        let router = Router::new()
            .route("/health", get(endpoints::health))
            .merge(api)
            .layer(cors_layer(state.origins));

        let router = if config.security.enable_headers {
            router.layer(nosniff_layer())
        } else {
            router
        };

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
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
            "Proxy server running at http://{}", addr
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process serving.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
