//! HTTP edge of the server: owns the listener, the cross-cutting middleware
//! stack, `/health` and the published OpenAPI document.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    http::header,
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Wrap the module routes with the ingress endpoints and middleware.
    ///
    /// Request path, outermost first:
    /// SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
    /// -> Timeout -> CORS (optional) -> BodyLimit -> handler.
    pub fn build_router(&self, routes: Router, openapi: utoipa::openapi::OpenApi) -> Router {
        let cfg = &self.config;
        let openapi = Arc::new(openapi);

        let mut router = routes.route("/health", get(web::health_check)).route(
            "/openapi.json",
            get(move || {
                let doc = openapi.clone();
                async move {
                    ([(header::CACHE_CONTROL, "no-store")], Json((*doc).clone())).into_response()
                }
            }),
        );
        if cfg.enable_docs {
            router = router.route("/docs", get(web::serve_docs));
        }

        // `.layer` wraps, so the innermost layer goes on first.
        router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
        if cfg.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router.layer(TimeoutLayer::new(Duration::from_secs(
            cfg.request_timeout_sec,
        )));
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());

        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind and serve until `cancel` fires, then drain in-flight requests.
    pub async fn serve(&self, router: Router, cancel: CancellationToken) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.config.bind_addr))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("cannot bind {addr}"))?;
        tracing::info!(%addr, "HTTP server listening");

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")
    }
}
