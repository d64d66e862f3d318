use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::{get, post},
    Router,
};
use tower::util::ServiceExt;
use utoipa::OpenApi;

use api_ingress::{ApiIngress, ApiIngressConfig};

#[derive(OpenApi)]
#[openapi(info(title = "router-test", version = "1.2.3"))]
struct TestDoc;

fn app(cfg: ApiIngressConfig) -> Router {
    let routes = Router::new()
        .route("/ping", get(|| async { "pong" }))
        .route("/echo", post(|body: String| async move { body }));
    ApiIngress::new(cfg).build_router(routes, TestDoc::openapi())
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let resp = app(ApiIngressConfig::default())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn openapi_document_is_published() {
    let resp = app(ApiIngressConfig::default())
        .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["info"]["title"], "router-test");
    assert_eq!(json["info"]["version"], "1.2.3");
}

#[tokio::test]
async fn docs_page_only_when_enabled() {
    let off = app(ApiIngressConfig::default())
        .oneshot(Request::get("/docs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(off.status(), StatusCode::NOT_FOUND);

    let on = app(ApiIngressConfig {
        enable_docs: true,
        ..Default::default()
    })
    .oneshot(Request::get("/docs").body(Body::empty()).unwrap())
    .await
    .unwrap();
    assert_eq!(on.status(), StatusCode::OK);
}

#[tokio::test]
async fn module_routes_are_served() {
    let resp = app(ApiIngressConfig::default())
        .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let cfg = ApiIngressConfig {
        body_limit_bytes: 8,
        ..Default::default()
    };
    let payload = "x".repeat(64);
    let resp = app(cfg)
        .oneshot(
            Request::post("/echo")
                .header(header::CONTENT_LENGTH, payload.len())
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_headers_only_when_enabled() {
    let request = || {
        Request::get("/ping")
            .header(header::ORIGIN, "http://example.test")
            .body(Body::empty())
            .unwrap()
    };

    let plain = app(ApiIngressConfig::default())
        .oneshot(request())
        .await
        .unwrap();
    assert!(plain
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());

    let cors = app(ApiIngressConfig {
        cors_enabled: true,
        ..Default::default()
    })
    .oneshot(request())
    .await
    .unwrap();
    assert_eq!(
        cors.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn serve_rejects_invalid_bind_address() {
    let ingress = ApiIngress::new(ApiIngressConfig {
        bind_addr: "not-an-address".into(),
        ..Default::default()
    });
    let err = ingress
        .serve(Router::new(), tokio_util::sync::CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid bind address"));
}
