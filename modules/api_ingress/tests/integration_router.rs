//! Router-level tests: host endpoints, docs toggling, fallback and limits.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;
use utoipa::OpenApi;

use api_ingress::{ApiIngress, ApiIngressConfig, APPLICATION_PROBLEM_JSON};

#[derive(OpenApi)]
#[openapi(info(title = "test api", version = "0.0.1"))]
struct TestDoc;

fn api() -> Router {
    Router::new()
        .route("/api/v1/ping", get(|| async { "pong" }))
        .route("/api/v1/echo", post(|body: String| async move { body }))
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_endpoints_respond() {
    let router = ApiIngress::default().build_router(api(), None);

    let resp = router.clone().oneshot(get_req("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());

    let resp = router.oneshot(get_req("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn feature_routes_are_merged() {
    let router = ApiIngress::default().build_router(api(), None);
    let resp = router.oneshot(get_req("/api/v1/ping")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"pong");
}

#[tokio::test]
async fn unknown_route_yields_problem_404() {
    let router = ApiIngress::default().build_router(api(), None);
    let resp = router.oneshot(get_req("/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let ct = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    assert_eq!(ct.as_deref(), Some(APPLICATION_PROBLEM_JSON));
    let json = body_json(resp).await;
    assert_eq!(json["status"], 404);
    assert_eq!(json["instance"], "/nope");
}

#[tokio::test]
async fn openapi_served_when_docs_enabled() {
    let router = ApiIngress::default().build_router(api(), Some(TestDoc::openapi()));

    let resp = router.clone().oneshot(get_req("/openapi.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["info"]["title"], "test api");

    let resp = router.oneshot(get_req("/docs")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn openapi_hidden_when_docs_disabled() {
    let ingress = ApiIngress::new(ApiIngressConfig {
        enable_docs: false,
        ..Default::default()
    });
    let router = ingress.build_router(api(), Some(TestDoc::openapi()));
    let resp = router.oneshot(get_req("/openapi.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let ingress = ApiIngress::new(ApiIngressConfig {
        body_limit_bytes: 16,
        ..Default::default()
    });
    let router = ingress.build_router(api(), None);
    let resp = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/echo")
                .body(Body::from("x".repeat(1024)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn serve_stops_on_cancellation() {
    let ingress = ApiIngress::default();
    let router = ingress.build_router(api(), None);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let cancel = CancellationToken::new();

    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { ingress.serve_on(listener, router, cancel).await })
    };

    cancel.cancel();
    let res = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("server should stop after cancellation")
        .expect("server task should not panic");
    assert!(res.is_ok());
}
