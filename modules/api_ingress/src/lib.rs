//! HTTP host: owns the axum router, the shared middleware stack and the
//! listener lifecycle. Feature crates hand in their routes and OpenAPI
//! document; this crate wraps them and serves until cancelled.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{header, Uri};
use axum::response::IntoResponse;
use axum::{middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod problem;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use problem::{Problem, ProblemResponse, ValidationViolation, APPLICATION_PROBLEM_JSON};

#[derive(Debug, Clone, Default)]
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

    /// Resolve the listen address: `bind_addr` wins over the server host/port pair.
    pub fn resolve_bind_addr(&self, host: &str, port: u16) -> Result<SocketAddr> {
        let raw = match &self.config.bind_addr {
            Some(addr) => addr.clone(),
            None => format!("{host}:{port}"),
        };
        raw.parse()
            .with_context(|| format!("Invalid bind address '{raw}'"))
    }

    /// Merge the feature routes with the host endpoints and apply the middleware stack.
    ///
    /// Layers are added innermost first; on the way in a request passes
    /// SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
    /// -> Timeout -> CORS -> BodyLimit before reaching a handler.
    pub fn build_router(&self, api: Router, openapi: Option<utoipa::openapi::OpenApi>) -> Router {
        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .route("/healthz", get(web::healthz))
            .merge(api)
            .fallback(route_not_found);

        match openapi {
            Some(doc) if self.config.enable_docs => {
                let doc = Arc::new(doc);
                router = router
                    .route(
                        "/openapi.json",
                        get(move || {
                            let doc = doc.clone();
                            async move {
                                ([(header::CACHE_CONTROL, "no-store")], axum::Json((*doc).clone()))
                                    .into_response()
                            }
                        }),
                    )
                    .route("/docs", get(web::serve_docs));
                tracing::debug!("OpenAPI document and docs UI mounted");
            }
            _ => tracing::debug!("docs disabled"),
        }

        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router = router
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_sec,
            )))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer());

        let x_request_id = request_id::header();
        router
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind `addr` and serve `router` until `cancel` fires.
    pub async fn serve(
        &self,
        addr: SocketAddr,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        self.serve_on(listener, router, cancel).await
    }

    /// Serve on an already bound listener; used by tests that bind port 0.
    pub async fn serve_on(
        &self,
        listener: TcpListener,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let local = listener.local_addr()?;
        tracing::info!("HTTP server bound on {}", local);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

async fn route_not_found(uri: Uri) -> ProblemResponse {
    problem::not_found(format!("No route for {}", uri.path()))
        .0
        .with_instance(uri.path())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_defaults_to_server_host_and_port() {
        let ingress = ApiIngress::default();
        let addr = ingress.resolve_bind_addr("127.0.0.1", 8040).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8040");
    }

    #[test]
    fn explicit_bind_addr_wins() {
        let ingress = ApiIngress::new(ApiIngressConfig {
            bind_addr: Some("0.0.0.0:9000".into()),
            ..Default::default()
        });
        let addr = ingress.resolve_bind_addr("127.0.0.1", 8040).unwrap();
        assert_eq!(addr.port(), 9000);
    }

    #[test]
    fn invalid_bind_addr_is_reported() {
        let ingress = ApiIngress::new(ApiIngressConfig {
            bind_addr: Some("not-an-address".into()),
            ..Default::default()
        });
        let err = ingress.resolve_bind_addr("127.0.0.1", 8040).unwrap_err();
        assert!(err.to_string().contains("not-an-address"));
    }
}
