//! HTTP route handlers for the storefront backend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (catalog readable)
//! GET  /api/inventory          - Current catalog snapshot (JSON)
//! GET  /ws                     - WebSocket upgrade for the live session protocol
//! ```

pub mod health;
pub mod inventory;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::gateway::ws_handler;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api/inventory", get(inventory::snapshot))
        .route("/ws", get(ws_handler))
}

/// Build the full application: routes, middleware and state.
///
/// Sentry layers are added by the binary so tests can serve this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::config::StorefrontConfig;
    use crate::middleware::REQUEST_ID_HEADER;

    fn test_app() -> Router {
        let state = AppState::new(
            StorefrontConfig::default(),
            Arc::new(InMemoryCatalog::default()),
        );
        app(state)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let response = test_app().oneshot(get_request("/health")).await.unwrap();
        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_keeps_incoming_request_id() {
        let request = Request::builder()
            .uri("/health")
            .header(REQUEST_ID_HEADER, "edge-42")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "edge-42");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let request = Request::builder()
            .uri("/api/inventory")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_ws_requires_upgrade() {
        let response = test_app().oneshot(get_request("/ws")).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = test_app().oneshot(get_request("/products")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
