use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use xid_attest_core::Trust;

use crate::service::XidResolver;

/// Common response type that can be either data or an error
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiResponse<T> {
    Success(T),
    Error { error: String },
}

/// Create the service router over a shared resolver
pub fn create_router(resolver: Arc<XidResolver>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .route("/v1/resolve/:domain", get(resolve_domain))
        .route("/v1/reverse/:address", get(reverse_lookup))
        .route("/v1/admin/clear-cache", post(clear_cache))
        .with_state(resolver)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn status(State(resolver): State<Arc<XidResolver>>) -> impl IntoResponse {
    let config = resolver.config();
    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "xid-attest-resolver",
        "rpc_url": config.rpc_url,
        "managed_tld": config.managed_tld,
        "chain_id": resolver.identity().chain_id(),
    }))
}

/// Response for the resolve endpoint
#[derive(Debug, Serialize)]
struct ResolveResponse {
    domain: String,
    address: String,
    trust: Trust,
}

/// Resolve a domain to its site address
async fn resolve_domain(
    State(resolver): State<Arc<XidResolver>>,
    Path(domain): Path<String>,
) -> impl IntoResponse {
    let entry = resolver.resolve_entry(&domain).await;

    match entry {
        Some(entry) if entry.address.is_some() => {
            let data = ResolveResponse {
                domain: entry.domain,
                address: entry.address.unwrap_or_default(),
                trust: entry.trust,
            };
            (StatusCode::OK, Json(ApiResponse::Success(data)))
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::Error {
                error: format!("No site address found for {}", domain),
            }),
        ),
    }
}

/// Response for the reverse endpoint
#[derive(Debug, Serialize)]
struct ReverseResponse {
    address: String,
    domain: String,
}

/// Find the verified domain of a site address
async fn reverse_lookup(
    State(resolver): State<Arc<XidResolver>>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    match resolver.reverse_lookup(&address).await {
        Some(domain) => (
            StatusCode::OK,
            Json(ApiResponse::Success(ReverseResponse { address, domain })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::Error {
                error: format!("No verified domain for {}", address),
            }),
        ),
    }
}

/// Drop every cached entry
async fn clear_cache(State(resolver): State<Arc<XidResolver>>) -> impl IntoResponse {
    Json(resolver.clear_cache())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn app(h: &Harness) -> Router {
        create_router(Arc::new(h.resolver.clone()))
    }

    #[tokio::test]
    async fn test_health() {
        let h = Harness::new();
        let (status, body) = call(app(&h), "GET", "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(SNAPSHOT, snapshot_doc("d1", &[("alice.epix", "epix1aaaa")], None));

        let (status, body) = call(app(&h), "GET", "/v1/resolve/Alice.epix").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"domain": "alice.epix", "address": "epix1aaaa", "trust": "attested"}));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(SNAPSHOT, snapshot_doc("d1", &[], None));

        let (status, body) = call(app(&h), "GET", "/v1/resolve/nobody.epix").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("nobody.epix"));
    }

    #[tokio::test]
    async fn test_reverse() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(SNAPSHOT, snapshot_doc("d1", &[("alice.epix", "epix1aaaa")], None));
        h.sites.insert("epix1aaaa", json!({"domain": "alice.epix"}));

        let (status, body) = call(app(&h), "GET", "/v1/reverse/epix1aaaa").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"address": "epix1aaaa", "domain": "alice.epix"}));

        let (status, _) = call(app(&h), "GET", "/v1/reverse/epix1unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let h = Harness::new();
        h.chain.healthy("d1");
        h.chain.respond(SNAPSHOT, snapshot_doc("d1", &[("alice.epix", "epix1aaaa")], None));
        h.resolver.resolve("alice.epix").await.unwrap();

        let (status, body) = call(app(&h), "POST", "/v1/admin/clear-cache").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"cleared": 1}));

        let (_, body) = call(app(&h), "POST", "/v1/admin/clear-cache").await;
        assert_eq!(body, json!({"cleared": 0}));
    }

    #[tokio::test]
    async fn test_status_reports_endpoint() {
        let h = Harness::new();
        let (status, body) = call(app(&h), "GET", "/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rpc_url"], "http://chain.test");
        assert_eq!(body["managed_tld"], "epix");
    }
}
