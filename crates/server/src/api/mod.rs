use crate::config::AppState;
use anyhow::Result;
use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod handlers;

/// Start the HTTP server
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP endpoint listening on http://{}/mcp", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/mcp", post(handlers::handle_mcp))
        .route("/mcp/health", get(health_check))
        .fallback(not_found)
        // Middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::with_details("Not found", uri.path())),
    )
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use budgetkey_client::{BudgetKeyClient, RetryConfig};
    use budgetkey_mcp::McpServer;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn router(base: &str) -> Router {
        let client = BudgetKeyClient::builder()
            .base_url(base)
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap();
        create_router(AppState::from_server(McpServer::with_client(client)))
    }

    fn post_mcp(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router("http://127.0.0.1:1")
            .oneshot(Request::get("/mcp/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router("http://127.0.0.1:1")
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["details"], "/nope");
    }

    #[tokio::test]
    async fn test_tools_list_over_http() {
        let response = router("http://127.0.0.1:1")
            .oneshot(post_mcp(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["mcp-protocol-version"],
            budgetkey_mcp::protocol::LATEST_PROTOCOL_VERSION
        );

        let body = body_json(response).await;
        let names: Vec<&str> = body["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["DatasetInfo", "DatasetFullTextSearch", "DatasetDBQuery"]);
    }

    #[tokio::test]
    async fn test_protocol_version_header_is_echoed() {
        let mut request = post_mcp(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}));
        request
            .headers_mut()
            .insert("mcp-protocol-version", "2025-03-26".parse().unwrap());

        let response = router("http://127.0.0.1:1").oneshot(request).await.unwrap();
        assert_eq!(response.headers()["mcp-protocol-version"], "2025-03-26");
    }

    #[tokio::test]
    async fn test_notification_is_accepted_without_body() {
        let response = router("http://127.0.0.1:1")
            .oneshot(post_mcp(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_gets_parse_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/mcp")
            .body(Body::from("{not json"))
            .unwrap();

        let response = router("http://127.0.0.1:1").oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_tool_call_over_http() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tables/budget_items_data/query"))
            .and(query_param("query", "SELECT 1"))
            .and(query_param("page_size", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rows": [{"?column?": 1}],
                "total": 1
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let response = router(&upstream.uri())
            .oneshot(post_mcp(json!({
                "jsonrpc": "2.0",
                "id": "call-1",
                "method": "tools/call",
                "params": {
                    "name": "DatasetDBQuery",
                    "arguments": {"dataset": "budget_items_data", "query": "SELECT 1"}
                }
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], "call-1");
        assert_ne!(body["result"]["isError"], true);
        assert_eq!(body["result"]["structuredContent"]["total"], 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_tool_error() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tables/contracts_data/search"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&upstream)
            .await;

        let response = router(&upstream.uri())
            .oneshot(post_mcp(json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {
                    "name": "DatasetFullTextSearch",
                    "arguments": {"dataset": "contracts_data", "q": "road"}
                }
            })))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["result"]["isError"], true);
        assert_eq!(body["result"]["structuredContent"]["error"]["kind"], "UpstreamError");
    }
}
