use crate::config::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use budgetkey_mcp::protocol::negotiate_protocol_version;
use std::sync::Arc;

static MCP_PROTOCOL_VERSION: HeaderName = HeaderName::from_static("mcp-protocol-version");

/// Handle one JSON-RPC message posted to the MCP endpoint.
///
/// Requests get `200` with the JSON-RPC response, including protocol-level
/// errors. Notifications get `202 Accepted` with an empty body.
pub async fn handle_mcp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let requested = headers
        .get(&MCP_PROTOCOL_VERSION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let version = negotiate_protocol_version(requested);

    match state.mcp.handle_message(&body).await {
        Some(response) => (
            StatusCode::OK,
            [(MCP_PROTOCOL_VERSION.clone(), HeaderValue::from_static(version))],
            Json(response),
        )
            .into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
