//! MCP (Model Context Protocol) route handlers
//!
//! JSON-RPC over HTTP POST, an SSE endpoint announcement on GET and session
//! teardown on DELETE. Tool and resource methods are dispatched through the
//! session's [`Registry`](super::registry::Registry).

use super::{helpers::*, models::*, registry::RequestContext};
use crate::error::{AppError, Result};
use crate::state::{AppState, SharedState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Creates routes for MCP-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/",
            post(handle_mcp).get(handle_mcp_sse).delete(handle_mcp_delete),
        )
        .route(
            "/mcp",
            post(handle_mcp).get(handle_mcp_sse).delete(handle_mcp_delete),
        )
        .route(
            "/mcp/",
            post(handle_mcp).get(handle_mcp_sse).delete(handle_mcp_delete),
        )
}

/// Handle SSE (Server-Sent Events) handshake for GET requests
async fn handle_mcp_sse() -> impl IntoResponse {
    (
        [("content-type", "text/event-stream")],
        "event: endpoint\ndata: /mcp\n\n",
    )
}

/// Endpoint: DELETE /mcp
/// Ends the session named by the `Mcp-Session-Id` header.
async fn handle_mcp_delete(State(state): State<SharedState>, headers: HeaderMap) -> StatusCode {
    match session_id(&headers) {
        Some(id) if state.sessions.close(id) => StatusCode::NO_CONTENT,
        Some(_) => StatusCode::NOT_FOUND,
        None => StatusCode::BAD_REQUEST,
    }
}

/// Endpoint: POST /mcp
/// Handles the Model Context Protocol communication for POST requests.
async fn handle_mcp(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: std::result::Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    // Parse JSON-RPC Request (POST)
    let req = match body {
        Ok(Json(r)) => r,
        Err(e) => {
            warn!(error = %e.body_text(), "JSON parse error");
            return (
                StatusCode::BAD_REQUEST,
                Json(rpc_error(Value::Null, -32700, "Parse error")),
            )
                .into_response();
        }
    };

    let id = req.id.unwrap_or(Value::Null);
    let params = req.params.unwrap_or(Value::Null);
    info!(method = %req.method, id = %id, "MCP call");

    if let Some(version) = req.jsonrpc.as_deref().filter(|v| *v != JSONRPC_VERSION) {
        warn!(version, "Unsupported JSON-RPC version");
        return Json(rpc_error(id, -32600, "Invalid Request")).into_response();
    }

    if req.method == "initialize" {
        return match state.sessions.open() {
            Ok(session) => {
                let mut response = Json(rpc_success(id, handle_initialize())).into_response();
                if let Ok(value) = HeaderValue::from_str(&session) {
                    response.headers_mut().insert(SESSION_HEADER, value);
                }
                response
            }
            Err(e) => Json(failure(id, &req.method, e)).into_response(),
        };
    }

    let session = session_id(&headers);
    let ctx = RequestContext {
        base_url: state.base_url(&headers),
    };

    // Cancellable through `notifications/cancelled` while it runs
    let in_flight = matches!(req.method.as_str(), "tools/call" | "resources/read")
        .then(|| state.in_flight.track(session, &id));
    let cancel = in_flight
        .as_ref()
        .map(|guard| guard.token().clone())
        .unwrap_or_default();

    let outcome = dispatch(&state, session, &req.method, params, ctx, &cancel).await;
    drop(in_flight);

    let response_body = match outcome {
        Some(Ok(result)) => rpc_success(id, result),
        Some(Err(e)) => failure(id, &req.method, e),
        None => {
            warn!(method = %req.method, "Unknown method");
            rpc_error(id, -32601, "Method not found")
        }
    };

    Json(response_body).into_response()
}

/// Runs one method. `None` means the method is not supported.
async fn dispatch(
    state: &AppState,
    session: Option<&str>,
    method: &str,
    params: Value,
    ctx: RequestContext,
    cancel: &CancellationToken,
) -> Option<Result<Value>> {
    let outcome = match method {
        "notifications/initialized" | "ping" => Ok(json!({})),
        "notifications/cancelled" => handle_cancelled(state, session, params),
        "tools/list" => state
            .sessions
            .registry_for(session)
            .map(|registry| registry.list_tools()),
        "resources/list" => state
            .sessions
            .registry_for(session)
            .map(|registry| registry.list_resources()),
        "resources/templates/list" => Ok(json!({ "resourceTemplates": [] })),
        "tools/call" => handle_tools_call(state, session, params, ctx, cancel).await,
        "resources/read" => handle_resources_read(state, session, params, ctx, cancel).await,
        _ => return None,
    };
    Some(outcome)
}

fn failure(id: Value, method: &str, err: AppError) -> Value {
    let code = err.rpc_code();
    if code == -32603 {
        error!(method, error = %err, "MCP call failed");
    } else {
        debug!(method, error = %err, "MCP call rejected");
    }
    rpc_error(id, code, err.to_string())
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

fn parse_params<T: DeserializeOwned + Default>(params: Value) -> Result<T> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params).map_err(|source| AppError::InvalidArguments {
        param: "params".into(),
        source,
    })
}

// =============================================================================
// MCP Method Handlers
// =============================================================================

/// Handles `initialize` request (Handshake).
fn handle_initialize() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "listChanged": false, "subscribe": false }
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// Handles `tools/call` request.
async fn handle_tools_call(
    state: &AppState,
    session: Option<&str>,
    params: Value,
    ctx: RequestContext,
    cancel: &CancellationToken,
) -> Result<Value> {
    let CallToolParams { name, arguments } = parse_params(params)?;
    let registry = state.sessions.registry_for(session)?;
    registry
        .call_tool(state, ctx, &name, &arguments, cancel)
        .await
}

/// Handles `resources/read` request.
async fn handle_resources_read(
    state: &AppState,
    session: Option<&str>,
    params: Value,
    ctx: RequestContext,
    cancel: &CancellationToken,
) -> Result<Value> {
    let ReadResourceParams { uri } = parse_params(params)?;
    let registry = state.sessions.registry_for(session)?;
    registry.read_resource(state, ctx, &uri, cancel).await
}

/// Handles `notifications/cancelled`.
fn handle_cancelled(state: &AppState, session: Option<&str>, params: Value) -> Result<Value> {
    let CancelledParams { request_id, reason } = parse_params(params)?;
    if !state.in_flight.cancel(session, &request_id) {
        debug!(
            request = %request_id,
            reason = reason.as_deref().unwrap_or_default(),
            "no running request to cancel"
        );
    }
    Ok(json!({}))
}
