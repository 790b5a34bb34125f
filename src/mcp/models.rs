//! MCP Protocol Models and Constants
//!
//! This module contains the data structures and constants related to the
//! Model Context Protocol (MCP) transport.

use serde::Deserialize;
use serde_json::Value;

// =============================================================================
// MCP Constants
// =============================================================================

/// MIME type for the widget
pub const WIDGET_MIME_TYPE: &str = "text/html+skybridge";
/// Server identifier
pub const SERVER_NAME: &str = "commerce-mcp";
/// Protocol version for MCP
pub const PROTOCOL_VERSION: &str = "2024-11-05";
/// JSON-RPC version accepted and emitted
pub const JSONRPC_VERSION: &str = "2.0";
/// Header carrying the session id issued by `initialize`
pub const SESSION_HEADER: &str = "mcp-session-id";

// =============================================================================
// MCP Protocol Models
// =============================================================================

/// Standard JSON-RPC 2.0 Request envelope
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version; anything but "2.0" is rejected
    pub jsonrpc: Option<String>,

    /// Method name to invoke
    pub method: String,

    /// Parameters for the method
    pub params: Option<Value>,

    /// Request identifier
    pub id: Option<Value>,
}

/// `tools/call` parameters
#[derive(Debug, Default, Deserialize)]
pub struct CallToolParams {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub arguments: Value,
}

/// `resources/read` parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReadResourceParams {
    #[serde(default)]
    pub uri: String,
}

/// `notifications/cancelled` parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledParams {
    #[serde(default)]
    pub request_id: Value,

    #[serde(default)]
    pub reason: Option<String>,
}
