//! Model Context Protocol (MCP) Module
//!
//! This module contains all MCP protocol implementation, including:
//! - Protocol models (JsonRpcRequest, constants)
//! - RPC helpers (success/error responses)
//! - Parameter schemas, widget metadata and the tool/resource registry
//! - Sessions, in-flight cancellation and the HTTP handlers (initialize, tools/list, tools/call, etc.)

pub mod cancellation;
pub mod handlers;
pub mod helpers;
pub mod metadata;
pub mod models;
pub mod registry;
pub mod schema;
pub mod session;

// Re-export commonly used types and functions
pub use handlers::routes;
pub use registry::{Arguments, Registry, RequestContext, Resource, Tool, ToolOutput};
