//! Commerce MCP Library
//!
//! This library provides a Model Context Protocol server exposing a product
//! catalog and a shopping cart to ChatGPT, with HTML widgets for rendering
//! results.

// Core layers
pub mod application;
pub mod domain;
pub mod infrastructure;

// MCP surface
pub mod mcp;
pub mod tools;
pub mod widgets;

// Runtime
pub mod config;
pub mod error;
pub mod router;
pub mod state;
