//! MCP Protocol Helpers
//!
//! This module contains helper functions for JSON-RPC communication
//! and for cleaning catalog text before it reaches a widget.

use super::models::JSONRPC_VERSION;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

/// Builds a JSON-RPC 2.0 success response.
///
/// # Arguments
///
/// * `id` – The request identifier that must be echoed back.
/// * `result` – The payload representing the successful outcome.
pub fn rpc_success(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "result": result,
    })
}

/// Builds a JSON-RPC 2.0 error response.
///
/// # Arguments
///
/// * `id` – The request identifier (or `null` if unavailable).
/// * `code` – The JSON-RPC error code (e.g., -32601 for method not found).
/// * `message` – Human-readable description of the error.
pub fn rpc_error(id: Value, code: i32, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": {
            "code": code,
            "message": message.into(),
        }
    })
}

static BLOCK_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(br|p|div)\s*/?>").expect("valid regex"));
static BLOCK_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</(p|div)>").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Turns an HTML product description into plain text.
///
/// Entities are decoded, block tags become line breaks, every other tag is
/// dropped and whitespace runs collapse to a single space.
pub fn strip_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let decoded = decode_entities(html);
    let text = BLOCK_OPEN.replace_all(&decoded, "\n");
    let text = BLOCK_CLOSE.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

fn decode_entities(text: &str) -> String {
    // &amp; last so "&amp;lt;" decodes to "&lt;" and not "<"
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_envelopes() {
        let success = rpc_success(json!(1), json!("ok"));
        assert_eq!(success["result"], "ok");
        assert_eq!(success["id"], 1);

        let error = rpc_error(json!(2), -1, "fail");
        assert_eq!(error["error"]["message"], "fail");
        assert_eq!(error["id"], 2);
    }

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let html = "<p>Smart TV <b>55\"</b></p><div>4K&nbsp;UHD</div><br/>Wi-Fi &amp; HDMI";
        assert_eq!(strip_html(html), "Smart TV 55\" 4K UHD Wi-Fi & HDMI");
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(strip_html("   "), "");
        assert_eq!(strip_html("plain text"), "plain text");
    }

    #[test]
    fn escaped_markup_is_not_treated_as_tags() {
        assert_eq!(strip_html("a &amp;lt;b&amp;gt; c"), "a &lt;b&gt; c");
    }
}
