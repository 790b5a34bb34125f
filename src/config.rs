//! Runtime configuration
//!
//! Values come from command-line flags with environment variable fallbacks.
//! `main` loads a `.env` file (if any) before parsing.

use clap::{Parser, ValueEnum};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Which catalog backend serves product queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProductRepositoryKind {
    /// Fixed demo catalog.
    InMemory,
    /// Live VTEX storefront search API, keyed by shop key.
    Vtex,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "commerce-mcp", version, about = "Catalog and cart MCP server for ChatGPT widgets")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "MCP_BIND", default_value = "127.0.0.1:4444")]
    pub bind: SocketAddr,

    /// Catalog backend
    #[arg(long, env = "PRODUCT_REPOSITORY", value_enum, default_value = "in-memory")]
    pub product_repository: ProductRepositoryKind,

    /// Request timeout for the VTEX backend, in seconds
    #[arg(long, env = "VTEX_TIMEOUT_SECS", default_value_t = 30)]
    pub vtex_timeout_secs: u64,

    /// Public origin used in widget asset URLs (e.g. an ngrok tunnel).
    /// Falls back to the request's Host header.
    #[arg(long, env = "PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Directory holding the compiled widget bundles
    #[arg(long, env = "WWWROOT", default_value = "wwwroot")]
    pub wwwroot: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 4444)),
            product_repository: ProductRepositoryKind::InMemory,
            vtex_timeout_secs: 30,
            public_base_url: None,
            wwwroot: PathBuf::from("wwwroot"),
            log_json: false,
        }
    }
}

impl Config {
    pub fn vtex_timeout(&self) -> Duration {
        Duration::from_secs(self.vtex_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_defaults_match_default_impl() {
        let parsed = Config::try_parse_from(["commerce-mcp"]).unwrap();
        let default = Config::default();
        assert_eq!(parsed.bind, default.bind);
        assert_eq!(parsed.product_repository, default.product_repository);
        assert_eq!(parsed.vtex_timeout_secs, default.vtex_timeout_secs);
        assert_eq!(parsed.wwwroot, default.wwwroot);
    }

    #[test]
    fn vtex_backend_is_selectable() {
        let parsed =
            Config::try_parse_from(["commerce-mcp", "--product-repository", "vtex"]).unwrap();
        assert_eq!(parsed.product_repository, ProductRepositoryKind::Vtex);
    }
}
