//! Application State
//!
//! Everything a request handler can reach: the mediator over the
//! repositories, runtime configuration, the open MCP sessions and the
//! requests currently running.

use crate::application::Mediator;
use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::{
    build_mediator, InMemoryCartRepository, InMemoryProductRepository, InMemorySellerRepository,
};
use crate::mcp::{cancellation::InFlightRequests, session::SessionStore};
use axum::http::HeaderMap;
use std::sync::Arc;

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub mediator: Mediator,
    pub config: Config,
    pub sessions: SessionStore,
    pub in_flight: InFlightRequests,
}

impl Default for AppState {
    /// In-memory repositories and default configuration.
    fn default() -> Self {
        let mediator = Mediator::new(
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemorySellerRepository::new()),
            Arc::new(InMemoryCartRepository::new()),
        );
        Self::with_mediator(Config::default(), mediator)
    }
}

impl AppState {
    /// Builds the repositories selected by `config`.
    pub fn new(config: Config) -> Result<Self> {
        let mediator = build_mediator(&config)?;
        Ok(Self::with_mediator(config, mediator))
    }

    pub fn with_mediator(config: Config, mediator: Mediator) -> Self {
        Self {
            mediator,
            config,
            sessions: SessionStore::new(),
            in_flight: InFlightRequests::new(),
        }
    }

    /// Origin widget shells load their bundles from: the configured public
    /// URL, else `https://{Host}`, else localhost.
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(url) = self
            .config
            .public_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
        {
            return url.trim_end_matches('/').to_string();
        }

        match headers
            .get(axum::http::header::HOST)
            .and_then(|host| host.to_str().ok())
            .filter(|host| !host.is_empty())
        {
            Some(host) => format!("https://{host}"),
            None => format!("https://localhost:{}", self.config.bind.port()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn base_url_prefers_configuration() {
        let mut state = AppState::default();
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("abc.ngrok.app"));

        assert_eq!(state.base_url(&headers), "https://abc.ngrok.app");
        assert_eq!(state.base_url(&HeaderMap::new()), "https://localhost:4444");

        state.config.public_base_url = Some("https://shop.example.com/".into());
        assert_eq!(state.base_url(&headers), "https://shop.example.com");
    }
}
