//! In-flight request tracking
//!
//! `tools/call` and `resources/read` register a [`CancellationToken`] under
//! their session and JSON-RPC id while they run. A `notifications/cancelled`
//! from the same session cancels the matching token; the registry then ends
//! the call with [`AppError::Cancelled`](crate::error::AppError::Cancelled).

use dashmap::DashMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Default)]
pub struct InFlightRequests {
    tokens: DashMap<String, CancellationToken>,
}

/// Keeps a request registered until dropped.
pub struct InFlightGuard<'a> {
    requests: &'a InFlightRequests,
    key: String,
    token: CancellationToken,
}

impl InFlightGuard<'_> {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.requests.tokens.remove(&self.key);
    }
}

fn key(session: Option<&str>, request_id: &Value) -> String {
    format!("{}/{}", session.unwrap_or_default(), request_id)
}

impl InFlightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a request and returns the guard holding its token.
    pub fn track(&self, session: Option<&str>, request_id: &Value) -> InFlightGuard<'_> {
        let key = key(session, request_id);
        let token = CancellationToken::new();
        self.tokens.insert(key.clone(), token.clone());
        InFlightGuard {
            requests: self,
            key,
            token,
        }
    }

    /// Cancels a running request. Returns `false` when nothing matched, which
    /// is normal when the request already finished.
    pub fn cancel(&self, session: Option<&str>, request_id: &Value) -> bool {
        match self.tokens.get(&key(session, request_id)) {
            Some(token) => {
                token.cancel();
                debug!(request = %request_id, "request cancelled by client");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cancel_reaches_only_the_matching_request() {
        let requests = InFlightRequests::new();
        let a = requests.track(Some("s1"), &json!(7));
        let b = requests.track(Some("s2"), &json!(7));
        let c = requests.track(Some("s1"), &json!("7"));

        assert!(requests.cancel(Some("s1"), &json!(7)));
        assert!(a.token().is_cancelled());
        assert!(!b.token().is_cancelled());
        assert!(!c.token().is_cancelled());
    }

    #[test]
    fn finished_requests_are_forgotten() {
        let requests = InFlightRequests::new();
        {
            let _guard = requests.track(None, &json!(1));
            assert_eq!(requests.len(), 1);
        }
        assert!(requests.is_empty());
        assert!(!requests.cancel(None, &json!(1)));
    }
}
