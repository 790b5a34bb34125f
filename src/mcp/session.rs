//! MCP sessions
//!
//! `initialize` opens a session and returns its id in the `Mcp-Session-Id`
//! header. Each session caches the registry it was opened with; calls without
//! a session id (or with one the server does not know) use the shared
//! registry directly.
//!
//! Clients rarely end their sessions, so idle sessions expire and the store
//! is capped; both are enforced whenever a session is opened.

use super::registry::Registry;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// Sessions unused for this long are dropped.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Upper bound on open sessions.
pub const MAX_SESSIONS: usize = 10_000;

struct Session {
    registry: Arc<Registry>,
    last_seen: Instant,
}

pub struct SessionStore {
    sessions: DashMap<String, Session>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(SESSION_IDLE_TIMEOUT, MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Opens a session and returns its id.
    pub fn open(&self) -> Result<String> {
        let registry = Registry::shared()?;
        self.evict();

        let id = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            id.clone(),
            Session {
                registry,
                last_seen: Instant::now(),
            },
        );
        debug!(session = %id, "session opened");
        Ok(id)
    }

    /// Registry for the given session id. Refreshes the session's idle timer.
    pub fn registry_for(&self, session_id: Option<&str>) -> Result<Arc<Registry>> {
        match session_id.and_then(|id| self.sessions.get_mut(id)) {
            Some(mut session) => {
                session.last_seen = Instant::now();
                Ok(Arc::clone(&session.registry))
            }
            None => Registry::shared(),
        }
    }

    /// Closes a session. Returns whether it existed.
    pub fn close(&self, session_id: &str) -> bool {
        let closed = self.sessions.remove(session_id).is_some();
        if closed {
            debug!(session = %session_id, "session closed");
        }
        closed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops expired sessions, then the least recently used ones until there
    /// is room for one more.
    fn evict(&self) {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.last_seen.elapsed() < self.idle_timeout);

        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.value().last_seen)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(id) => {
                    self.sessions.remove(&id);
                }
                None => break,
            }
        }

        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!(evicted, "sessions evicted");
        }
    }
}
