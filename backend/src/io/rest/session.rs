//! Bearer-token sessions.
//!
//! Login stores a [`SessionContext`] under a random token; handlers pull it
//! back out with the [`CurrentSession`] extractor and pass it to services.
//! A session expires after a period without requests. Expired sessions are
//! dropped when they are next looked up and whenever a new one is opened.

use super::error::ApiError;
use crate::domain::SessionContext;
use crate::AppState;
use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

struct SessionEntry {
    ctx: SessionContext,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    fn is_expired(&self, entry: &SessionEntry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) >= self.idle_timeout
    }

    /// Register a session and return its token
    pub async fn open(&self, ctx: SessionContext) -> String {
        let token = Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        if sessions.len() < before {
            debug!(pruned = before - sessions.len(), "dropped expired sessions");
        }
        sessions.insert(
            token.clone(),
            SessionEntry {
                ctx,
                last_seen: now,
            },
        );
        token
    }

    /// Look up a live session and mark it as used
    pub async fn get(&self, token: &str) -> Option<SessionContext> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let expired = self.is_expired(sessions.get(token)?, now);
        if expired {
            sessions.remove(token);
            return None;
        }
        let entry = sessions.get_mut(token)?;
        entry.last_seen = now;
        Some(entry.ctx.clone())
    }

    /// Number of sessions held, expired ones included until pruned
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns whether the token was known
    pub async fn close(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
    pub ctx: SessionContext,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?
            .to_string();
        let ctx = state
            .sessions
            .get(&token)
            .await
            .ok_or_else(|| ApiError::Unauthorized("session expired or unknown".to_string()))?;
        Ok(CurrentSession { token, ctx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::test_sessions::admin;

    #[tokio::test]
    async fn test_open_get_close() {
        let registry = SessionRegistry::new();
        let token = registry.open(admin()).await;
        assert_eq!(registry.get(&token).await, Some(admin()));
        assert!(registry.close(&token).await);
        assert!(!registry.close(&token).await);
        assert_eq!(registry.get(&token).await, None);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire_and_are_pruned() {
        let registry = SessionRegistry::with_idle_timeout(Duration::ZERO);
        let first = registry.open(admin()).await;
        let second = registry.open(admin()).await;
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.get(&first).await, None);
        assert_eq!(registry.get(&second).await, None);
        assert_eq!(registry.len().await, 0);

        let registry = SessionRegistry::with_idle_timeout(Duration::from_secs(3600));
        let token = registry.open(admin()).await;
        registry.open(admin()).await;
        assert_eq!(registry.len().await, 2);
        assert_eq!(registry.get(&token).await, Some(admin()));
    }
}
