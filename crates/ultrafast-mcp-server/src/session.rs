//! Per-connection session state: negotiated dialect, stored client
//! capabilities, and resource subscriptions, keyed by `sessionId()`.
//!
//! Grounded on the registration-order, reader/writer-locked table shape
//! used throughout the rest of the server (`resource_registry.rs`,
//! `prompt_registry.rs`) rather than inventing a new concurrency idiom: one
//! `RwLock<HashMap<...>>` guarding a flat table of sessions, the same
//! pattern the donor workspace uses for its tool/resource/prompt tables.
//! The donor itself never modeled sessions at all — a single process-wide
//! `negotiated_version` covered every connection — so this module has no
//! direct donor counterpart; it follows the donor's *shape* while filling
//! in behavior the donor never needed (one connection at a time, in
//! practice, for its stdio-first examples).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use ultrafast_mcp_core::protocol::capabilities::ClientCapabilities;
use ultrafast_mcp_core::protocol::version::Dialect;

/// A session's lifecycle: `New` on first contact, `Negotiating` once
/// `initialize` has set a protocol version but `initialized` hasn't
/// landed yet, `Ready` once it has, `Closed` after `shutdown`/disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    New,
    Negotiating,
    Ready,
    Closed,
}

struct Session {
    state: SessionState,
    negotiated_version: Option<String>,
    client_capabilities: Option<ClientCapabilities>,
    subscriptions: HashSet<String>,
}

impl Session {
    fn new() -> Self {
        Self {
            state: SessionState::New,
            negotiated_version: None,
            client_capabilities: None,
            subscriptions: HashSet::new(),
        }
    }
}

/// Owns every live session's negotiated dialect, client capabilities, and
/// `uri -> {sessionIds}` resource subscriptions. One instance per
/// `UltraFastServer`; cheap to clone (it's just the `Arc`).
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a session, idempotently. Called once per connection
    /// (stdio: once at transport start; HTTP: on first message carrying a
    /// new session id).
    pub async fn ensure_session(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(Session::new);
    }

    /// Record the dialect negotiated by `initialize`, per the rule that
    /// this is set exactly once, before `initialized` makes the session
    /// ready.
    pub async fn set_negotiated_version(&self, session_id: &str, version: &str) {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(Session::new);
        session.negotiated_version = Some(version.to_string());
        session.state = SessionState::Negotiating;
    }

    pub async fn set_client_capabilities(&self, session_id: &str, capabilities: ClientCapabilities) {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(Session::new);
        session.client_capabilities = Some(capabilities);
    }

    /// Move a negotiating session to `Ready` once `initialized` arrives.
    pub async fn mark_ready(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(session_id) {
            session.state = SessionState::Ready;
        }
    }

    pub async fn mark_closed(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(session_id) {
            session.state = SessionState::Closed;
        }
    }

    pub async fn state(&self, session_id: &str) -> SessionState {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|s| s.state)
            .unwrap_or(SessionState::New)
    }

    pub async fn negotiated_version(&self, session_id: &str) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .and_then(|s| s.negotiated_version.clone())
    }

    /// The negotiated dialect, defaulting to the newest/most permissive
    /// dialect (`V2025`) for a session that hasn't negotiated one yet.
    pub async fn negotiated_dialect(&self, session_id: &str) -> Dialect {
        self.negotiated_version(session_id)
            .await
            .as_deref()
            .and_then(Dialect::for_version)
            .unwrap_or(Dialect::V2025)
    }

    pub async fn client_capabilities(&self, session_id: &str) -> Option<ClientCapabilities> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .and_then(|s| s.client_capabilities.clone())
    }

    pub async fn subscribe(&self, session_id: &str, uri: &str) {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(Session::new);
        session.subscriptions.insert(uri.to_string());
    }

    pub async fn unsubscribe(&self, session_id: &str, uri: &str) {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.subscriptions.remove(uri);
        }
    }

    /// Drop every subscription a session holds (an empty-uri subscribe
    /// request is read as "unsubscribe everything").
    pub async fn unsubscribe_all(&self, session_id: &str) {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.subscriptions.clear();
        }
    }

    /// Every session currently subscribed to `uri`, for fanning out a
    /// `resources/updated` notification.
    pub async fn subscribers(&self, uri: &str) -> Vec<String> {
        self.sessions
            .read()
            .await
            .iter()
            .filter(|(_, session)| session.subscriptions.contains(uri))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub async fn remove(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// Wipe every session. Used on a full server shutdown.
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_session_defaults_to_v2025() {
        let manager = SessionManager::new();
        assert_eq!(manager.negotiated_dialect("absent").await, Dialect::V2025);
        assert_eq!(manager.state("absent").await, SessionState::New);
    }

    #[tokio::test]
    async fn negotiated_version_is_scoped_per_session() {
        let manager = SessionManager::new();
        manager.set_negotiated_version("a", "2024-11-05").await;
        manager.set_negotiated_version("b", "2025-06-18").await;

        assert_eq!(manager.negotiated_dialect("a").await, Dialect::V2024);
        assert_eq!(manager.negotiated_dialect("b").await, Dialect::V2025);
        assert_eq!(manager.state("a").await, SessionState::Negotiating);

        manager.mark_ready("a").await;
        assert_eq!(manager.state("a").await, SessionState::Ready);
    }

    #[tokio::test]
    async fn subscriptions_are_scoped_per_session() {
        let manager = SessionManager::new();
        manager.subscribe("a", "file:///x").await;
        manager.subscribe("b", "file:///x").await;
        manager.subscribe("a", "file:///y").await;

        let mut subs = manager.subscribers("file:///x").await;
        subs.sort();
        assert_eq!(subs, vec!["a".to_string(), "b".to_string()]);

        manager.unsubscribe("a", "file:///x").await;
        assert_eq!(manager.subscribers("file:///x").await, vec!["b".to_string()]);

        manager.unsubscribe_all("b").await;
        assert!(manager.subscribers("file:///x").await.is_empty());
    }

    #[tokio::test]
    async fn clear_drops_every_session() {
        let manager = SessionManager::new();
        manager.set_negotiated_version("a", "2025-06-18").await;
        manager.clear().await;
        assert_eq!(manager.state("a").await, SessionState::New);
    }
}
