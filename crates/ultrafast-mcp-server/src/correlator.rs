//! Outbound request correlator
//!
//! A server handler occasionally needs to call back into the client — to
//! invoke a client-provided tool (`ctx.call_tool`) or to ask the client's LLM
//! to sample a completion (`ctx.create_message`). Both are ordinary JSON-RPC
//! requests, just travelling server→client instead of client→server, and
//! the reply comes back on the same transport the server is reading
//! `tools/call` requests from. [`RequestCorrelator`] is the map from a
//! request id the server generated to the oneshot channel that is waiting
//! on its eventual response.
//!
//! This is the server-side mirror of [`ultrafast_mcp_core::utils::cancellation::CancellationManager`]:
//! that one remembers which *inbound* ids have been cancelled, this one
//! remembers which *outbound* ids are still awaited.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};

use ultrafast_mcp_core::protocol::jsonrpc::JsonRpcResponse;

/// Default timeout applied to a server→client request when the caller does
/// not supply its own.
pub const DEFAULT_OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure modes specific to waiting on a correlated outbound request.
#[derive(Debug)]
pub enum CorrelatorError {
    /// No response arrived within the allotted timeout.
    Timeout,
    /// The waiting half was dropped before a response arrived — the
    /// transport closed, or the registration was abandoned.
    Closed,
}

impl std::fmt::Display for CorrelatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelatorError::Timeout => write!(f, "outbound request timed out"),
            CorrelatorError::Closed => {
                write!(f, "response channel closed before a reply arrived")
            }
        }
    }
}

impl std::error::Error for CorrelatorError {}

/// Tracks outstanding server→client requests, keyed by the stringified
/// request id. One entry per in-flight request; removed on delivery,
/// timeout, or explicit abandonment.
#[derive(Debug, Default)]
pub struct RequestCorrelator {
    pending: Mutex<HashMap<String, oneshot::Sender<JsonRpcResponse>>>,
}

impl RequestCorrelator {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Register a fresh outbound request id *before* the request is sent to
    /// the transport, so a reply racing the send can never be missed.
    /// Returns the receiving half of its single-shot delivery channel.
    pub async fn register(&self, id: impl Into<String>) -> oneshot::Receiver<JsonRpcResponse> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.into(), tx);
        rx
    }

    /// Deliver an inbound response to whichever caller registered its id.
    /// Returns `true` if a waiter was found (whether or not it was still
    /// listening — a caller that timed out concurrently just drops the
    /// send on the floor).
    pub async fn complete(&self, response: JsonRpcResponse) -> bool {
        let Some(id) = response.id.as_ref().map(|id| id.to_string()) else {
            return false;
        };
        let sender = self.pending.lock().await.remove(&id);
        match sender {
            Some(tx) => {
                let _ = tx.send(response);
                true
            }
            None => false,
        }
    }

    /// Drop a pending registration without a response ever arriving —
    /// invoked after a timeout or when the awaiting context is cancelled, so
    /// a late reply finds no listener instead of leaking the map entry.
    pub async fn abandon(&self, id: &str) {
        self.pending.lock().await.remove(id);
    }

    /// Number of requests currently awaiting a reply. Exposed for tests and
    /// diagnostics.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ultrafast_mcp_core::protocol::jsonrpc::RequestId;

    #[tokio::test]
    async fn delivers_response_to_registered_waiter() {
        let correlator = RequestCorrelator::new();
        let rx = correlator.register("req-1").await;
        assert_eq!(correlator.pending_count().await, 1);

        let response = JsonRpcResponse::success(
            serde_json::json!({"ok": true}),
            Some(RequestId::string("req-1")),
        );
        assert!(correlator.complete(response).await);
        assert_eq!(correlator.pending_count().await, 0);

        let delivered = rx.await.expect("response delivered");
        assert_eq!(delivered.result, Some(serde_json::json!({"ok": true})));
    }

    #[tokio::test]
    async fn unregistered_id_is_not_delivered() {
        let correlator = RequestCorrelator::new();
        let response =
            JsonRpcResponse::success(serde_json::json!(null), Some(RequestId::string("nobody")));
        assert!(!correlator.complete(response).await);
    }

    #[tokio::test]
    async fn abandon_removes_pending_entry() {
        let correlator = RequestCorrelator::new();
        let _rx = correlator.register("req-2").await;
        correlator.abandon("req-2").await;
        assert_eq!(correlator.pending_count().await, 0);

        // A reply that arrives after abandonment finds no listener.
        let response = JsonRpcResponse::success(
            serde_json::json!(null),
            Some(RequestId::string("req-2")),
        );
        assert!(!correlator.complete(response).await);
    }

    #[tokio::test]
    async fn response_without_id_is_ignored() {
        let correlator = RequestCorrelator::new();
        let response = JsonRpcResponse::success(serde_json::json!(null), None);
        assert!(!correlator.complete(response).await);
    }
}
