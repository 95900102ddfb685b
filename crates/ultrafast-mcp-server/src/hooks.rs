//! Hook chain for wrapping ingress, dispatch, tool calls, outgoing
//! responses, and session lifecycle with user-supplied interceptors.
//!
//! Hooks run in registration order within their category. A hook failing in
//! an ingress/dispatch/tool-call stage short-circuits the rest of that
//! stage; [`BeforeSendResponseHook`] can additionally mutate or suppress a
//! response by returning `Ok(None)`. The hook lists live behind their own
//! reader/writer lock, kept separate from the tool/resource/prompt
//! registries and the request correlator so that registering or running a
//! hook never contends with unrelated server-state locks.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use ultrafast_mcp_core::{
    error::MCPResult,
    protocol::jsonrpc::{JsonRpcRequest, JsonRpcResponse},
    types::tools::ToolCallResponse,
};

/// Runs once a raw inbound frame has been deserialized, before it is
/// classified as a request, notification, or batch.
#[async_trait]
pub trait BeforeHandleMessageHook: Send + Sync {
    async fn before_handle_message(&self, raw: &Value) -> MCPResult<()>;
}

/// Runs before a request is routed to its method handler.
#[async_trait]
pub trait BeforeHandleRequestHook: Send + Sync {
    async fn before_handle_request(&self, request: &JsonRpcRequest) -> MCPResult<()>;
}

/// Runs before a notification is routed to its handler.
#[async_trait]
pub trait BeforeHandleNotificationHook: Send + Sync {
    async fn before_handle_notification(&self, notification: &JsonRpcRequest) -> MCPResult<()>;
}

/// Wraps a single `tools/call` invocation. `before_tool_call` may reject the
/// call outright (the engine then shapes its error like any other handler
/// failure); `after_tool_call` can rewrite the `Ok`/`Err` outcome the
/// handler produced, e.g. to redact content or downgrade an error to a
/// softer `isError` result.
#[async_trait]
pub trait ToolCallHook: Send + Sync {
    async fn before_tool_call(&self, _tool_name: &str, _input: &Value) -> MCPResult<()> {
        Ok(())
    }

    async fn after_tool_call(
        &self,
        _tool_name: &str,
        result: MCPResult<ToolCallResponse>,
    ) -> MCPResult<ToolCallResponse> {
        result
    }
}

/// Runs just before a response is written to the transport. Returning
/// `Ok(None)` suppresses the response entirely — the engine sends nothing
/// for that request id. This is distinct from returning the response
/// unchanged, so suppression is always an explicit choice by the hook.
#[async_trait]
pub trait BeforeSendResponseHook: Send + Sync {
    async fn before_send_response(
        &self,
        response: JsonRpcResponse,
    ) -> MCPResult<Option<JsonRpcResponse>>;
}

/// Runs around session creation and teardown — `on_session_create` once a
/// session reaches the `Ready` state (the `initialized` notification), and
/// `before_session_destroy` as shutdown cleanup begins.
#[async_trait]
pub trait SessionLifecycleHook: Send + Sync {
    async fn on_session_create(&self, _session_id: &str) {}

    async fn before_session_destroy(&self, _session_id: &str) {}
}

/// Ordered interceptor lists for every hook category.
///
/// A `HookChain` is cheap to clone (everything inside is an `Arc`); the
/// server keeps the single shared instance behind one `RwLock` so that
/// registering a hook and running the chain never race against each other
/// without also serializing against unrelated registry or correlator work.
#[derive(Default, Clone)]
pub struct HookChain {
    before_handle_message: Vec<Arc<dyn BeforeHandleMessageHook>>,
    before_handle_request: Vec<Arc<dyn BeforeHandleRequestHook>>,
    before_handle_notification: Vec<Arc<dyn BeforeHandleNotificationHook>>,
    tool_call: Vec<Arc<dyn ToolCallHook>>,
    before_send_response: Vec<Arc<dyn BeforeSendResponseHook>>,
    session_lifecycle: Vec<Arc<dyn SessionLifecycleHook>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_before_handle_message(&mut self, hook: Arc<dyn BeforeHandleMessageHook>) {
        self.before_handle_message.push(hook);
    }

    pub fn add_before_handle_request(&mut self, hook: Arc<dyn BeforeHandleRequestHook>) {
        self.before_handle_request.push(hook);
    }

    pub fn add_before_handle_notification(&mut self, hook: Arc<dyn BeforeHandleNotificationHook>) {
        self.before_handle_notification.push(hook);
    }

    pub fn add_tool_call_hook(&mut self, hook: Arc<dyn ToolCallHook>) {
        self.tool_call.push(hook);
    }

    pub fn add_before_send_response(&mut self, hook: Arc<dyn BeforeSendResponseHook>) {
        self.before_send_response.push(hook);
    }

    pub fn add_session_lifecycle(&mut self, hook: Arc<dyn SessionLifecycleHook>) {
        self.session_lifecycle.push(hook);
    }

    pub async fn run_before_handle_message(&self, raw: &Value) -> MCPResult<()> {
        for hook in &self.before_handle_message {
            hook.before_handle_message(raw).await?;
        }
        Ok(())
    }

    pub async fn run_before_handle_request(&self, request: &JsonRpcRequest) -> MCPResult<()> {
        for hook in &self.before_handle_request {
            hook.before_handle_request(request).await?;
        }
        Ok(())
    }

    pub async fn run_before_handle_notification(
        &self,
        notification: &JsonRpcRequest,
    ) -> MCPResult<()> {
        for hook in &self.before_handle_notification {
            hook.before_handle_notification(notification).await?;
        }
        Ok(())
    }

    pub async fn run_before_tool_call(&self, tool_name: &str, input: &Value) -> MCPResult<()> {
        for hook in &self.tool_call {
            hook.before_tool_call(tool_name, input).await?;
        }
        Ok(())
    }

    /// Fold every registered hook's `after_tool_call` over the handler's
    /// outcome, in registration order, so the last hook sees the previous
    /// hooks' rewrites rather than the handler's raw result.
    pub async fn run_after_tool_call(
        &self,
        tool_name: &str,
        mut result: MCPResult<ToolCallResponse>,
    ) -> MCPResult<ToolCallResponse> {
        for hook in &self.tool_call {
            result = hook.after_tool_call(tool_name, result).await;
        }
        result
    }

    /// Runs every `beforeSendResponse` hook in order; the first hook to
    /// suppress the response (`Ok(None)`) stops the chain and the response
    /// is dropped.
    pub async fn run_before_send_response(
        &self,
        response: JsonRpcResponse,
    ) -> MCPResult<Option<JsonRpcResponse>> {
        let mut current = Some(response);
        for hook in &self.before_send_response {
            let Some(response) = current else {
                break;
            };
            current = hook.before_send_response(response).await?;
        }
        Ok(current)
    }

    pub async fn run_on_session_create(&self, session_id: &str) {
        for hook in &self.session_lifecycle {
            hook.on_session_create(session_id).await;
        }
    }

    pub async fn run_before_session_destroy(&self, session_id: &str) {
        for hook in &self.session_lifecycle {
            hook.before_session_destroy(session_id).await;
        }
    }
}
