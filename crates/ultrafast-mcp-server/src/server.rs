//! UltraFastServer implementation module
//!
//! This module contains the main server implementation with all the core functionality.

use std::{borrow::Cow, collections::HashMap, sync::Arc};
use serde::Deserialize;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, error, info, warn};

use ultrafast_mcp_core::{
    config::TimeoutConfig,
    error::{MCPError, MCPResult},
    protocol::{
        capabilities::ServerCapabilities,
        jsonrpc::{JsonRpcError, JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, RequestId},
    },
    schema::validation::validate_tool_schema,
    types::{
        notifications::{LogLevel, LogLevelSetRequest, LogLevelSetResponse},
        prompts::Prompt,
        resources::{Resource, SubscribeResponse},
        roots::{RootsListChangedNotification, SetRootsRequest, SetRootsResponse},
        server::ServerInfo,
        tools::Tool,
    },
    utils::{CancellationManager, PingManager},
};
#[cfg(feature = "http")]
use ultrafast_mcp_transport::streamable_http::server::{HttpTransportConfig, HttpTransportServer};
use ultrafast_mcp_transport::{Transport, TransportConfig, create_transport};

use crate::context::{Context, LoggerConfig};
use crate::correlator::RequestCorrelator;
use crate::handlers::*;

/// MCP Server state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerState {
    Uninitialized,
    Initializing,
    Initialized,
    Operating,
    ShuttingDown,
    Shutdown,
}

impl ServerState {
    /// Check if the server can accept operations
    /// According to MCP 2025-06-18 specification, operations are allowed
    /// once the server is initialized (after initialize response)
    pub fn can_operate(&self) -> bool {
        matches!(self, ServerState::Initialized | ServerState::Operating)
    }

    /// Check if the server is initialized
    pub fn is_initialized(&self) -> bool {
        matches!(self, ServerState::Initialized | ServerState::Operating)
    }

    /// Check if the server is shutting down
    pub fn is_shutting_down(&self) -> bool {
        matches!(self, ServerState::ShuttingDown | ServerState::Shutdown)
    }
}

/// Tool registration error
#[derive(Debug, thiserror::Error)]
pub enum ToolRegistrationError {
    #[error("Tool with name '{0}' already exists")]
    ToolAlreadyExists(String),
    #[error("Invalid tool schema: {0}")]
    InvalidSchema(String),
    #[error("Tool name '{0}' is reserved")]
    ReservedName(String),
    #[error("Tool description is required")]
    MissingDescription,
    #[error("Tool input schema is required")]
    MissingInputSchema,
    #[error("Tool output schema is required")]
    MissingOutputSchema,
}

/// Server logging configuration
#[derive(Debug, Clone)]
pub struct ServerLoggingConfig {
    /// Current minimum log level
    pub current_level: LogLevel,
    /// Whether clients can change the log level
    pub allow_level_changes: bool,
    /// Default logger configuration for new contexts
    pub default_logger_config: LoggerConfig,
}

impl Default for ServerLoggingConfig {
    fn default() -> Self {
        Self {
            current_level: LogLevel::Info,
            allow_level_changes: true,
            default_logger_config: LoggerConfig::default(),
        }
    }
}

/// MCP Server implementation
#[derive(Clone)]
pub struct UltraFastServer {
    info: ServerInfo,
    capabilities: ServerCapabilities,
    state: Arc<RwLock<ServerState>>,
    tools: Arc<RwLock<HashMap<String, Tool>>>,
    resources: Arc<RwLock<HashMap<String, Resource>>>,
    prompts: Arc<RwLock<HashMap<String, Prompt>>>,
    tool_handler: Option<Arc<dyn ToolHandler>>,
    resource_handler: Option<Arc<dyn ResourceHandler>>,
    prompt_handler: Option<Arc<dyn PromptHandler>>,
    sampling_handler: Option<Arc<dyn SamplingHandler>>,
    completion_handler: Option<Arc<dyn CompletionHandler>>,
    roots_handler: Option<Arc<dyn RootsHandler>>,
    elicitation_handler: Option<Arc<dyn ElicitationHandler>>,
    subscription_handler: Option<Arc<dyn ResourceSubscriptionHandler>>,
    cancellation_manager: Arc<CancellationManager>,
    // Outstanding server->client requests (`ctx.call_tool`, `ctx.create_message`),
    // keyed by the id the server generated for them. Separate from
    // `cancellation_manager`, which tracks the opposite direction.
    outbound_correlator: Arc<RequestCorrelator>,
    ping_manager: Arc<PingManager>,
    // Enhanced logging configuration
    logging_config: Arc<RwLock<ServerLoggingConfig>>,
    // Per-session negotiated dialect, client capabilities, and resource
    // subscriptions, keyed by sessionId(). Replaces a single process-wide
    // negotiated version so concurrent clients on one transport don't
    // share a dialect or a subscription identity.
    sessions: crate::session::SessionManager,

    #[cfg(feature = "monitoring")]
    monitoring_system: Option<Arc<crate::MonitoringSystem>>,

    // Advanced handlers
    advanced_sampling_handler: Option<Arc<dyn AdvancedSamplingHandler>>,

    // Timeout configuration (MCP 2025-06-18 compliance)
    timeout_config: Arc<TimeoutConfig>,
    // Authentication middleware (removed oauth feature)

    // Interceptor chain wrapping ingress, dispatch, tool calls, outgoing
    // responses, and session lifecycle. Guarded by its own lock, separate
    // from the registries and correlator, per the concurrency model.
    hooks: Arc<RwLock<crate::hooks::HookChain>>,
}

impl std::fmt::Debug for UltraFastServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UltraFastServer")
            .field("info", &self.info)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// The request envelope a `tools/call` carries: `{toolCall: {id, name,
/// input}, meta?: {progressToken?}}`, not the donor's flat `{name,
/// arguments}`. `id` round-trips back on the response as `toolCallId`;
/// `meta.progressToken`, when present, is what `$/progress` notifications
/// for this call are keyed on.
#[derive(Debug, Clone, Deserialize)]
struct ToolCallEnvelope {
    #[serde(rename = "toolCall")]
    tool_call: ToolCallSpec,
    #[serde(default)]
    meta: Option<ToolCallEnvelopeMeta>,
}

#[derive(Debug, Clone, Deserialize)]
struct ToolCallSpec {
    id: String,
    name: String,
    #[serde(default = "default_tool_input")]
    input: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ToolCallEnvelopeMeta {
    #[serde(rename = "progressToken")]
    progress_token: Option<serde_json::Value>,
}

fn default_tool_input() -> serde_json::Value {
    serde_json::json!({})
}

/// Shape a successful tool outcome for the wire, per dialect. v2024 keeps
/// the donor's `content`/`isError` shape with `toolCallId` echoed in; v2025
/// collapses it to a single `output` value (the tool's structured content
/// if it set any, otherwise its sole text content as a bare JSON string)
/// alongside an explicit `error: null`.
///
/// A result whose `isError` flag is set (the donor's way of carrying a
/// tool-level failure through a `Result::Ok`) is shaped as an error on
/// both dialects rather than a success.
fn shape_tool_result(
    dialect: ultrafast_mcp_core::protocol::version::Dialect,
    tool_call_id: &str,
    result: &ultrafast_mcp_core::types::tools::ToolCallResponse,
) -> serde_json::Value {
    use ultrafast_mcp_core::protocol::version::Dialect;

    let is_error = result.is_error.unwrap_or(false);

    match dialect {
        Dialect::V2024 => serde_json::json!({
            "toolCallId": tool_call_id,
            "content": result.content,
            "isError": is_error,
        }),
        Dialect::V2025 if is_error => serde_json::json!({
            "toolCallId": tool_call_id,
            "error": {
                "code": ultrafast_mcp_core::error::error_codes::TOOL_EXECUTION_ERROR,
                "message": tool_result_text(&result.content),
            },
        }),
        Dialect::V2025 => serde_json::json!({
            "toolCallId": tool_call_id,
            "output": tool_output_value(result),
            "error": serde_json::Value::Null,
        }),
    }
}

/// Shape a tool-execution failure (a `Result::Err` from the handler, or a
/// lookup miss) for the wire. Reuses the single `MCPError -> JsonRpcError`
/// conversion seam so the error code/message assigned here are the same
/// ones a top-level JSON-RPC error would get; only the envelope they're
/// wrapped in differs.
fn shape_tool_error(
    dialect: ultrafast_mcp_core::protocol::version::Dialect,
    tool_call_id: &str,
    err: MCPError,
) -> serde_json::Value {
    use ultrafast_mcp_core::protocol::version::Dialect;

    let jsonrpc_err: JsonRpcError = err.into();
    match dialect {
        Dialect::V2024 => serde_json::json!({
            "toolCallId": tool_call_id,
            "content": [{ "type": "text", "text": jsonrpc_err.message }],
            "isError": true,
        }),
        Dialect::V2025 => serde_json::json!({
            "toolCallId": tool_call_id,
            "error": {
                "code": jsonrpc_err.code,
                "message": jsonrpc_err.message,
                "data": jsonrpc_err.data,
            },
        }),
    }
}

fn tool_result_text(content: &[ultrafast_mcp_core::types::tools::ToolContent]) -> String {
    use ultrafast_mcp_core::types::tools::ToolContent;
    content
        .iter()
        .find_map(|c| match c {
            ToolContent::Text { text } => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_else(|| "tool execution failed".to_string())
}

/// The v2025 `output` value: a tool's structured content if it set any,
/// otherwise its sole text content decoded as a bare JSON value (so a tool
/// returning the string `"hi"` round-trips to the JSON string `"hi"`, not
/// a content-array wrapper), falling back to the serialized content array
/// for anything richer (images, embedded resources, multiple parts).
fn tool_output_value(
    result: &ultrafast_mcp_core::types::tools::ToolCallResponse,
) -> serde_json::Value {
    use ultrafast_mcp_core::types::tools::ToolContent;

    if let Some(structured) = &result.structured_content {
        return structured.clone();
    }
    match result.content.as_slice() {
        [ToolContent::Text { text }] => serde_json::Value::String(text.clone()),
        other => serde_json::to_value(other).unwrap_or(serde_json::Value::Null),
    }
}

/// A sink a request handler can synchronously hand a notification to
/// without owning the transport. Both transports can be driven through it:
/// stdio threads one end of an `mpsc` channel, HTTP's broadcast sender is
/// already synchronous, so it's used directly.
type NotifyFn<'a> = &'a (dyn Fn(JsonRpcMessage) + Send + Sync);

fn notify_nothing(_message: JsonRpcMessage) {}

/// Build and hand off a `$/progress` notification. Tokens are coerced to
/// strings on the wire, matching how every other id-like value in this
/// protocol travels.
fn emit_progress(
    notify: NotifyFn<'_>,
    progress_token: serde_json::Value,
    progress: f64,
    total: Option<f64>,
) {
    let progress_token = match progress_token {
        serde_json::Value::String(_) => progress_token,
        other => serde_json::Value::String(other.to_string()),
    };
    let mut notification = ultrafast_mcp_core::types::notifications::ProgressNotification::new(
        progress_token,
        progress,
    );
    if let Some(total) = total {
        notification = notification.with_total(total);
    }
    let Ok(params) = serde_json::to_value(notification) else {
        return;
    };
    notify(JsonRpcMessage::Notification(JsonRpcRequest {
        jsonrpc: Cow::Borrowed("2.0"),
        id: None,
        method: "$/progress".to_string(),
        params: Some(params),
        meta: std::collections::HashMap::new(),
    }));
}

/// Shape a `resources/read` response for the wire, per dialect. v2024 keeps
/// the donor's flat `content` array (an audio blob becomes a `resource`
/// link rather than an inline blob, since v2024 has no audio content
/// type); v2025 wraps it in `contents: [{uri, text, content, metadata?}]`
/// with `text` mandatory (empty string for non-text resources) and the
/// first content item's `uri` always equal to the uri that was read.
fn shape_resource_read(
    dialect: ultrafast_mcp_core::protocol::version::Dialect,
    uri: &str,
    response: &ultrafast_mcp_core::types::resources::ReadResourceResponse,
) -> serde_json::Value {
    use ultrafast_mcp_core::protocol::version::Dialect;
    use ultrafast_mcp_core::types::resources::ResourceContent;

    match dialect {
        Dialect::V2024 => {
            let content: Vec<serde_json::Value> = response
                .contents
                .iter()
                .map(|item| match item {
                    ResourceContent::Blob { uri, mime_type, .. }
                        if mime_type.starts_with("audio/") =>
                    {
                        serde_json::json!({
                            "type": "resource",
                            "uri": uri,
                        })
                    }
                    other => serde_json::to_value(other).unwrap_or(serde_json::Value::Null),
                })
                .collect();
            serde_json::json!({ "content": content })
        }
        Dialect::V2025 => {
            let text = response
                .contents
                .iter()
                .find_map(|item| match item {
                    ResourceContent::Text { text, .. } => Some(text.clone()),
                    _ => None,
                })
                .unwrap_or_default();
            let content: Vec<serde_json::Value> = response
                .contents
                .iter()
                .map(|item| serde_json::to_value(item).unwrap_or(serde_json::Value::Null))
                .collect();
            serde_json::json!({
                "contents": [{
                    "uri": uri,
                    "text": text,
                    "content": content,
                }],
            })
        }
    }
}

impl UltraFastServer {
    /// Create a new UltraFastServer with the given info and capabilities
    pub fn new(info: ServerInfo, capabilities: ServerCapabilities) -> Self {
        Self {
            info,
            capabilities,
            state: Arc::new(RwLock::new(ServerState::Uninitialized)),
            tools: Arc::new(RwLock::new(HashMap::new())),
            resources: Arc::new(RwLock::new(HashMap::new())),
            prompts: Arc::new(RwLock::new(HashMap::new())),
            tool_handler: None,
            resource_handler: None,
            prompt_handler: None,
            sampling_handler: None,
            completion_handler: None,
            roots_handler: None,
            elicitation_handler: None,
            subscription_handler: None,
            cancellation_manager: Arc::new(CancellationManager::new()),
            outbound_correlator: Arc::new(RequestCorrelator::new()),
            ping_manager: Arc::new(PingManager::default()),
            logging_config: Arc::new(RwLock::new(ServerLoggingConfig::default())),
            sessions: crate::session::SessionManager::new(),

            #[cfg(feature = "monitoring")]
            monitoring_system: None,

            // Advanced handlers
            advanced_sampling_handler: None,

            // Timeout configuration (MCP 2025-06-18 compliance)
            timeout_config: Arc::new(TimeoutConfig::default()),

            hooks: Arc::new(RwLock::new(crate::hooks::HookChain::new())),
        }
    }

    /// Register an ingress hook, run on every inbound frame before it is
    /// classified as a request, notification, or batch.
    pub async fn with_before_handle_message_hook(
        self,
        hook: Arc<dyn crate::hooks::BeforeHandleMessageHook>,
    ) -> Self {
        self.hooks.write().await.add_before_handle_message(hook);
        self
    }

    /// Register a hook run before a request is routed to its method handler.
    pub async fn with_before_handle_request_hook(
        self,
        hook: Arc<dyn crate::hooks::BeforeHandleRequestHook>,
    ) -> Self {
        self.hooks.write().await.add_before_handle_request(hook);
        self
    }

    /// Register a hook run before a notification is routed to its handler.
    pub async fn with_before_handle_notification_hook(
        self,
        hook: Arc<dyn crate::hooks::BeforeHandleNotificationHook>,
    ) -> Self {
        self.hooks
            .write()
            .await
            .add_before_handle_notification(hook);
        self
    }

    /// Register a hook wrapping every `tools/call` invocation.
    pub async fn with_tool_call_hook(self, hook: Arc<dyn crate::hooks::ToolCallHook>) -> Self {
        self.hooks.write().await.add_tool_call_hook(hook);
        self
    }

    /// Register a hook run just before a response is written to the
    /// transport; it may mutate or suppress the response.
    pub async fn with_before_send_response_hook(
        self,
        hook: Arc<dyn crate::hooks::BeforeSendResponseHook>,
    ) -> Self {
        self.hooks.write().await.add_before_send_response(hook);
        self
    }

    /// Register a hook run on session creation and teardown.
    pub async fn with_session_lifecycle_hook(
        self,
        hook: Arc<dyn crate::hooks::SessionLifecycleHook>,
    ) -> Self {
        self.hooks.write().await.add_session_lifecycle(hook);
        self
    }

    /// Configure server logging
    pub async fn set_logging_config(&self, config: ServerLoggingConfig) {
        let mut logging_config = self.logging_config.write().await;
        *logging_config = config;
        info!("Server logging configuration updated");
    }

    /// Get current server logging configuration
    pub async fn get_logging_config(&self) -> ServerLoggingConfig {
        self.logging_config.read().await.clone()
    }

    /// Set timeout configuration
    pub fn with_timeout_config(mut self, config: TimeoutConfig) -> Self {
        self.timeout_config = Arc::new(config);
        self
    }

    /// Get current timeout configuration
    pub fn get_timeout_config(&self) -> TimeoutConfig {
        (*self.timeout_config).clone()
    }

    /// Set timeout configuration for high-performance scenarios
    pub fn with_high_performance_timeouts(mut self) -> Self {
        self.timeout_config = Arc::new(TimeoutConfig::high_performance());
        self
    }

    /// Set timeout configuration for long-running operations
    pub fn with_long_running_timeouts(mut self) -> Self {
        self.timeout_config = Arc::new(TimeoutConfig::long_running());
        self
    }

    /// Get timeout for a specific operation
    pub fn get_operation_timeout(&self, operation: &str) -> std::time::Duration {
        self.timeout_config.get_timeout_for_operation(operation)
    }

    /// Validate timeout configuration
    pub fn validate_timeout_config(&self) -> Result<(), String> {
        let config = &self.timeout_config;

        // Validate all timeouts are within bounds
        if !config.validate_timeout(config.connect_timeout) {
            return Err("Connect timeout is out of bounds".to_string());
        }
        if !config.validate_timeout(config.request_timeout) {
            return Err("Request timeout is out of bounds".to_string());
        }
        if !config.validate_timeout(config.response_timeout) {
            return Err("Response timeout is out of bounds".to_string());
        }
        if !config.validate_timeout(config.tool_execution_timeout) {
            return Err("Tool execution timeout is out of bounds".to_string());
        }
        if !config.validate_timeout(config.resource_read_timeout) {
            return Err("Resource read timeout is out of bounds".to_string());
        }
        if !config.validate_timeout(config.prompt_generation_timeout) {
            return Err("Prompt generation timeout is out of bounds".to_string());
        }
        if !config.validate_timeout(config.sampling_timeout) {
            return Err("Sampling timeout is out of bounds".to_string());
        }
        if !config.validate_timeout(config.completion_timeout) {
            return Err("Completion timeout is out of bounds".to_string());
        }
        if !config.validate_timeout(config.shutdown_timeout) {
            return Err("Shutdown timeout is out of bounds".to_string());
        }
        if !config.validate_timeout(config.heartbeat_interval) {
            return Err("Heartbeat interval is out of bounds".to_string());
        }

        Ok(())
    }

    /// Set the current log level
    pub async fn set_log_level(&self, level: LogLevel) -> MCPResult<()> {
        let mut logging_config = self.logging_config.write().await;

        if !logging_config.allow_level_changes {
            return Err(MCPError::invalid_request(
                "Log level changes are not allowed on this server".to_string(),
            ));
        }

        logging_config.current_level = level.clone();
        logging_config.default_logger_config.min_level = level.clone();

        info!("Server log level changed to: {:?}", level);
        Ok(())
    }

    /// Get the current log level
    pub async fn get_log_level(&self) -> LogLevel {
        self.logging_config.read().await.current_level.clone()
    }

    // ===== FLUENT BUILDER METHODS =====

    /// Enable monitoring with custom configuration
    #[cfg(feature = "monitoring")]
    pub fn with_monitoring_config(mut self, config: crate::MonitoringConfig) -> Self {
        let monitoring = crate::MonitoringSystem::new(config);
        self.monitoring_system = Some(Arc::new(monitoring));
        info!("Monitoring enabled with custom configuration");
        self
    }
    #[cfg(not(feature = "monitoring"))]
    pub fn with_monitoring_config(self, _config: ()) -> Self {
        warn!("Monitoring feature not enabled. Add 'monitoring' feature to enable monitoring.");
        self
    }

    /// Enable monitoring with default configuration
    #[cfg(feature = "monitoring")]
    pub fn with_monitoring(mut self) -> Self {
        let monitoring = crate::MonitoringSystem::new(crate::MonitoringConfig::default());
        self.monitoring_system = Some(Arc::new(monitoring));
        info!("Monitoring enabled with default configuration");
        self
    }
    #[cfg(not(feature = "monitoring"))]
    pub fn with_monitoring(self) -> Self {
        warn!("Monitoring feature not enabled. Add 'monitoring' feature to enable monitoring.");
        self
    }

    /// Enable health checks with default configuration
    #[cfg(feature = "monitoring")]
    pub fn with_health_checks(mut self) -> Self {
        if let Some(_monitoring) = &self.monitoring_system {
            // Health checks are automatically initialized when monitoring system is created
            info!("Health checks enabled");
        } else {
            // Create monitoring system if not already present
            let mut config = crate::MonitoringConfig::default();
            config.health.enabled = true;
            let monitoring = crate::MonitoringSystem::new(config);
            self.monitoring_system = Some(Arc::new(monitoring));
            info!("Health checks enabled with new monitoring system");
        }
        self
    }
    #[cfg(not(feature = "monitoring"))]
    pub fn with_health_checks(self) -> Self {
        warn!(
            "Health checks require monitoring feature. Add 'monitoring' feature to enable health checks."
        );
        self
    }

    /// Enable metrics collection with default configuration
    #[cfg(feature = "monitoring")]
    pub fn with_metrics(mut self) -> Self {
        if let Some(_monitoring) = &self.monitoring_system {
            // Metrics are automatically available via monitoring.metrics()
            info!("Metrics collection enabled");
        } else {
            // Create monitoring system if not already present
            let mut config = crate::MonitoringConfig::default();
            config.metrics.enabled = true;
            let monitoring = crate::MonitoringSystem::new(config);
            self.monitoring_system = Some(Arc::new(monitoring));
            info!("Metrics collection enabled with new monitoring system");
        }
        self
    }
    #[cfg(not(feature = "monitoring"))]
    pub fn with_metrics(self) -> Self {
        warn!("Metrics require monitoring feature. Add 'monitoring' feature to enable metrics.");
        self
    }

    /// Enable tracing with default configuration
    #[cfg(feature = "monitoring")]
    pub fn with_tracing(mut self) -> Self {
        if let Some(_monitoring) = &self.monitoring_system {
            // Tracing is configured via the monitoring config
            info!("Tracing enabled");
        } else {
            // Create monitoring system if not already present
            let mut config = crate::MonitoringConfig::default();
            config.tracing.enabled = true;
            let monitoring = crate::MonitoringSystem::new(config);
            self.monitoring_system = Some(Arc::new(monitoring));
            info!("Tracing enabled with new monitoring system");
        }
        self
    }
    #[cfg(not(feature = "monitoring"))]
    pub fn with_tracing(self) -> Self {
        warn!("Tracing requires monitoring feature. Add 'monitoring' feature to enable tracing.");
        self
    }

    /// Enable all monitoring features (health checks, metrics, tracing)
    #[cfg(feature = "monitoring")]
    pub fn with_full_monitoring(mut self) -> Self {
        let mut config = crate::MonitoringConfig::default();
        config.health.enabled = true;
        config.metrics.enabled = true;
        config.tracing.enabled = true;
        let monitoring = crate::MonitoringSystem::new(config);
        self.monitoring_system = Some(Arc::new(monitoring));
        info!("Full monitoring enabled (health checks, metrics, tracing)");
        self
    }
    #[cfg(not(feature = "monitoring"))]
    pub fn with_full_monitoring(self) -> Self {
        warn!(
            "Full monitoring requires monitoring feature. Add 'monitoring' feature to enable all monitoring features."
        );
        self
    }

    /// Enable middleware support
    pub fn with_middleware(self) -> Self {
        // This would integrate with the transport middleware system
        info!("Middleware support enabled");
        self
    }

    /// Enable recovery mechanisms
    pub fn with_recovery(self) -> Self {
        info!("Recovery mechanisms enabled");
        self
    }

    /// Enable OAuth authentication
    pub fn with_oauth(self) -> Self {
        info!("OAuth authentication enabled");
        self
    }

    /// Enable authentication with custom configuration (feature removed)
    pub fn with_authentication(self, _token_validator: (), _required_scopes: Vec<String>) -> Self {
        warn!("Authentication feature has been removed. Use ultrafast-mcp-auth crate directly.");
        self
    }

    /// Enable Bearer token authentication (feature removed)
    pub fn with_bearer_auth(self, _secret: String, _required_scopes: Vec<String>) -> Self {
        warn!(
            "Bearer authentication feature has been removed. Use ultrafast-mcp-auth crate directly."
        );
        self
    }

    /// Enable API key authentication
    pub fn with_api_key_auth(self) -> Self {
        info!("API key authentication enabled");
        self
    }

    /// Enable Basic authentication
    pub fn with_basic_auth(self) -> Self {
        info!("Basic authentication enabled");
        self
    }

    /// Enable rate limiting
    pub fn with_rate_limiting(self, requests_per_minute: u32) -> Self {
        info!(
            "Rate limiting enabled: {} requests per minute",
            requests_per_minute
        );
        self
    }

    /// Enable request validation
    pub fn with_request_validation(self) -> Self {
        info!("Request validation enabled");
        self
    }

    /// Enable response caching
    pub fn with_response_caching(self) -> Self {
        info!("Response caching enabled");
        self
    }

    /// Get the monitoring system if available
    #[cfg(feature = "monitoring")]
    pub fn monitoring(&self) -> Option<Arc<crate::MonitoringSystem>> {
        self.monitoring_system.clone()
    }
    #[cfg(not(feature = "monitoring"))]
    pub fn monitoring(&self) -> Option<()> {
        None
    }

    /// Create a context with the current server logging configuration
    pub async fn create_context(&self) -> Context {
        let logging_config = self.logging_config.read().await;
        let logger_config = logging_config.default_logger_config.clone();

        Context::new()
            .with_logger_config(logger_config)
            .with_outbound_correlator(self.outbound_correlator.clone())
    }

    /// Create a context with custom request and session IDs
    pub async fn create_context_with_ids(
        &self,
        request_id: String,
        session_id: Option<String>,
    ) -> Context {
        let logging_config = self.logging_config.read().await;
        let logger_config = logging_config.default_logger_config.clone();

        let mut context = Context::new()
            .with_request_id(request_id)
            .with_logger_config(logger_config)
            .with_outbound_correlator(self.outbound_correlator.clone());

        if let Some(session_id) = session_id {
            context = context.with_session_id(session_id);
        }

        context
    }

    /// Register a tool with validation
    pub async fn register_tool(&self, tool: Tool) -> Result<(), ToolRegistrationError> {
        // Validate tool name
        if tool.name.is_empty() {
            return Err(ToolRegistrationError::MissingDescription);
        }

        if self.is_reserved_name(&tool.name) {
            return Err(ToolRegistrationError::ReservedName(tool.name.clone()));
        }

        // Validate required fields
        if tool.description.is_empty() {
            return Err(ToolRegistrationError::MissingDescription);
        }

        // Validate tool schema
        if let Err(e) = validate_tool_schema(&tool.input_schema) {
            return Err(ToolRegistrationError::InvalidSchema(format!(
                "Input schema: {e}"
            )));
        }

        if let Some(output_schema) = &tool.output_schema {
            if let Err(e) = validate_tool_schema(output_schema) {
                return Err(ToolRegistrationError::InvalidSchema(format!(
                    "Output schema: {e}"
                )));
            }
        } else {
            return Err(ToolRegistrationError::MissingOutputSchema);
        }

        // Check for existing tool
        let mut tools = self.tools.write().await;
        if tools.contains_key(&tool.name) {
            return Err(ToolRegistrationError::ToolAlreadyExists(tool.name.clone()));
        }

        // Register the tool
        let tool_name = tool.name.clone();
        tools.insert(tool_name.clone(), tool);
        info!("Registered tool: {}", tool_name);

        Ok(())
    }

    /// Register multiple tools
    pub async fn register_tools(&self, tools: Vec<Tool>) -> Result<(), ToolRegistrationError> {
        for tool in tools {
            self.register_tool(tool).await?;
        }
        Ok(())
    }

    /// Unregister a tool by name
    pub async fn unregister_tool(&self, name: &str) -> bool {
        let mut tools = self.tools.write().await;
        tools.remove(name).is_some()
    }

    /// Get a tool by name
    pub async fn get_tool(&self, name: &str) -> Option<Tool> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// List all registered tools
    pub async fn list_tools(&self) -> Vec<Tool> {
        let tools = self.tools.read().await;
        tools.values().cloned().collect()
    }

    /// List registered tools one page at a time, page size 50, cursor is the
    /// name of the last emitted tool. Tools have no registration-order
    /// index (they live in a `HashMap`), so pages are cut over a
    /// name-sorted view to keep cursors stable across calls.
    pub async fn list_tools_page(&self, cursor: Option<&str>) -> (Vec<Tool>, Option<String>) {
        const PAGE_SIZE: usize = 50;
        let tools = self.tools.read().await;
        let mut names: Vec<&String> = tools.keys().collect();
        names.sort();
        let start = match cursor {
            Some(cursor) => names
                .iter()
                .position(|n| n.as_str() == cursor)
                .map(|i| i + 1)
                .unwrap_or(0),
            None => 0,
        };
        let page: Vec<Tool> = names
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .filter_map(|n| tools.get(n.as_str()).cloned())
            .collect();
        let next_cursor = if start + page.len() < names.len() {
            page.last().map(|t| t.name.clone())
        } else {
            None
        };
        (page, next_cursor)
    }

    /// Check if a tool exists
    pub async fn has_tool(&self, name: &str) -> bool {
        let tools = self.tools.read().await;
        tools.contains_key(name)
    }

    /// Get tool count
    pub async fn tool_count(&self) -> usize {
        let tools = self.tools.read().await;
        tools.len()
    }

    /// Clear all tools
    pub async fn clear_tools(&self) {
        let mut tools = self.tools.write().await;
        let count = tools.len();
        tools.clear();
        info!("Cleared {} tools", count);
    }

    /// Check if a name is reserved
    fn is_reserved_name(&self, name: &str) -> bool {
        // MCP reserved method names
        let reserved_names = [
            "initialize",
            "initialized",
            "shutdown",
            "exit",
            "ping",
            "tools/list",
            "tools/call",
            "resources/list",
            "resources/read",
            "resources/subscribe",
            "resources/unsubscribe",
            "prompts/list",
            "prompts/get",
            "sampling/create",
            "completion/complete",
            "roots/list",
            "elicitation/request",
            "logging/setLevel",
        ];

        reserved_names.contains(&name)
    }

    /// Validate tool call arguments against tool schema
    pub async fn validate_tool_call(
        &self,
        tool_name: &str,
        arguments: &serde_json::Value,
    ) -> Result<(), MCPError> {
        let tool = self.get_tool(tool_name).await;
        let tool =
            tool.ok_or_else(|| MCPError::invalid_request(format!("Tool '{tool_name}' not found")))?;

        ultrafast_mcp_core::schema::validation::validate_tool_input(arguments, &tool.input_schema)
            .map_err(|e| {
                MCPError::invalid_request(format!(
                    "Tool '{tool_name}' input validation failed: {e}"
                ))
            })?;

        Ok(())
    }

    /// Execute a tool call with validation
    pub async fn execute_tool_call(
        &self,
        tool_name: &str,
        arguments: serde_json::Value,
    ) -> Result<ultrafast_mcp_core::types::tools::ToolResult, MCPError> {
        // Validate the tool call
        self.validate_tool_call(tool_name, &arguments).await?;

        // Get the tool handler
        let tool_handler = self
            .tool_handler
            .as_ref()
            .ok_or_else(|| MCPError::internal_error("No tool handler configured".to_string()))?;

        // Create the tool call
        let tool_call = ultrafast_mcp_core::types::tools::ToolCall {
            name: tool_name.to_string(),
            arguments: Some(arguments),
        };

        // Execute the tool call
        tool_handler
            .handle_tool_call(tool_call)
            .await
            .map_err(|e| MCPError::internal_error(format!("Tool execution failed: {e}")))
    }

    /// Add a tool handler to the server
    pub fn with_tool_handler(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.tool_handler = Some(handler);
        self
    }

    /// Add a resource handler to the server
    pub fn with_resource_handler(mut self, handler: Arc<dyn ResourceHandler>) -> Self {
        self.resource_handler = Some(handler);
        self
    }

    /// Add a prompt handler to the server
    pub fn with_prompt_handler(mut self, handler: Arc<dyn PromptHandler>) -> Self {
        self.prompt_handler = Some(handler);
        self
    }

    /// Add a sampling handler to the server
    pub fn with_sampling_handler(mut self, handler: Arc<dyn SamplingHandler>) -> Self {
        self.sampling_handler = Some(handler);
        self
    }

    /// Add a completion handler to the server
    pub fn with_completion_handler(mut self, handler: Arc<dyn CompletionHandler>) -> Self {
        self.completion_handler = Some(handler);
        self
    }

    /// Add a roots handler to the server
    pub fn with_roots_handler(mut self, handler: Arc<dyn RootsHandler>) -> Self {
        self.roots_handler = Some(handler);
        // Note: Roots is a client capability, not server capability
        // The server responds to roots requests but doesn't advertise it
        self
    }

    /// Add an elicitation handler to the server
    pub fn with_elicitation_handler(mut self, handler: Arc<dyn ElicitationHandler>) -> Self {
        self.elicitation_handler = Some(handler);
        // Note: Elicitation is a client capability, not server capability
        // The server responds to elicitation requests but doesn't advertise it
        self
    }

    /// Add a subscription handler to the server
    pub fn with_subscription_handler(
        mut self,
        handler: Arc<dyn ResourceSubscriptionHandler>,
    ) -> Self {
        self.subscription_handler = Some(handler);
        self
    }

    /// Configure logging with a custom configuration
    pub fn with_logging_config(mut self, config: ServerLoggingConfig) -> Self {
        let logging_config = Arc::get_mut(&mut self.logging_config)
            .expect("Cannot modify logging config after server has been cloned");
        *logging_config.get_mut() = config;
        self
    }

    /// Run the server with stdio transport
    pub async fn run_stdio(&self) -> MCPResult<()> {
        let transport = create_transport(TransportConfig::Stdio)
            .await
            .map_err(|e| MCPError::internal_error(format!("Transport creation failed: {e}")))?;
        self.run_with_transport(transport).await
    }

    /// Run the server with a custom transport
    pub async fn run_with_transport(&self, mut transport: Box<dyn Transport>) -> MCPResult<()> {
        info!("Starting UltraFastServer with transport");

        // Initialize the server
        *self.state.write().await = ServerState::Initializing;

        // A bidirectional transport (stdio, or any single persistent
        // connection) carries exactly one session for its lifetime; the
        // transport itself has no notion of a session id, so one is minted
        // here and threaded through every message on this connection.
        let session_id = uuid::Uuid::new_v4().to_string();
        self.sessions.ensure_session(&session_id).await;

        // Start message handling loop
        loop {
            match transport.receive_message().await {
                Ok(message) => {
                    if let Err(e) = self.handle_message(&session_id, message, &mut transport).await
                    {
                        error!("Error handling message: {}", e);
                    }
                }
                Err(e) => {
                    error!("Transport error: {}", e);
                    break;
                }
            }
        }

        self.sessions.mark_closed(&session_id).await;
        Ok(())
    }

    /// Run the server with Streamable HTTP transport
    #[cfg(feature = "http")]
    pub async fn run_streamable_http(&self, host: &str, port: u16) -> MCPResult<()> {
        info!(
            "Starting UltraFastServer with Streamable HTTP on {}:{}",
            host, port
        );

        let config = HttpTransportConfig {
            host: host.to_string(),
            port,
            ..Default::default()
        };

        self.run_http(config).await
    }

    /// Run the server with HTTP transport
    #[cfg(feature = "http")]
    pub async fn run_http(&self, config: HttpTransportConfig) -> MCPResult<()> {
        info!("Starting HTTP transport server with config: {:?}", config);

        let transport_server = HttpTransportServer::new(config);
        let message_receiver = transport_server.get_message_receiver();
        let message_sender = transport_server.get_message_sender();
        let response_sender = transport_server.get_response_sender();

        // Start message processing task
        let server_clone = self.clone();
        let _message_processor = tokio::spawn(async move {
            server_clone
                .process_http_messages(message_receiver, message_sender, response_sender)
                .await;
        });

        // Start the HTTP server
        transport_server
            .run()
            .await
            .map_err(|e| MCPError::internal_error(format!("HTTP server failed: {e}")))
    }

    /// Run the server with custom Streamable HTTP transport configuration
    /// This provides clearer naming for advanced Streamable HTTP configuration
    #[cfg(feature = "http")]
    pub async fn run_streamable_http_with_config(
        &self,
        config: HttpTransportConfig,
    ) -> MCPResult<()> {
        self.run_http(config).await
    }

    /// Process HTTP messages from the transport layer
    #[allow(dead_code)]
    async fn process_http_messages(
        &self,
        mut message_receiver: broadcast::Receiver<(String, JsonRpcMessage)>,
        _message_sender: broadcast::Sender<(String, JsonRpcMessage)>,
        response_sender: broadcast::Sender<(String, JsonRpcMessage)>,
    ) {
        info!("HTTP message processor started");

        // Each message is dispatched on its own task rather than awaited
        // in-line: per the concurrency model, one session may have many
        // requests in flight at once, and a handler that calls back into the
        // client (`ctx.call_tool`) needs this loop to stay free to pick the
        // reply back up off `message_receiver` while the call is pending.
        while let Ok((session_id, message)) = message_receiver.recv().await {
            let server = self.clone();
            let response_sender = response_sender.clone();
            tokio::spawn(async move {
                server
                    .handle_http_message(session_id, message, response_sender)
                    .await;
            });
        }

        info!("HTTP message processor stopped");
    }

    /// Handle one message pulled off the HTTP transport's ingress channel.
    /// Split out of `process_http_messages` so each message can run on its
    /// own task instead of serializing behind the receive loop.
    async fn handle_http_message(
        &self,
        session_id: String,
        message: JsonRpcMessage,
        response_sender: broadcast::Sender<(String, JsonRpcMessage)>,
    ) {
        self.sessions.ensure_session(&session_id).await;
        let session_id_clone = session_id.clone();
        let notify_sender = response_sender.clone();
        let notify_session_id = session_id.clone();
        let notify = move |message: JsonRpcMessage| {
            let _ = notify_sender.send((notify_session_id.clone(), message));
        };
        match message {
            JsonRpcMessage::Request(request) => {
                info!(
                    "Processing HTTP request: {} (session: {})",
                    request.method, session_id
                );

                let response = self.handle_request(&session_id, &notify, request).await;
                if self.reclaim_cancellation(&response.id).await {
                    info!(
                        "Response for session {} suppressed: request was cancelled",
                        session_id
                    );
                } else {
                    match self.hooks.read().await.run_before_send_response(response).await {
                        Ok(Some(response)) => {
                            let response_message = JsonRpcMessage::Response(response);

                            info!(
                                "Sending response for session {}: {:?}",
                                session_id, response_message
                            );

                            if let Err(e) =
                                response_sender.send((session_id_clone, response_message))
                            {
                                error!(
                                    "Failed to send response for session {}: {}",
                                    session_id, e
                                );
                            } else {
                                info!("Successfully sent response for session {}", session_id);
                            }
                        }
                        Ok(None) => {
                            info!("Response for session {} suppressed by hook", session_id);
                        }
                        Err(e) => {
                            error!(
                                "beforeSendResponse hook failed for session {}: {}",
                                session_id, e
                            );
                        }
                    }
                }
            }
            JsonRpcMessage::Notification(notification) => {
                info!(
                    "Processing HTTP notification: {} (session: {})",
                    notification.method, session_id
                );

                if let Err(e) = self.handle_notification(&session_id, notification).await {
                    error!(
                        "Failed to handle notification for session {}: {}",
                        session_id, e
                    );
                }
                // Notifications don't have responses, so no need to send anything back
            }
            JsonRpcMessage::Response(response) => {
                if !self.outbound_correlator.complete(response).await {
                    warn!(
                        "Received response for an id with no pending outbound request (session: {})",
                        session_id
                    );
                }
            }
            JsonRpcMessage::Batch(messages) => {
                info!(
                    "Processing HTTP batch of {} messages (session: {})",
                    messages.len(),
                    session_id
                );
                if let Some(reply) = self.handle_batch(&session_id, &notify, messages).await {
                    if let Err(e) = response_sender.send((session_id_clone, reply)) {
                        error!("Failed to send batch response for session {}: {}", session_id, e);
                    }
                }
            }
        }
    }

    /// Get server info
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Get cancellation manager
    pub fn cancellation_manager(&self) -> Arc<CancellationManager> {
        self.cancellation_manager.clone()
    }

    /// Get the outbound request correlator, tracking server->client requests
    /// awaiting a client response (`ctx.call_tool`, `ctx.create_message`).
    pub fn outbound_correlator(&self) -> Arc<RequestCorrelator> {
        self.outbound_correlator.clone()
    }

    /// Get ping manager
    pub fn ping_manager(&self) -> Arc<PingManager> {
        self.ping_manager.clone()
    }

    /// Start periodic ping monitoring (optional, for connection health)
    /// This method should be called after the server is running with a transport
    pub async fn start_ping_monitoring(&self, ping_interval: std::time::Duration) -> MCPResult<()> {
        info!(
            "Starting periodic ping monitoring with interval: {:?}",
            ping_interval
        );

        // Note: This is a placeholder for future implementation
        // The actual ping monitoring would need to be integrated with the transport layer
        // For now, we log that ping monitoring is enabled
        info!("Ping monitoring enabled (interval: {:?})", ping_interval);

        // The PingManager is already configured with default intervals
        // Future implementation would integrate with the transport layer
        // to send periodic pings to clients

        Ok(())
    }

    /// Stop ping monitoring
    pub async fn stop_ping_monitoring(&self) -> MCPResult<()> {
        info!("Stopping periodic ping monitoring");
        // The ping monitoring task will naturally stop when the transport is closed
        Ok(())
    }

    /// Handle MCP initialize request
    async fn handle_initialize(
        &self,
        session_id: &str,
        request: ultrafast_mcp_core::protocol::InitializeRequest,
    ) -> Result<ultrafast_mcp_core::protocol::InitializeResponse, MCPError> {
        info!(
            "Handling initialize request from client: {} (version: {})",
            request.client_info.name, request.protocol_version
        );

        // Negotiate protocol version
        let negotiated_version = match ultrafast_mcp_core::protocol::version::negotiate_version(
            &request.protocol_version,
        ) {
            Ok(version) => {
                info!(
                    "Protocol version negotiated: {} -> {}",
                    request.protocol_version, version
                );
                version
            }
            Err(e) => {
                error!("Protocol version negotiation failed: {}", e);
                return Err(MCPError::invalid_request(format!(
                    "Protocol version negotiation failed: {}. Supported versions: {:?}",
                    e,
                    ultrafast_mcp_core::protocol::version::SUPPORTED_VERSIONS
                )));
            }
        };

        // Validate the initialize request
        if let Err(e) = request.validate_protocol_version() {
            warn!("Initialize request validation warning: {}", e);
            // Continue with warning but don't fail
        }

        // Validate compatibility
        if let Err(e) = ultrafast_mcp_core::protocol::capabilities::validate_compatibility(
            &request.capabilities,
            &self.capabilities,
        ) {
            error!("Capability validation failed: {}", e);
            return Err(MCPError::Protocol(
                ultrafast_mcp_core::error::ProtocolError::CapabilityNotSupported(e),
            ));
        }

        info!("Capabilities validated successfully");

        // Remember the negotiated dialect and the client's capabilities for
        // the lifetime of this session so later responses (tool results,
        // capability advertisements) can be shaped for it without
        // renegotiating per-message. Set exactly once, before `initialized`
        // moves the session to `Ready`.
        self.sessions
            .set_negotiated_version(session_id, &negotiated_version)
            .await;
        self.sessions
            .set_client_capabilities(session_id, request.capabilities.clone())
            .await;

        // Update server state to Initialized (not Operating yet)
        // This follows MCP 2025-06-18 specification: server should wait for initialized notification
        {
            let mut state = self.state.write().await;
            *state = ServerState::Initialized;
        }

        info!(
            "Server initialized with protocol version: {} (waiting for initialized notification)",
            negotiated_version
        );

        let dialect = self.sessions.negotiated_dialect(session_id).await;
        Ok(ultrafast_mcp_core::protocol::InitializeResponse {
            protocol_version: negotiated_version,
            capabilities: self.capabilities.for_dialect(dialect, false),
            server_info: self.info.clone(),
            instructions: None,
        })
    }

    /// The dialect negotiated during `initialize` for a given session, or
    /// `V2025` (the newest, most permissive dialect) if that session
    /// hasn't negotiated one yet.
    pub async fn negotiated_dialect(
        &self,
        session_id: &str,
    ) -> ultrafast_mcp_core::protocol::version::Dialect {
        self.sessions.negotiated_dialect(session_id).await
    }

    /// The exact protocol version string a session negotiated during
    /// `initialize`, if any.
    pub async fn negotiated_version(&self, session_id: &str) -> Option<String> {
        self.sessions.negotiated_version(session_id).await
    }

    /// Handle MCP initialized notification
    async fn handle_initialized(
        &self,
        session_id: &str,
        _notification: ultrafast_mcp_core::protocol::InitializedNotification,
    ) -> MCPResult<()> {
        info!("Received initialized notification from client");

        // Ensure server state is operating (it should already be from initialize)
        {
            let mut state = self.state.write().await;
            *state = ServerState::Operating;
        }

        info!("Server confirmed operating state via initialized notification");

        self.sessions.mark_ready(session_id).await;
        self.hooks.read().await.run_on_session_create(session_id).await;
        Ok(())
    }

    /// Handle MCP shutdown request
    async fn handle_shutdown(
        &self,
        session_id: &str,
        request: ultrafast_mcp_core::protocol::ShutdownRequest,
    ) -> MCPResult<()> {
        info!("Handling shutdown request: {:?}", request.reason);

        self.hooks
            .read()
            .await
            .run_before_session_destroy(session_id)
            .await;

        // Update server state
        {
            let mut state = self.state.write().await;
            *state = ServerState::ShuttingDown;
        }

        // Perform cleanup
        self.perform_shutdown_cleanup().await;

        // Update state to shutdown
        {
            let mut state = self.state.write().await;
            *state = ServerState::Shutdown;
        }

        info!("Server shutdown completed");
        Ok(())
    }

    /// Perform shutdown cleanup
    async fn perform_shutdown_cleanup(&self) {
        info!("Performing shutdown cleanup");

        // Clear all tools
        self.clear_tools().await;

        // Clear all resources
        {
            let mut resources = self.resources.write().await;
            resources.clear();
        }

        // Clear all prompts
        {
            let mut prompts = self.prompts.write().await;
            prompts.clear();
        }

        // Clear every session's negotiated dialect, capabilities, and
        // resource subscriptions
        self.sessions.clear().await;

        info!("Shutdown cleanup completed");
    }

    /// Get current server state
    pub async fn get_state(&self) -> ServerState {
        self.state.read().await.clone()
    }

    /// Check if server can accept operations
    pub async fn can_operate(&self) -> bool {
        self.state.read().await.can_operate()
    }

    /// Check whether `session_id` has completed initialization and may
    /// issue `tools/call`, `resources/read`, and the other operation
    /// methods. Per session.rs's state machine, only `Ready` sessions may;
    /// a session that never negotiated, or a different session entirely,
    /// must not ride on another session's readiness.
    async fn session_ready(&self, session_id: &str) -> bool {
        self.sessions.state(session_id).await == crate::session::SessionState::Ready
    }

    /// Reclaim the cancel-handle for a just-computed response's request id
    /// and report whether `$/cancelled` landed for it. Called once per
    /// response, right before it would be sent, so a cancelled request's
    /// success/error response is never transmitted and its tracking entry
    /// never leaks. Requests that were never registered for cancellation
    /// tracking (every method except `tools/call`, today) harmlessly report
    /// not-cancelled.
    async fn reclaim_cancellation(&self, id: &Option<RequestId>) -> bool {
        let Some(id) = id else {
            return false;
        };
        let Ok(id_value) = serde_json::to_value(id) else {
            return false;
        };
        let cancelled = self.cancellation_manager.is_cancelled(&id_value).await;
        let _ = self.cancellation_manager.complete_request(&id_value).await;
        cancelled
    }

    /// Default `completion/complete`, used when no external
    /// `CompletionHandler` is registered: prefix-matches the partial
    /// argument value (case-insensitive) against every registered prompt
    /// name (`ref/prompt`) or resource URI (`ref/resource`), walking the
    /// handler's own pagination to see the full set. Results are sorted
    /// ascending and capped at 100 with `hasMore` set if truncated, per
    /// the registries' own pagination convention.
    async fn complete_from_registries(
        &self,
        request: &ultrafast_mcp_core::types::completion::CompleteRequest,
    ) -> MCPResult<ultrafast_mcp_core::types::completion::CompleteResponse> {
        use ultrafast_mcp_core::types::completion::{CompleteResponse, CompletionResult};
        use ultrafast_mcp_core::types::prompts::ListPromptsRequest;
        use ultrafast_mcp_core::types::resources::ListResourcesRequest;

        const MAX_COMPLETIONS: usize = 100;

        let candidates: Vec<String> = match request.reference.ref_type.as_str() {
            "ref/prompt" => {
                let mut names = Vec::new();
                if let Some(handler) = &self.prompt_handler {
                    let mut cursor = None;
                    loop {
                        let page = handler
                            .list_prompts(ListPromptsRequest { cursor: cursor.take() })
                            .await?;
                        names.extend(page.prompts.into_iter().map(|p| p.name));
                        match page.next_cursor {
                            Some(next) => cursor = Some(next),
                            None => break,
                        }
                    }
                }
                names
            }
            "ref/resource" => {
                let mut uris = Vec::new();
                if let Some(handler) = &self.resource_handler {
                    let mut cursor = None;
                    loop {
                        let page = handler
                            .list_resources(ListResourcesRequest { cursor: cursor.take() })
                            .await?;
                        uris.extend(page.resources.into_iter().map(|r| r.uri));
                        match page.next_cursor {
                            Some(next) => cursor = Some(next),
                            None => break,
                        }
                    }
                }
                uris
            }
            _ => Vec::new(),
        };

        let prefix = request.argument.value.to_lowercase();
        let mut matches: Vec<String> = candidates
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(&prefix))
            .collect();
        matches.sort();
        matches.dedup();

        let total = matches.len();
        let has_more = total > MAX_COMPLETIONS;
        matches.truncate(MAX_COMPLETIONS);

        Ok(CompleteResponse {
            completion: CompletionResult::with_metadata(matches, total as u32, has_more),
        })
    }

    /// Helper function to deserialize request parameters with proper defaults
    fn deserialize_list_tools_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::tools::ListToolsRequest {
        serde_json::from_value(params.unwrap_or_default()).unwrap_or_default()
    }

    fn deserialize_list_resources_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::resources::ListResourcesRequest {
        serde_json::from_value(params.unwrap_or_default()).unwrap_or_default()
    }

    fn deserialize_list_prompts_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::prompts::ListPromptsRequest {
        serde_json::from_value(params.unwrap_or_default()).unwrap_or_default()
    }

    fn deserialize_get_prompt_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::prompts::GetPromptRequest {
        serde_json::from_value(params.unwrap_or_default()).unwrap_or_default()
    }

    fn deserialize_read_resource_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::resources::ReadResourceRequest {
        serde_json::from_value(params.unwrap_or_default()).unwrap_or_default()
    }

    fn deserialize_list_resource_templates_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::resources::ListResourceTemplatesRequest {
        serde_json::from_value(params.unwrap_or_default()).unwrap_or_default()
    }

    fn deserialize_subscribe_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::resources::SubscribeRequest {
        serde_json::from_value(params.unwrap_or_default()).unwrap_or_else(|_| {
            ultrafast_mcp_core::types::resources::SubscribeRequest { uri: String::new() }
        })
    }

    fn deserialize_unsubscribe_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::resources::UnsubscribeRequest {
        serde_json::from_value(params.unwrap_or_default()).unwrap_or_else(|_| {
            ultrafast_mcp_core::types::resources::UnsubscribeRequest { uri: String::new() }
        })
    }

    fn deserialize_create_message_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::sampling::CreateMessageRequest {
        serde_json::from_value(params.unwrap_or_default()).unwrap_or_default()
    }

    fn deserialize_elicitation_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::elicitation::ElicitationRequest {
        serde_json::from_value(params.unwrap_or_default()).unwrap_or_default()
    }

    fn deserialize_complete_request(
        &self,
        params: Option<serde_json::Value>,
    ) -> ultrafast_mcp_core::types::completion::CompleteRequest {
        match params {
            Some(params) => serde_json::from_value(params).unwrap_or_else(|_| {
                ultrafast_mcp_core::types::completion::CompleteRequest {
                    reference: ultrafast_mcp_core::types::completion::CompletionReference {
                        ref_type: "ref/prompt".to_string(),
                        name: "".to_string(),
                    },
                    argument: ultrafast_mcp_core::types::completion::CompletionArgument {
                        name: "".to_string(),
                        value: "".to_string(),
                    },
                    context: None,
                }
            }),
            None => ultrafast_mcp_core::types::completion::CompleteRequest {
                reference: ultrafast_mcp_core::types::completion::CompletionReference {
                    ref_type: "ref/prompt".to_string(),
                    name: "".to_string(),
                },
                argument: ultrafast_mcp_core::types::completion::CompletionArgument {
                    name: "".to_string(),
                    value: "".to_string(),
                },
                context: None,
            },
        }
    }

    /// Handle incoming messages
    async fn handle_message(
        &self,
        session_id: &str,
        message: JsonRpcMessage,
        transport: &mut Box<dyn Transport>,
    ) -> MCPResult<()> {
        if let Ok(raw) = serde_json::to_value(&message) {
            if let Err(e) = self.hooks.read().await.run_before_handle_message(&raw).await {
                warn!("beforeHandleMessage hook rejected message: {}", e);
                return Ok(());
            }
        }
        match message {
            JsonRpcMessage::Request(request) => {
                // Check if this is actually a notification (no ID)
                if request.id.is_none() {
                    // This is a notification, handle it as such
                    self.handle_notification(session_id, request).await?;
                } else {
                    // This is a request, handle it with timeout. Any
                    // notifications the handler emits along the way (e.g.
                    // `$/progress`) are queued on `notify_tx` rather than
                    // sent directly, since `Transport` has no split
                    // read/write halves for the handler to hold onto; they
                    // are flushed here, before the terminal response, once
                    // the handler returns.
                    let operation_timeout = self.get_operation_timeout(&request.method);
                    let request_id = request.id.clone(); // Clone before moving request
                    let (notify_tx, mut notify_rx) =
                        tokio::sync::mpsc::unbounded_channel::<JsonRpcMessage>();
                    let notify = move |message: JsonRpcMessage| {
                        let _ = notify_tx.send(message);
                    };
                    let response = tokio::time::timeout(
                        operation_timeout,
                        self.handle_request(session_id, &notify, request),
                    )
                    .await;

                    match response {
                        Ok(response) => {
                            if self.reclaim_cancellation(&response.id).await {
                                // Cancelled mid-flight: no success/error response is
                                // sent for this id, but queued notifications (e.g.
                                // `$/progress`) still flush.
                                while let Ok(message) = notify_rx.try_recv() {
                                    transport.send_message(message).await.map_err(|e| {
                                        MCPError::internal_error(format!(
                                            "Failed to send notification: {e}"
                                        ))
                                    })?;
                                }
                            } else {
                                match self.hooks.read().await.run_before_send_response(response).await
                                {
                                    Ok(Some(response)) => {
                                        while let Ok(message) = notify_rx.try_recv() {
                                            transport.send_message(message).await.map_err(|e| {
                                                MCPError::internal_error(format!(
                                                    "Failed to send notification: {e}"
                                                ))
                                            })?;
                                        }
                                        transport
                                            .send_message(JsonRpcMessage::Response(response))
                                            .await
                                            .map_err(|e| {
                                                MCPError::internal_error(format!(
                                                    "Failed to send message: {e}"
                                                ))
                                            })?;
                                    }
                                    Ok(None) => {
                                        // Suppressed by a beforeSendResponse hook.
                                    }
                                    Err(e) => {
                                        warn!("beforeSendResponse hook failed: {}", e);
                                    }
                                }
                            }
                        }
                        Err(_) => {
                            // Request timed out, send timeout error
                            let timeout_error = JsonRpcResponse::error(
                                JsonRpcError::new(-32000, "Request timeout".to_string()),
                                request_id.clone(),
                            );
                            transport
                                .send_message(JsonRpcMessage::Response(timeout_error))
                                .await
                                .map_err(|e| {
                                    MCPError::internal_error(format!(
                                        "Failed to send timeout error: {e}"
                                    ))
                                })?;

                            // Send cancellation notification
                            if let Some(request_id) = &request_id {
                                self.notify_cancelled(
                                    serde_json::Value::String(request_id.to_string()),
                                    Some("Request timed out".to_string()),
                                    transport,
                                )
                                .await?;
                            }
                        }
                    }
                }
            }
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(session_id, notification).await?;
            }
            JsonRpcMessage::Response(response) => {
                // A reply to a request the server itself initiated
                // (`ctx.call_tool`, `ctx.create_message`) rather than a
                // top-level JSON-RPC message; route it to whichever waiter
                // registered the id instead of dropping it.
                if !self.outbound_correlator.complete(response).await {
                    warn!("Received response for an id with no pending outbound request");
                }
            }
            JsonRpcMessage::Batch(messages) => {
                let (notify_tx, mut notify_rx) =
                    tokio::sync::mpsc::unbounded_channel::<JsonRpcMessage>();
                let notify = move |message: JsonRpcMessage| {
                    let _ = notify_tx.send(message);
                };
                if let Some(reply) = self.handle_batch(session_id, &notify, messages).await {
                    while let Ok(message) = notify_rx.try_recv() {
                        transport.send_message(message).await.map_err(|e| {
                            MCPError::internal_error(format!("Failed to send notification: {e}"))
                        })?;
                    }
                    transport.send_message(reply).await.map_err(|e| {
                        MCPError::internal_error(format!("Failed to send batch reply: {e}"))
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Handle a JSON-RPC batch (an array frame), per the 2025 dialect's
    /// batching support.
    ///
    /// A batch is only accepted once the session has negotiated the 2025
    /// dialect; earlier dialects and empty batches get exactly one
    /// `InvalidRequest` response, never a batch-shaped one. Each element is
    /// otherwise dispatched independently: requests contribute a response,
    /// notifications contribute nothing, and the responses are aggregated
    /// into a single array reply. When every element was a notification, no
    /// reply is sent at all.
    async fn handle_batch(
        &self,
        session_id: &str,
        notify: NotifyFn<'_>,
        messages: Vec<JsonRpcMessage>,
    ) -> Option<JsonRpcMessage> {
        use ultrafast_mcp_core::protocol::version::Dialect;

        if self.sessions.negotiated_dialect(session_id).await != Dialect::V2025 {
            return Some(JsonRpcMessage::Response(JsonRpcResponse::invalid_request(
                Some("Batch requests require the 2025 protocol dialect".to_string()),
            )));
        }

        if messages.is_empty() {
            return Some(JsonRpcMessage::Response(JsonRpcResponse::invalid_request(
                Some("Batch request must not be empty".to_string()),
            )));
        }

        let mut responses = Vec::new();
        for message in messages {
            match message {
                JsonRpcMessage::Request(request) if request.id.is_some() => {
                    let response = self.handle_request(session_id, notify, request).await;
                    if self.reclaim_cancellation(&response.id).await {
                        debug!("Batch element suppressed: request was cancelled");
                    } else {
                        match self.hooks.read().await.run_before_send_response(response).await {
                            Ok(Some(response)) => responses.push(response),
                            Ok(None) => {}
                            Err(e) => warn!("beforeSendResponse hook failed in batch: {}", e),
                        }
                    }
                }
                JsonRpcMessage::Request(notification) => {
                    if let Err(e) = self.handle_notification(session_id, notification).await {
                        warn!("Batch element notification failed: {}", e);
                    }
                }
                JsonRpcMessage::Notification(notification) => {
                    if let Err(e) = self.handle_notification(session_id, notification).await {
                        warn!("Batch element notification failed: {}", e);
                    }
                }
                JsonRpcMessage::Response(_) => {
                    warn!("Ignoring unexpected response inside batch");
                }
                JsonRpcMessage::Batch(_) => {
                    responses.push(JsonRpcResponse::invalid_request(Some(
                        "Nested batches are not permitted".to_string(),
                    )));
                }
            }
        }

        if responses.is_empty() {
            None
        } else {
            Some(JsonRpcMessage::Batch(
                responses.into_iter().map(JsonRpcMessage::Response).collect(),
            ))
        }
    }

    /// Handle incoming requests
    async fn handle_request(
        &self,
        session_id: &str,
        notify: NotifyFn<'_>,
        request: JsonRpcRequest,
    ) -> JsonRpcResponse {
        info!(
            "Handling request: {} (id: {:?})",
            request.method, request.id
        );

        if let Err(e) = self.hooks.read().await.run_before_handle_request(&request).await {
            warn!("beforeHandleRequest hook rejected request: {}", e);
            return JsonRpcResponse::error(
                JsonRpcError::new(-32603, format!("Request rejected by hook: {e}")),
                request.id,
            );
        }

        match request.method.as_str() {
            // MCP Lifecycle methods
            "initialize" => {
                match serde_json::from_value::<ultrafast_mcp_core::protocol::InitializeRequest>(
                    request.params.unwrap_or_default(),
                ) {
                    Ok(init_request) => match self.handle_initialize(session_id, init_request).await {
                        Ok(response) => match serde_json::to_value(response) {
                            Ok(value) => JsonRpcResponse::success(value, request.id),
                            Err(e) => JsonRpcResponse::error(
                                JsonRpcError::new(-32603, format!("Serialization error: {e}")),
                                request.id,
                            ),
                        },
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, e.to_string()),
                            request.id,
                        ),
                    },
                    Err(e) => JsonRpcResponse::error(
                        JsonRpcError::invalid_params(Some(format!(
                            "Invalid initialize request: {e}"
                        ))),
                        request.id,
                    ),
                }
            }
            "shutdown" => {
                let shutdown_request = match serde_json::from_value::<
                    ultrafast_mcp_core::protocol::ShutdownRequest,
                >(request.params.unwrap_or_default())
                {
                    Ok(req) => req,
                    Err(_) => ultrafast_mcp_core::protocol::ShutdownRequest { reason: None },
                };

                match self.handle_shutdown(session_id, shutdown_request).await {
                    Ok(_) => JsonRpcResponse::success(serde_json::json!({}), request.id),
                    Err(e) => {
                        JsonRpcResponse::error(JsonRpcError::new(-32603, e.to_string()), request.id)
                    }
                }
            }

            // Tools methods
            "tools/list" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let list_request = self.deserialize_list_tools_request(request.params.clone());
                let list_cursor = list_request.cursor.clone();

                if let Some(handler) = &self.tool_handler {
                    match handler.list_tools(list_request).await {
                        Ok(response) => {
                            // If handler returns empty tools, fallback to registered tools
                            if response.tools.is_empty() {
                                let (tools, next_cursor) =
                                    self.list_tools_page(list_cursor.as_deref()).await;
                                let response =
                                    ultrafast_mcp_core::types::tools::ListToolsResponse {
                                        tools,
                                        next_cursor,
                                    };
                                match serde_json::to_value(response) {
                                    Ok(value) => JsonRpcResponse::success(value, request.id),
                                    Err(e) => JsonRpcResponse::error(
                                        JsonRpcError::new(
                                            -32603,
                                            format!("Serialization error: {e}"),
                                        ),
                                        request.id,
                                    ),
                                }
                            } else {
                                match serde_json::to_value(response) {
                                    Ok(value) => JsonRpcResponse::success(value, request.id),
                                    Err(e) => JsonRpcResponse::error(
                                        JsonRpcError::new(
                                            -32603,
                                            format!("Serialization error: {e}"),
                                        ),
                                        request.id,
                                    ),
                                }
                            }
                        }
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Tools list failed: {e}")),
                            request.id,
                        ),
                    }
                } else {
                    // Fallback to registered tools
                    let (tools, next_cursor) = self.list_tools_page(list_cursor.as_deref()).await;
                    let response = ultrafast_mcp_core::types::tools::ListToolsResponse {
                        tools,
                        next_cursor,
                    };
                    match serde_json::to_value(response) {
                        Ok(value) => JsonRpcResponse::success(value, request.id),
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Serialization error: {e}")),
                            request.id,
                        ),
                    }
                }
            }
            "tools/call" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let params = match &request.params {
                    Some(params) => params.clone(),
                    None => {
                        return JsonRpcResponse::error(
                            JsonRpcError::new(
                                -32602,
                                "Tool call failed: Missing parameters".to_string(),
                            ),
                            request.id,
                        );
                    }
                };

                let envelope: ToolCallEnvelope = match serde_json::from_value(params) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        return JsonRpcResponse::error(
                            JsonRpcError::new(-32602, format!("Tool call failed: {e}")),
                            request.id,
                        );
                    }
                };

                let tool_call_id = envelope.tool_call.id;
                let tool_name = envelope.tool_call.name;
                let arguments = envelope.tool_call.input;
                let progress_token = envelope.meta.and_then(|m| m.progress_token);
                let dialect = self.sessions.negotiated_dialect(session_id).await;

                if let Err(e) = self
                    .hooks
                    .read()
                    .await
                    .run_before_tool_call(&tool_name, &arguments)
                    .await
                {
                    return JsonRpcResponse::error(
                        JsonRpcError::new(-32603, format!("Tool call rejected by hook: {e}")),
                        request.id,
                    );
                }

                if let Some(token) = &progress_token {
                    emit_progress(notify, token.clone(), 0.0, Some(100.0));
                }

                // Register this call's id so a `$/cancelled` notification
                // arriving mid-flight has a live entry to mark, then race
                // its actual execution against the cancel token: a
                // cancellation drops the in-flight future instead of just
                // discarding its result afterward. The entry itself is
                // reclaimed by `reclaim_cancellation` at the send site,
                // where whether to transmit the response is decided.
                let request_id_value =
                    request.id.as_ref().and_then(|id| serde_json::to_value(id).ok());
                if let Some(id_value) = &request_id_value {
                    if let Err(e) = self
                        .cancellation_manager
                        .register_request(id_value.clone(), "tools/call".to_string())
                        .await
                    {
                        warn!("Failed to register tools/call for cancellation tracking: {e}");
                    }
                }
                let cancel_token = match &request_id_value {
                    Some(id_value) => self.cancellation_manager.token(id_value).await,
                    None => None,
                };

                let execute = async {
                    let outcome = if let Some(handler) = &self.tool_handler {
                        let tool_call = ultrafast_mcp_core::types::tools::ToolCall {
                            name: tool_name.clone(),
                            arguments: Some(arguments.clone()),
                        };
                        handler.handle_tool_call(tool_call).await
                    } else if self.has_tool(&tool_name).await {
                        self.execute_tool_call(&tool_name, arguments.clone()).await
                    } else {
                        Err(MCPError::tool_not_found(tool_name.clone()))
                    };
                    self.hooks
                        .read()
                        .await
                        .run_after_tool_call(&tool_name, outcome)
                        .await
                };

                let outcome = match cancel_token {
                    Some(token) => tokio::select! {
                        _ = token.cancelled() => None,
                        outcome = execute => Some(outcome),
                    },
                    None => Some(execute.await),
                };

                if let Some(token) = progress_token {
                    emit_progress(notify, token, 100.0, Some(100.0));
                }

                match outcome {
                    Some(Ok(result)) => JsonRpcResponse::success(
                        shape_tool_result(dialect, &tool_call_id, &result),
                        request.id,
                    ),
                    Some(Err(e)) => JsonRpcResponse::success(
                        shape_tool_error(dialect, &tool_call_id, e),
                        request.id,
                    ),
                    None => {
                        // Cancelled before the handler finished. `reclaim_cancellation`
                        // at the send site discards this; it's shaped only to keep
                        // the match exhaustive.
                        JsonRpcResponse::error(
                            JsonRpcError::new(-32603, "Tool call cancelled".to_string()),
                            request.id,
                        )
                    }
                }
            }

            // Resources methods
            "resources/list" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let list_request = self.deserialize_list_resources_request(request.params.clone());

                if let Some(handler) = &self.resource_handler {
                    // For resources/list, we don't validate against roots since it's a general listing
                    // Root validation will be done when individual resources are accessed

                    match handler.list_resources(list_request).await {
                        Ok(response) => match serde_json::to_value(response) {
                            Ok(value) => JsonRpcResponse::success(value, request.id),
                            Err(e) => JsonRpcResponse::error(
                                JsonRpcError::new(-32603, format!("Serialization error: {e}")),
                                request.id,
                            ),
                        },
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Resources list failed: {e}")),
                            request.id,
                        ),
                    }
                } else {
                    JsonRpcResponse::error(
                        JsonRpcError::new(-32601, "Resources not supported".to_string()),
                        request.id,
                    )
                }
            }
            "resources/read" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let read_request = self.deserialize_read_resource_request(request.params.clone());

                if let Some(handler) = &self.resource_handler {
                    // Validate against roots if roots handler is available
                    if let Some(roots_handler) = &self.roots_handler {
                        match roots_handler.list_roots().await {
                            Ok(roots) => {
                                if let Err(e) = handler
                                    .validate_resource_access(
                                        &read_request.uri,
                                        ultrafast_mcp_core::types::roots::RootOperation::Read,
                                        &roots,
                                    )
                                    .await
                                {
                                    return JsonRpcResponse::error(
                                        JsonRpcError::new(
                                            -32603,
                                            format!("Root validation failed: {e}"),
                                        ),
                                        request.id,
                                    );
                                }
                            }
                            Err(e) => {
                                return JsonRpcResponse::error(
                                    JsonRpcError::new(-32603, format!("Failed to get roots: {e}")),
                                    request.id,
                                );
                            }
                        }
                    }

                    let uri = read_request.uri.clone();
                    match handler.read_resource(read_request).await {
                        Ok(response) => {
                            let dialect = self.sessions.negotiated_dialect(session_id).await;
                            JsonRpcResponse::success(
                                shape_resource_read(dialect, &uri, &response),
                                request.id,
                            )
                        }
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Resource read failed: {e}")),
                            request.id,
                        ),
                    }
                } else {
                    JsonRpcResponse::error(
                        JsonRpcError::new(-32601, "Resources not supported".to_string()),
                        request.id,
                    )
                }
            }
            "resources/templates/list" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let list_request =
                    self.deserialize_list_resource_templates_request(request.params.clone());

                if let Some(handler) = &self.resource_handler {
                    match handler.list_resource_templates(list_request).await {
                        Ok(response) => JsonRpcResponse::success(
                            serde_json::to_value(response).unwrap(),
                            request.id,
                        ),
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(
                                -32603,
                                format!("Resource templates list failed: {e}"),
                            ),
                            request.id,
                        ),
                    }
                } else {
                    JsonRpcResponse::error(
                        JsonRpcError::new(-32601, "Resources not supported".to_string()),
                        request.id,
                    )
                }
            }
            "resources/subscribe" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let subscribe_request = self.deserialize_subscribe_request(request.params.clone());

                // Validate against roots if roots handler is available
                if let Some(roots_handler) = &self.roots_handler {
                    if let Some(resource_handler) = &self.resource_handler {
                        match roots_handler.list_roots().await {
                            Ok(roots) => {
                                if let Err(e) = resource_handler
                                    .validate_resource_access(
                                        &subscribe_request.uri,
                                        ultrafast_mcp_core::types::roots::RootOperation::Read,
                                        &roots,
                                    )
                                    .await
                                {
                                    return JsonRpcResponse::error(
                                        JsonRpcError::new(
                                            -32603,
                                            format!("Root validation failed: {e}"),
                                        ),
                                        request.id,
                                    );
                                }
                            }
                            Err(e) => {
                                return JsonRpcResponse::error(
                                    JsonRpcError::new(-32603, format!("Failed to get roots: {e}")),
                                    request.id,
                                );
                            }
                        }
                    }
                }

                // Subscriptions are intrinsic engine state (the per-session
                // `uri -> {sessionIds}` table `SessionManager` already owns),
                // not something an integrator must opt into by wiring a
                // `ResourceSubscriptionHandler`; drive it directly off
                // `self.sessions` and only additionally consult a handler, if
                // one is registered, for side effects such as starting a
                // filesystem watcher.
                if subscribe_request.uri.is_empty() {
                    self.sessions.unsubscribe_all(session_id).await;
                } else {
                    self.sessions.subscribe(session_id, &subscribe_request.uri).await;
                }

                if let Some(handler) = &self.subscription_handler {
                    if let Err(e) = handler.subscribe(subscribe_request.uri.clone()).await {
                        return JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Resource subscribe failed: {e}")),
                            request.id,
                        );
                    }
                }

                // Note: the client may time out if it expects immediate
                // notifications; this is a limitation of the current MCP
                // architecture.
                JsonRpcResponse::success(
                    serde_json::to_value(SubscribeResponse::new()).unwrap(),
                    request.id,
                )
            }
            "resources/unsubscribe" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let unsubscribe_request =
                    self.deserialize_unsubscribe_request(request.params.clone());

                self.sessions.unsubscribe(session_id, &unsubscribe_request.uri).await;

                if let Some(handler) = &self.subscription_handler {
                    if let Err(e) = handler.unsubscribe(unsubscribe_request.uri.clone()).await {
                        return JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Resource unsubscribe failed: {e}")),
                            request.id,
                        );
                    }
                }

                JsonRpcResponse::success(serde_json::Value::Null, request.id)
            }

            // Prompts methods
            "prompts/list" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let list_request = self.deserialize_list_prompts_request(request.params.clone());

                if let Some(handler) = &self.prompt_handler {
                    match handler.list_prompts(list_request).await {
                        Ok(response) => JsonRpcResponse::success(
                            serde_json::to_value(response).unwrap(),
                            request.id,
                        ),
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Prompts list failed: {e}")),
                            request.id,
                        ),
                    }
                } else {
                    JsonRpcResponse::error(
                        JsonRpcError::new(-32601, "Prompts not supported".to_string()),
                        request.id,
                    )
                }
            }
            "prompts/get" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let get_request = self.deserialize_get_prompt_request(request.params.clone());

                if let Some(handler) = &self.prompt_handler {
                    match handler.get_prompt(get_request).await {
                        Ok(response) => JsonRpcResponse::success(
                            serde_json::to_value(response).unwrap(),
                            request.id,
                        ),
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Prompt get failed: {e}")),
                            request.id,
                        ),
                    }
                } else {
                    JsonRpcResponse::error(
                        JsonRpcError::new(-32601, "Prompts not supported".to_string()),
                        request.id,
                    )
                }
            }

            // Completion methods
            "completion/complete" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let complete_request = self.deserialize_complete_request(request.params.clone());

                let outcome = if let Some(handler) = &self.completion_handler {
                    handler.complete(complete_request).await
                } else {
                    self.complete_from_registries(&complete_request).await
                };

                match outcome {
                    Ok(response) => JsonRpcResponse::success(
                        serde_json::to_value(response).unwrap(),
                        request.id,
                    ),
                    Err(e) => JsonRpcResponse::error(
                        JsonRpcError::new(-32603, format!("Completion failed: {e}")),
                        request.id,
                    ),
                }
            }

            // Sampling methods
            "sampling/createMessage" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let create_request =
                    self.deserialize_create_message_request(request.params.clone());

                if let Some(handler) = &self.sampling_handler {
                    match handler.create_message(create_request).await {
                        Ok(response) => JsonRpcResponse::success(
                            serde_json::to_value(response).unwrap(),
                            request.id,
                        ),
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Message creation failed: {e}")),
                            request.id,
                        ),
                    }
                } else {
                    JsonRpcResponse::error(
                        JsonRpcError::new(-32601, "Sampling not supported".to_string()),
                        request.id,
                    )
                }
            }

            // Roots methods
            "roots/list" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                if let Some(handler) = &self.roots_handler {
                    match handler.list_roots().await {
                        Ok(response) => JsonRpcResponse::success(
                            serde_json::to_value(response).unwrap(),
                            request.id,
                        ),
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Roots list failed: {e}")),
                            request.id,
                        ),
                    }
                } else {
                    JsonRpcResponse::error(
                        JsonRpcError::new(-32601, "Roots not supported".to_string()),
                        request.id,
                    )
                }
            }

            // Elicitation methods
            "elicitation/create" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let elicitation_request =
                    self.deserialize_elicitation_request(request.params.clone());

                if let Some(handler) = &self.elicitation_handler {
                    match handler.handle_elicitation(elicitation_request).await {
                        Ok(response) => JsonRpcResponse::success(
                            serde_json::to_value(response).unwrap(),
                            request.id,
                        ),
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Elicitation failed: {e}")),
                            request.id,
                        ),
                    }
                } else {
                    JsonRpcResponse::error(
                        JsonRpcError::new(-32601, "Elicitation not supported".to_string()),
                        request.id,
                    )
                }
            }

            "elicitation/respond" => {
                if !self.session_ready(session_id).await {
                    return JsonRpcResponse::error(
                        JsonRpcError::invalid_request(Some(
                            "Session is not initialized".to_string(),
                        )),
                        request.id,
                    );
                }

                let elicitation_response = match serde_json::from_value::<
                    ultrafast_mcp_core::types::elicitation::ElicitationResponse,
                >(
                    request.params.unwrap_or_default()
                ) {
                    Ok(response) => response,
                    Err(e) => {
                        return JsonRpcResponse::error(
                            JsonRpcError::new(-32602, format!("Invalid elicitation response: {e}")),
                            request.id,
                        );
                    }
                };

                // Log the elicitation response
                info!(
                    "Received elicitation response: {:?}",
                    elicitation_response.action
                );

                // In a real implementation, this would be handled by the server's elicitation flow
                // For now, we'll just return success
                JsonRpcResponse::success(serde_json::json!({}), request.id)
            }

            // Logging methods
            "logging/setLevel" => {
                let params = match &request.params {
                    Some(params) => params,
                    None => {
                        return JsonRpcResponse::error(
                            JsonRpcError::new(-32602, "Missing parameters".to_string()),
                            request.id,
                        );
                    }
                };

                match serde_json::from_value::<LogLevelSetRequest>(params.clone()) {
                    Ok(set_request) => match self.set_log_level(set_request.level).await {
                        Ok(()) => {
                            let response = LogLevelSetResponse::new();
                            JsonRpcResponse::success(
                                serde_json::to_value(response).unwrap(),
                                request.id,
                            )
                        }
                        Err(e) => JsonRpcResponse::error(
                            JsonRpcError::new(-32603, format!("Failed to set log level: {e}")),
                            request.id,
                        ),
                    },
                    Err(e) => JsonRpcResponse::error(
                        JsonRpcError::new(-32602, format!("Invalid log level set request: {e}")),
                        request.id,
                    ),
                }
            }

            // Ping method for connection health monitoring
            "ping" => {
                let ping_request = match serde_json::from_value::<
                    ultrafast_mcp_core::types::notifications::PingRequest,
                >(request.params.unwrap_or_default())
                {
                    Ok(req) => req,
                    Err(_) => ultrafast_mcp_core::types::notifications::PingRequest { data: None },
                };

                match self.ping_manager.handle_ping(ping_request).await {
                    Ok(response) => JsonRpcResponse::success(
                        serde_json::to_value(response).unwrap(),
                        request.id,
                    ),
                    Err(e) => JsonRpcResponse::error(
                        JsonRpcError::new(-32603, format!("Ping failed: {e}")),
                        request.id,
                    ),
                }
            }

            // Roots methods
            "roots/set" => {
                let params = match &request.params {
                    Some(params) => params,
                    None => {
                        return JsonRpcResponse::error(
                            JsonRpcError::new(-32602, "Missing parameters".to_string()),
                            request.id,
                        );
                    }
                };

                match serde_json::from_value::<SetRootsRequest>(params.clone()) {
                    Ok(set_request) => {
                        let response = self
                            .handle_set_roots(
                                set_request.roots,
                                &mut Box::new(
                                    create_transport(TransportConfig::Stdio).await.unwrap(),
                                ),
                            )
                            .await;
                        JsonRpcResponse::success(
                            serde_json::to_value(response).unwrap(),
                            request.id,
                        )
                    }
                    Err(e) => JsonRpcResponse::error(
                        JsonRpcError::new(-32602, format!("Invalid roots set request: {e}")),
                        request.id,
                    ),
                }
            }

            // Unknown method
            _ => JsonRpcResponse::error(
                JsonRpcError::new(
                    -32601,
                    format!("Method not implemented: {}", request.method),
                ),
                request.id,
            ),
        }
    }

    /// Handle incoming notifications
    async fn handle_notification(
        &self,
        session_id: &str,
        notification: JsonRpcRequest,
    ) -> MCPResult<()> {
        info!("Handling notification: {}", notification.method);

        if let Err(e) = self
            .hooks
            .read()
            .await
            .run_before_handle_notification(&notification)
            .await
        {
            warn!("beforeHandleNotification hook failed: {}", e);
            return Ok(());
        }

        match notification.method.as_str() {
            "initialized" => {
                let notification = ultrafast_mcp_core::protocol::InitializedNotification {};
                self.handle_initialized(session_id, notification).await?;
                Ok(())
            }
            "$/cancelled" => {
                // Handle cancellation notification
                if let Some(params) = notification.params {
                    let cancellation_notification: ultrafast_mcp_core::types::notifications::CancelledNotification =
                        serde_json::from_value(params)?;

                    // Use the cancellation manager to handle the cancellation
                    let _cancelled = self
                        .cancellation_manager
                        .handle_cancellation(cancellation_notification)
                        .await?;
                    info!("Cancellation notification processed");
                }
                Ok(())
            }
            _ => {
                warn!("Unknown notification method: {}", notification.method);
                Ok(())
            }
        }
    }

    // ===== NOTIFICATION METHODS =====

    /// Send tools list changed notification
    pub async fn notify_tools_changed(&self, transport: &mut Box<dyn Transport>) -> MCPResult<()> {
        let notification =
            ultrafast_mcp_core::types::notifications::ToolsListChangedNotification::new();
        self.send_notification(
            "notifications/tools/list_changed",
            Some(serde_json::to_value(notification)?),
            transport,
        )
        .await
    }

    /// Send resources list changed notification
    pub async fn notify_resources_changed(
        &self,
        transport: &mut Box<dyn Transport>,
    ) -> MCPResult<()> {
        let notification =
            ultrafast_mcp_core::types::notifications::ResourcesListChangedNotification::new();
        self.send_notification(
            "notifications/resources/list_changed",
            Some(serde_json::to_value(notification)?),
            transport,
        )
        .await
    }

    /// Send prompts list changed notification
    pub async fn notify_prompts_changed(
        &self,
        transport: &mut Box<dyn Transport>,
    ) -> MCPResult<()> {
        let notification =
            ultrafast_mcp_core::types::notifications::PromptsListChangedNotification::new();
        self.send_notification(
            "notifications/prompts/list_changed",
            Some(serde_json::to_value(notification)?),
            transport,
        )
        .await
    }

    /// Send resource updated notification
    pub async fn notify_resource_updated(
        &self,
        uri: String,
        transport: &mut Box<dyn Transport>,
    ) -> MCPResult<()> {
        let notification =
            ultrafast_mcp_core::types::resources::ResourceUpdatedNotification { uri };
        self.send_notification(
            "notifications/resources/updated",
            Some(serde_json::to_value(notification)?),
            transport,
        )
        .await
    }

    /// Send progress notification
    pub async fn notify_progress(
        &self,
        progress_token: serde_json::Value,
        progress: f64,
        total: Option<f64>,
        message: Option<String>,
        transport: &mut Box<dyn Transport>,
    ) -> MCPResult<()> {
        let mut notification = ultrafast_mcp_core::types::notifications::ProgressNotification::new(
            progress_token,
            progress,
        );
        if let Some(total) = total {
            notification = notification.with_total(total);
        }
        if let Some(message) = message {
            notification = notification.with_message(message);
        }
        self.send_notification(
            "$/progress",
            Some(serde_json::to_value(notification)?),
            transport,
        )
        .await
    }

    /// Send logging message notification
    pub async fn notify_logging_message(
        &self,
        level: ultrafast_mcp_core::types::notifications::LogLevel,
        data: serde_json::Value,
        logger: Option<String>,
        transport: &mut Box<dyn Transport>,
    ) -> MCPResult<()> {
        let mut notification =
            ultrafast_mcp_core::types::notifications::LoggingMessageNotification::new(level, data);
        if let Some(logger) = logger {
            notification = notification.with_logger(logger);
        }
        self.send_notification(
            "notifications/logging/message",
            Some(serde_json::to_value(notification)?),
            transport,
        )
        .await
    }

    /// Send cancellation notification
    pub async fn notify_cancelled(
        &self,
        request_id: serde_json::Value,
        reason: Option<String>,
        transport: &mut Box<dyn Transport>,
    ) -> MCPResult<()> {
        let mut notification =
            ultrafast_mcp_core::types::notifications::CancelledNotification::new(request_id);
        if let Some(reason) = reason {
            notification = notification.with_reason(reason);
        }
        self.send_notification(
            "$/cancelled",
            Some(serde_json::to_value(notification)?),
            transport,
        )
        .await
    }

    /// Send roots list changed notification
    pub async fn notify_roots_changed(&self, transport: &mut Box<dyn Transport>) -> MCPResult<()> {
        let notification =
            ultrafast_mcp_core::types::notifications::RootsListChangedNotification::new();
        self.send_notification(
            "notifications/roots/listChanged",
            Some(serde_json::to_value(notification)?),
            transport,
        )
        .await
    }

    /// Generic method to send notifications
    async fn send_notification(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
        transport: &mut Box<dyn Transport>,
    ) -> MCPResult<()> {
        let notification = JsonRpcRequest {
            jsonrpc: Cow::Borrowed("2.0"),
            id: None, // Notifications have no ID
            method: method.to_string(),
            params,
            meta: std::collections::HashMap::new(),
        };

        transport
            .send_message(JsonRpcMessage::Request(notification))
            .await
            .map_err(|e| MCPError::internal_error(format!("Failed to send notification: {e}")))?;

        info!("Sent notification: {}", method);
        Ok(())
    }

    /// Set the advanced sampling handler for context collection and human-in-the-loop features
    pub fn with_advanced_sampling_handler(
        mut self,
        handler: Arc<dyn AdvancedSamplingHandler>,
    ) -> Self {
        self.advanced_sampling_handler = Some(handler);
        self
    }

    /// Set the advanced sampling handler with default implementation
    pub fn with_default_advanced_sampling(mut self) -> Self {
        let default_handler = Arc::new(DefaultAdvancedSamplingHandler::new(self.info.clone()));
        self.advanced_sampling_handler = Some(default_handler);
        self
    }

    /// Handle a roots/set request
    pub async fn handle_set_roots(
        &self,
        roots: Vec<ultrafast_mcp_core::types::roots::Root>,
        transport: &mut Box<dyn Transport>,
    ) -> SetRootsResponse {
        if let Some(handler) = &self.roots_handler {
            match handler.set_roots(roots.clone()).await {
                Ok(_) => {
                    // Send notification to all clients (for demo, just send to this transport)
                    let notification = RootsListChangedNotification { roots };
                    let params = serde_json::to_value(notification).ok();
                    let _ = self
                        .send_notification("roots/listChanged", params, transport)
                        .await;
                    SetRootsResponse {
                        success: true,
                        error: None,
                    }
                }
                Err(e) => SetRootsResponse {
                    success: false,
                    error: Some(e.to_string()),
                },
            }
        } else {
            SetRootsResponse {
                success: false,
                error: Some("Roots handler not available".to_string()),
            }
        }
    }
}
