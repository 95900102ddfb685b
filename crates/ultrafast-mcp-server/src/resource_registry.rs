//! Built-in resource registry: static resource backings and URI-template
//! handlers, matched and dispatched the way §4.2/§4.5 of the MCP core spec
//! describes the Registry and ExecutionEngine resource-read path.
//!
//! Grounded on `praxiomlabs-mcpkit`'s `ResourceService`
//! (`capability/resources.rs`): a registry that resolves a static-URI table
//! before falling back to registration-order template matching. Extended
//! here with the polymorphic `ResourceBacking` union (inline/file/directory/
//! url/handler) and reflective-by-name parameter binding that the donor
//! crate's single-`ResourceHandler`-trait model didn't need.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tokio::sync::RwLock;
use ultrafast_mcp_core::error::{MCPError, MCPResult, ResourceError};
use ultrafast_mcp_core::types::resources::{
    ListResourceTemplatesRequest, ListResourceTemplatesResponse, ListResourcesRequest,
    ListResourcesResponse, ReadResourceRequest, ReadResourceResponse, Resource, ResourceContent,
    ResourceTemplate as WireResourceTemplate,
};

use crate::handlers::ResourceHandler;
use crate::mime;

/// Page size for `resources/list` and `resources/templates/list`, per §4.6.
const PAGE_SIZE: usize = 50;

/// Output a static or template handler may produce; converted to one or
/// more `ResourceContent`s per the conversion rules in §4.5 point 3.
pub enum ResourceOutput {
    Contents(Vec<ResourceContent>),
    Text(String),
    Bytes(Vec<u8>),
    Json(Value),
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type StaticHandlerFn = Arc<dyn Fn() -> BoxFuture<MCPResult<ResourceOutput>> + Send + Sync>;
type TemplateHandlerFn = Arc<dyn Fn(Vec<Value>) -> BoxFuture<MCPResult<ResourceOutput>> + Send + Sync>;

/// Exactly one of these backs a registered static resource, per §3's
/// "tagged union {Inline, File, Dir, URL, Handler}" design note.
pub enum ResourceBacking {
    InlineText { text: String, content_type: String },
    InlineBytes { bytes: Vec<u8>, content_type: String },
    File { path: PathBuf },
    Directory { path: PathBuf },
    Url { url: String, mime_override: Option<String> },
    Handler(StaticHandlerFn),
}

impl ResourceBacking {
    pub fn inline_text(text: impl Into<String>) -> Self {
        Self::InlineText {
            text: text.into(),
            content_type: "text/plain".to_string(),
        }
    }

    pub fn inline_text_with_type(text: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self::InlineText {
            text: text.into(),
            content_type: content_type.into(),
        }
    }

    pub fn inline_bytes(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self::InlineBytes {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory { path: path.into() }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url {
            url: url.into(),
            mime_override: None,
        }
    }

    pub fn url_with_mime(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::Url {
            url: url.into(),
            mime_override: Some(mime_type.into()),
        }
    }

    pub fn handler<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = MCPResult<ResourceOutput>> + Send + 'static,
    {
        Self::Handler(Arc::new(move || Box::pin(f())))
    }
}

/// A statically-addressed resource: fixed URI plus the one backing that
/// serves reads of it.
pub struct RegisteredResource {
    pub uri: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
    pub tags: Vec<String>,
    pub backing: ResourceBacking,
}

impl RegisteredResource {
    fn descriptor(&self) -> Resource {
        let mut resource = Resource::new(self.uri.clone(), self.name.clone());
        resource.description = self.description.clone();
        resource.mime_type = self.mime_type.clone();
        resource
    }
}

/// The declared type of a URI-template variable, used to coerce the raw
/// string captured out of the URI into a typed JSON value before the
/// handler is invoked. Rust has no signature reflection (see §9's design
/// note), so this is the explicit stand-in for the source's positional
/// reflective binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Str,
    Int,
    Float,
    Bool,
    StringList,
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<String>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn coerce(&self, raw: Option<&str>) -> MCPResult<Value> {
        let raw = match raw.or(self.default.as_deref()) {
            Some(v) => v,
            None => {
                return Err(MCPError::invalid_params(format!(
                    "missing required URI template variable '{}'",
                    self.name
                )));
            }
        };

        match self.kind {
            ParamKind::Str => Ok(Value::String(raw.to_string())),
            ParamKind::Int => raw.parse::<i64>().map(Value::from).map_err(|_| {
                MCPError::invalid_params(format!(
                    "URI template variable '{}' is not an integer: '{raw}'",
                    self.name
                ))
            }),
            ParamKind::Float => raw.parse::<f64>().map(Value::from).map_err(|_| {
                MCPError::invalid_params(format!(
                    "URI template variable '{}' is not a float: '{raw}'",
                    self.name
                ))
            }),
            ParamKind::Bool => raw.parse::<bool>().map(Value::from).map_err(|_| {
                MCPError::invalid_params(format!(
                    "URI template variable '{}' is not a bool: '{raw}'",
                    self.name
                ))
            }),
            ParamKind::StringList => Ok(Value::Array(
                raw.split(',').map(|s| Value::String(s.to_string())).collect(),
            )),
        }
    }
}

/// A compiled URI template bound to a handler, per §3's ResourceTemplate
/// and §9's "shared dispatcher pattern-matches and calls the appropriate
/// reader" note.
pub struct RegisteredTemplate {
    pattern: String,
    regex: Regex,
    var_names: Vec<String>,
    name: String,
    description: Option<String>,
    mime_type: Option<String>,
    param_specs: Vec<ParamSpec>,
    handler: TemplateHandlerFn,
}

impl RegisteredTemplate {
    fn descriptor(&self) -> WireResourceTemplate {
        let mut template = WireResourceTemplate::new(self.pattern.clone(), self.name.clone());
        template.description = self.description.clone();
        template.mime_type = self.mime_type.clone();
        template
    }

    /// Match `uri` against this template, returning the captured variables
    /// by name if it matches.
    fn matches(&self, uri: &str) -> Option<std::collections::HashMap<String, String>> {
        let caps = self.regex.captures(uri)?;
        let mut vars = std::collections::HashMap::new();
        for name in &self.var_names {
            if let Some(m) = caps.name(name) {
                vars.insert(name.clone(), m.as_str().to_string());
            }
        }
        Some(vars)
    }
}

/// Compile an RFC-6570-flavored URI template (`{name}` and wildcard
/// `{name*}` forms) into an anchored regex with one named capture group per
/// variable. `{name*}` matches greedily (including path separators);
/// `{name}` matches a single non-slash segment.
fn compile_template(pattern: &str) -> Result<(Regex, Vec<String>), regex::Error> {
    lazy_static::lazy_static! {
        static ref VAR_RE: Regex = Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)(\*)?\}").unwrap();
    }

    let mut regex_str = String::from("^");
    let mut last_end = 0;
    let mut var_names = Vec::new();

    for cap in VAR_RE.captures_iter(pattern) {
        let whole = cap.get(0).unwrap();
        regex_str.push_str(&regex::escape(&pattern[last_end..whole.start()]));

        let name = cap.get(1).unwrap().as_str().to_string();
        let wildcard = cap.get(2).is_some();
        if wildcard {
            regex_str.push_str(&format!("(?P<{name}>.*)"));
        } else {
            regex_str.push_str(&format!("(?P<{name}>[^/]+)"));
        }
        var_names.push(name);
        last_end = whole.end();
    }
    regex_str.push_str(&regex::escape(&pattern[last_end..]));
    regex_str.push('$');

    let regex = Regex::new(&regex_str)?;
    Ok((regex, var_names))
}

/// Policy applied when a resource or template is registered under a URI or
/// pattern that already exists, per §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Error,
    Replace,
    Ignore,
    WarnAndReplace,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("resource already registered: {0}")]
    ResourceExists(String),
    #[error("template already registered: {0}")]
    TemplateExists(String),
    #[error("invalid URI template '{0}': {1}")]
    InvalidTemplate(String, String),
}

/// Thread-safe, registration-order-preserving table of static resources and
/// URI templates, implementing `ResourceHandler` so it can be dropped
/// directly into `UltraFastServer::with_resource_handler`.
pub struct ResourceRegistry {
    resources: RwLock<Vec<RegisteredResource>>,
    // A `Vec`, not a map: §9's design note (b) requires deterministic
    // first-match-wins iteration in registration order.
    templates: RwLock<Vec<RegisteredTemplate>>,
    policy: DuplicatePolicy,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(Vec::new()),
            templates: RwLock::new(Vec::new()),
            policy: DuplicatePolicy::Error,
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn register_resource(
        &self,
        resource: RegisteredResource,
    ) -> Result<(), RegistrationError> {
        let mut resources = self.resources.write().await;
        if let Some(idx) = resources.iter().position(|r| r.uri == resource.uri) {
            match self.policy {
                DuplicatePolicy::Error => {
                    return Err(RegistrationError::ResourceExists(resource.uri));
                }
                DuplicatePolicy::Ignore => return Ok(()),
                DuplicatePolicy::Replace => {
                    resources[idx] = resource;
                    return Ok(());
                }
                DuplicatePolicy::WarnAndReplace => {
                    tracing::warn!(uri = %resource.uri, "replacing already-registered resource");
                    resources[idx] = resource;
                    return Ok(());
                }
            }
        }
        resources.push(resource);
        Ok(())
    }

    pub async fn unregister_resource(&self, uri: &str) -> bool {
        let mut resources = self.resources.write().await;
        let before = resources.len();
        resources.retain(|r| r.uri != uri);
        resources.len() != before
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn register_template(
        &self,
        pattern: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        param_specs: Vec<ParamSpec>,
        handler: TemplateHandlerFn,
    ) -> Result<(), RegistrationError> {
        let pattern = pattern.into();
        let (regex, var_names) = compile_template(&pattern)
            .map_err(|e| RegistrationError::InvalidTemplate(pattern.clone(), e.to_string()))?;

        let entry = RegisteredTemplate {
            pattern: pattern.clone(),
            regex,
            var_names,
            name: name.into(),
            description,
            mime_type,
            param_specs,
            handler,
        };

        let mut templates = self.templates.write().await;
        if let Some(idx) = templates.iter().position(|t| t.pattern == pattern) {
            match self.policy {
                DuplicatePolicy::Error => {
                    return Err(RegistrationError::TemplateExists(pattern));
                }
                DuplicatePolicy::Ignore => return Ok(()),
                DuplicatePolicy::Replace => {
                    templates[idx] = entry;
                    return Ok(());
                }
                DuplicatePolicy::WarnAndReplace => {
                    tracing::warn!(pattern = %pattern, "replacing already-registered template");
                    templates[idx] = entry;
                    return Ok(());
                }
            }
        }
        templates.push(entry);
        Ok(())
    }

    pub async fn unregister_template(&self, pattern: &str) -> bool {
        let mut templates = self.templates.write().await;
        let before = templates.len();
        templates.retain(|t| t.pattern != pattern);
        templates.len() != before
    }

    async fn read_static(uri: &str, backing: &ResourceBacking) -> MCPResult<Vec<ResourceContent>> {
        match backing {
            ResourceBacking::InlineText { text, content_type } => Ok(vec![
                ResourceContent::text_with_mime_type(uri.to_string(), text.clone(), content_type.clone()),
            ]),
            ResourceBacking::InlineBytes { bytes, content_type } => {
                use base64::Engine;
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                Ok(vec![ResourceContent::blob(
                    uri.to_string(),
                    encoded,
                    content_type.clone(),
                )])
            }
            ResourceBacking::File { path } => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| MCPError::operation_failed(format!("reading {path:?}: {e}")))?;
                let mime_type = mime::infer_from_path(path).unwrap_or_else(|| "application/octet-stream".to_string());
                match mime::classify(&mime_type) {
                    mime::ContentClass::Text => {
                        let text = String::from_utf8(bytes).map_err(|e| {
                            MCPError::operation_failed(format!("file {path:?} is not valid UTF-8: {e}"))
                        })?;
                        Ok(vec![ResourceContent::text_with_mime_type(
                            uri.to_string(),
                            text,
                            mime_type,
                        )])
                    }
                    mime::ContentClass::Audio | mime::ContentClass::Blob => {
                        use base64::Engine;
                        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
                        Ok(vec![ResourceContent::blob(uri.to_string(), encoded, mime_type)])
                    }
                }
            }
            ResourceBacking::Directory { path } => {
                let mut entries = Vec::new();
                let mut read_dir = tokio::fs::read_dir(path)
                    .await
                    .map_err(|e| MCPError::operation_failed(format!("listing {path:?}: {e}")))?;
                while let Some(entry) = read_dir
                    .next_entry()
                    .await
                    .map_err(|e| MCPError::operation_failed(format!("listing {path:?}: {e}")))?
                {
                    let metadata = entry
                        .metadata()
                        .await
                        .map_err(|e| MCPError::operation_failed(format!("stat {:?}: {e}", entry.path())))?;
                    let modified = metadata
                        .modified()
                        .ok()
                        .map(chrono::DateTime::<chrono::Utc>::from)
                        .map(|dt| dt.to_rfc3339())
                        .unwrap_or_default();
                    entries.push(serde_json::json!({
                        "name": entry.file_name().to_string_lossy(),
                        "path": entry.path().to_string_lossy(),
                        "isDir": metadata.is_dir(),
                        "size": metadata.len(),
                        "modTime": modified,
                    }));
                }
                let value = serde_json::Value::Array(entries);
                Ok(vec![ResourceContent::json(uri.to_string(), &value)])
            }
            ResourceBacking::Url { url, mime_override } => {
                let response = reqwest::get(url)
                    .await
                    .map_err(|e| MCPError::operation_failed(format!("GET {url}: {e}")))?;
                if !response.status().is_success() {
                    return Err(MCPError::operation_failed(format!(
                        "GET {url} returned {}",
                        response.status()
                    )));
                }
                let reported_mime = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(|s| s.split(';').next().unwrap_or(s).trim().to_string());
                let mime_type = mime_override
                    .clone()
                    .or(reported_mime)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| MCPError::operation_failed(format!("reading body of {url}: {e}")))?;
                match mime::classify(&mime_type) {
                    mime::ContentClass::Text => {
                        let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                            MCPError::operation_failed(format!("{url} body is not valid UTF-8: {e}"))
                        })?;
                        Ok(vec![ResourceContent::text_with_mime_type(uri.to_string(), text, mime_type)])
                    }
                    mime::ContentClass::Audio | mime::ContentClass::Blob => {
                        use base64::Engine;
                        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
                        Ok(vec![ResourceContent::blob(uri.to_string(), encoded, mime_type)])
                    }
                }
            }
            ResourceBacking::Handler(handler) => {
                let output = handler().await?;
                Ok(shape_output(uri, output))
            }
        }
    }
}

fn shape_output(uri: &str, output: ResourceOutput) -> Vec<ResourceContent> {
    match output {
        ResourceOutput::Contents(contents) => contents,
        ResourceOutput::Text(text) => vec![ResourceContent::text(uri.to_string(), text)],
        ResourceOutput::Bytes(bytes) => {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
            vec![ResourceContent::blob(
                uri.to_string(),
                encoded,
                "application/octet-stream".to_string(),
            )]
        }
        ResourceOutput::Json(value) => vec![ResourceContent::json(uri.to_string(), &value)],
    }
}

#[async_trait]
impl ResourceHandler for ResourceRegistry {
    async fn read_resource(&self, request: ReadResourceRequest) -> MCPResult<ReadResourceResponse> {
        // 1. Exact-URI static resource, dispatched by backing (§4.5 point 1).
        {
            let resources = self.resources.read().await;
            if let Some(resource) = resources.iter().find(|r| r.uri == request.uri) {
                let contents = Self::read_static(&request.uri, &resource.backing).await?;
                return Ok(ReadResourceResponse { contents });
            }
        }

        // 2. Template match, registration order, first match wins (§9 open
        // question (b)).
        let matched = {
            let templates = self.templates.read().await;
            templates
                .iter()
                .enumerate()
                .find_map(|(idx, t)| t.matches(&request.uri).map(|vars| (idx, vars)))
        };

        if let Some((idx, vars)) = matched {
            let templates = self.templates.read().await;
            let template = &templates[idx];
            let mut args = Vec::with_capacity(template.param_specs.len());
            for spec in &template.param_specs {
                args.push(spec.coerce(vars.get(&spec.name).map(|s| s.as_str()))?);
            }
            let output = (template.handler)(args).await?;
            return Ok(ReadResourceResponse {
                contents: shape_output(&request.uri, output),
            });
        }

        // 3. No match.
        Err(MCPError::Resource(ResourceError::NotFound(request.uri)))
    }

    async fn list_resources(
        &self,
        request: ListResourcesRequest,
    ) -> MCPResult<ListResourcesResponse> {
        let resources = self.resources.read().await;
        let start = match &request.cursor {
            Some(cursor) => resources
                .iter()
                .position(|r| &r.uri == cursor)
                .map(|i| i + 1)
                .unwrap_or(0),
            None => 0,
        };
        let page: Vec<Resource> = resources
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|r| r.descriptor())
            .collect();
        let next_cursor = if start + page.len() < resources.len() {
            page.last().map(|r| r.uri.clone())
        } else {
            None
        };
        Ok(ListResourcesResponse {
            resources: page,
            next_cursor,
        })
    }

    async fn list_resource_templates(
        &self,
        request: ListResourceTemplatesRequest,
    ) -> MCPResult<ListResourceTemplatesResponse> {
        let templates = self.templates.read().await;
        let start = match &request.cursor {
            Some(cursor) => templates
                .iter()
                .position(|t| &t.pattern == cursor)
                .map(|i| i + 1)
                .unwrap_or(0),
            None => 0,
        };
        let page: Vec<WireResourceTemplate> = templates
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|t| t.descriptor())
            .collect();
        let next_cursor = if start + page.len() < templates.len() {
            page.last().map(|t| t.uri_template.clone())
        } else {
            None
        };
        Ok(ListResourceTemplatesResponse {
            resource_templates: page,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_simple_template() {
        let (regex, vars) = compile_template("users://{user_id}/posts/{post_id}").unwrap();
        assert_eq!(vars, vec!["user_id", "post_id"]);
        let caps = regex.captures("users://42/posts/7").unwrap();
        assert_eq!(&caps["user_id"], "42");
        assert_eq!(&caps["post_id"], "7");
        assert!(regex.captures("users://42/comments/7").is_none());
    }

    #[test]
    fn compiles_wildcard_template() {
        let (regex, vars) = compile_template("files://{path*}").unwrap();
        assert_eq!(vars, vec!["path"]);
        let caps = regex.captures("files://a/b/c.txt").unwrap();
        assert_eq!(&caps["path"], "a/b/c.txt");
    }

    #[tokio::test]
    async fn registers_and_reads_inline_text() {
        let registry = ResourceRegistry::new();
        registry
            .register_resource(RegisteredResource {
                uri: "mem://greeting".to_string(),
                name: "greeting".to_string(),
                description: None,
                mime_type: Some("text/plain".to_string()),
                tags: vec![],
                backing: ResourceBacking::inline_text("hello"),
            })
            .await
            .unwrap();

        let response = registry
            .read_resource(ReadResourceRequest {
                uri: "mem://greeting".to_string(),
            })
            .await
            .unwrap();
        match &response.contents[0] {
            ResourceContent::Text { text, uri, .. } => {
                assert_eq!(text, "hello");
                assert_eq!(uri, "mem://greeting");
            }
            _ => panic!("expected text content"),
        }
    }

    #[tokio::test]
    async fn duplicate_static_uri_errors_by_default() {
        let registry = ResourceRegistry::new();
        let make = || RegisteredResource {
            uri: "mem://x".to_string(),
            name: "x".to_string(),
            description: None,
            mime_type: None,
            tags: vec![],
            backing: ResourceBacking::inline_text("a"),
        };
        registry.register_resource(make()).await.unwrap();
        let err = registry.register_resource(make()).await.unwrap_err();
        assert!(matches!(err, RegistrationError::ResourceExists(_)));
    }

    #[tokio::test]
    async fn template_binds_named_params_in_registration_order() {
        let registry = ResourceRegistry::new();
        registry
            .register_template(
                "users://{user_id}/posts/{post_id}",
                "user_post",
                None,
                None,
                vec![
                    ParamSpec::new("user_id", ParamKind::Int),
                    ParamSpec::new("post_id", ParamKind::Str),
                ],
                Arc::new(|args: Vec<Value>| {
                    Box::pin(async move {
                        Ok(ResourceOutput::Json(serde_json::json!({
                            "user_id": args[0],
                            "post_id": args[1],
                        })))
                    })
                }),
            )
            .await
            .unwrap();

        let response = registry
            .read_resource(ReadResourceRequest {
                uri: "users://42/posts/abc".to_string(),
            })
            .await
            .unwrap();
        match &response.contents[0] {
            ResourceContent::Text { text, .. } => {
                let value: Value = serde_json::from_str(text).unwrap();
                assert_eq!(value["user_id"], 42);
                assert_eq!(value["post_id"], "abc");
            }
            _ => panic!("expected text content"),
        }
    }

    #[tokio::test]
    async fn missing_param_without_default_is_invalid_params() {
        let registry = ResourceRegistry::new();
        registry
            .register_template(
                "opt://{required}",
                "opt",
                None,
                None,
                vec![ParamSpec::new("required", ParamKind::Str)],
                Arc::new(|_args: Vec<Value>| {
                    Box::pin(async move { Ok(ResourceOutput::Text("unreachable".to_string())) })
                }),
            )
            .await
            .unwrap();

        // The template always captures `required` here because the pattern
        // itself demands a value; a genuinely optional variable is modeled
        // by giving its ParamSpec a default and matching a shorter pattern
        // elsewhere. This test exercises the coercion failure path directly.
        let spec = ParamSpec::new("required", ParamKind::Int);
        assert!(spec.coerce(Some("not-a-number")).is_err());
        assert!(spec.coerce(None).is_err());
        assert_eq!(
            spec.with_default("7").coerce(None).unwrap(),
            Value::from(7)
        );
    }

    #[tokio::test]
    async fn no_match_is_resource_not_found() {
        let registry = ResourceRegistry::new();
        let err = registry
            .read_resource(ReadResourceRequest {
                uri: "mem://absent".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MCPError::Resource(ResourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn pagination_sets_next_cursor_only_when_more_remain() {
        let registry = ResourceRegistry::new();
        for i in 0..3 {
            registry
                .register_resource(RegisteredResource {
                    uri: format!("mem://{i}"),
                    name: format!("r{i}"),
                    description: None,
                    mime_type: None,
                    tags: vec![],
                    backing: ResourceBacking::inline_text("x"),
                })
                .await
                .unwrap();
        }
        let response = registry
            .list_resources(ListResourcesRequest { cursor: None })
            .await
            .unwrap();
        assert_eq!(response.resources.len(), 3);
        assert!(response.next_cursor.is_none());
    }
}
