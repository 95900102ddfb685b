//! Built-in prompt registry: named prompt templates with `{{variable}}`
//! substitution, matching §3's Prompt data model and §4.6's `prompts/get`
//! behavior.
//!
//! Grounded on the same registration-order, reader/writer-locked table
//! shape as [`crate::resource_registry::ResourceRegistry`] — the donor
//! workspace's `PromptHandler` trait (`handlers.rs`) is, like
//! `ResourceHandler`, a single opaque object a user implements entirely
//! themselves; there was no built-in component storing individual prompts
//! the way §4.2/§4.6 describe. `DuplicatePolicy` is reused verbatim from
//! the resource registry rather than duplicated, since §4.2 describes one
//! duplicate-registration policy shared across tool/resource/prompt
//! registration.

use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tokio::sync::RwLock;
use ultrafast_mcp_core::error::{MCPError, MCPResult};
use ultrafast_mcp_core::types::prompts::{
    GetPromptRequest, GetPromptResponse, ListPromptsRequest, ListPromptsResponse, Prompt,
    PromptArgument, PromptContent, PromptMessage, PromptRole,
};

use crate::handlers::PromptHandler;
use crate::resource_registry::DuplicatePolicy;

/// Page size for `prompts/list`, per §4.6.
const PAGE_SIZE: usize = 50;

/// One role/content pair in a registered prompt, per §3's
/// `{role ∈ {system,user,assistant}, content, variables[]}`.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub role: PromptRole,
    /// Raw template text containing zero or more `{{name}}` markers.
    pub content: String,
}

impl PromptTemplate {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

/// A registered prompt: its templates plus the argument list surfaced on
/// `prompts/list`. Arguments default to one required entry per unique
/// `{{name}}` marker scanned out of the templates (§3's "each unique
/// variable becomes a required argument by default"), but can be
/// overridden (e.g. to mark one optional) via `with_arguments`.
pub struct RegisteredPrompt {
    name: String,
    description: Option<String>,
    templates: Vec<PromptTemplate>,
    arguments: Vec<PromptArgument>,
}

impl RegisteredPrompt {
    pub fn new(name: impl Into<String>, templates: Vec<PromptTemplate>) -> Self {
        let name = name.into();
        let arguments = scan_variables(&templates)
            .into_iter()
            .map(|var| PromptArgument {
                name: var,
                description: None,
                required: Some(true),
            })
            .collect();
        Self {
            name,
            description: None,
            templates,
            arguments,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the auto-derived argument list, e.g. to mark a scanned
    /// variable optional or attach a description.
    pub fn with_arguments(mut self, arguments: Vec<PromptArgument>) -> Self {
        self.arguments = arguments;
        self
    }

    fn descriptor(&self) -> Prompt {
        Prompt {
            name: self.name.clone(),
            description: self.description.clone(),
            arguments: if self.arguments.is_empty() {
                None
            } else {
                Some(self.arguments.clone())
            },
        }
    }
}

lazy_static::lazy_static! {
    static ref VAR_RE: Regex = Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}").unwrap();
}

/// Scan a prompt's templates for `{{name}}` markers, in first-appearance
/// order with duplicates removed, per §3.
fn scan_variables(templates: &[PromptTemplate]) -> Vec<String> {
    let mut seen = Vec::new();
    for template in templates {
        for cap in VAR_RE.captures_iter(&template.content) {
            let name = cap[1].to_string();
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
    }
    seen
}

/// Stringify a substitution value per §4.6: "strings as-is, nil as empty,
/// others as JSON".
fn stringify_argument(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn substitute(content: &str, args: &HashMap<String, Value>) -> String {
    VAR_RE
        .replace_all(content, |caps: &regex::Captures| {
            stringify_argument(args.get(&caps[1]))
        })
        .into_owned()
}

/// Thread-safe, registration-order-preserving table of prompts,
/// implementing `PromptHandler` so it drops directly into
/// `UltraFastServer::with_prompt_handler`.
pub struct PromptRegistry {
    prompts: RwLock<Vec<RegisteredPrompt>>,
    policy: DuplicatePolicy,
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self {
            prompts: RwLock::new(Vec::new()),
            policy: DuplicatePolicy::Error,
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn register(&self, prompt: RegisteredPrompt) -> Result<(), String> {
        let mut prompts = self.prompts.write().await;
        if let Some(idx) = prompts.iter().position(|p| p.name == prompt.name) {
            match self.policy {
                DuplicatePolicy::Error => {
                    return Err(format!("prompt already registered: {}", prompt.name));
                }
                DuplicatePolicy::Ignore => return Ok(()),
                DuplicatePolicy::Replace => {
                    prompts[idx] = prompt;
                    return Ok(());
                }
                DuplicatePolicy::WarnAndReplace => {
                    tracing::warn!(name = %prompt.name, "replacing already-registered prompt");
                    prompts[idx] = prompt;
                    return Ok(());
                }
            }
        }
        prompts.push(prompt);
        Ok(())
    }

    pub async fn unregister(&self, name: &str) -> bool {
        let mut prompts = self.prompts.write().await;
        let before = prompts.len();
        prompts.retain(|p| p.name != name);
        prompts.len() != before
    }
}

#[async_trait]
impl PromptHandler for PromptRegistry {
    async fn get_prompt(&self, request: GetPromptRequest) -> MCPResult<GetPromptResponse> {
        let prompts = self.prompts.read().await;
        let prompt = prompts
            .iter()
            .find(|p| p.name == request.name)
            .ok_or_else(|| MCPError::not_found(format!("prompt not found: {}", request.name)))?;

        let args: HashMap<String, Value> = match &request.arguments {
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => HashMap::new(),
        };

        for argument in &prompt.arguments {
            if argument.required == Some(true) && !args.contains_key(&argument.name) {
                return Err(MCPError::invalid_params(format!(
                    "missing required prompt argument '{}'",
                    argument.name
                )));
            }
        }

        let messages = prompt
            .templates
            .iter()
            .map(|template| PromptMessage {
                role: template.role.clone(),
                content: PromptContent::text(substitute(&template.content, &args)),
            })
            .collect();

        Ok(GetPromptResponse {
            description: prompt.description.clone(),
            messages,
        })
    }

    async fn list_prompts(&self, request: ListPromptsRequest) -> MCPResult<ListPromptsResponse> {
        let prompts = self.prompts.read().await;
        let start = match &request.cursor {
            Some(cursor) => prompts
                .iter()
                .position(|p| &p.name == cursor)
                .map(|i| i + 1)
                .unwrap_or(0),
            None => 0,
        };
        let page: Vec<Prompt> = prompts
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|p| p.descriptor())
            .collect();
        let next_cursor = if start + page.len() < prompts.len() {
            page.last().map(|p| p.name.clone())
        } else {
            None
        };
        Ok(ListPromptsResponse {
            prompts: page,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scans_unique_variables_in_order() {
        let templates = vec![
            PromptTemplate::system("You are {{role}}."),
            PromptTemplate::user("Hello {{name}}, welcome to {{role}} mode."),
        ];
        assert_eq!(scan_variables(&templates), vec!["role", "name"]);
    }

    #[tokio::test]
    async fn substitutes_required_arguments() {
        let registry = PromptRegistry::new();
        registry
            .register(RegisteredPrompt::new(
                "greet",
                vec![PromptTemplate::user("Hello {{name}}!")],
            ))
            .await
            .unwrap();

        let response = registry
            .get_prompt(GetPromptRequest {
                name: "greet".to_string(),
                arguments: Some(json!({"name": "Ada"})),
            })
            .await
            .unwrap();

        match &response.messages[0].content {
            PromptContent::Text { text } => assert_eq!(text, "Hello Ada!"),
            _ => panic!("expected text content"),
        }
    }

    #[tokio::test]
    async fn missing_required_argument_is_invalid_params() {
        let registry = PromptRegistry::new();
        registry
            .register(RegisteredPrompt::new(
                "greet",
                vec![PromptTemplate::user("Hello {{name}}!")],
            ))
            .await
            .unwrap();

        let err = registry
            .get_prompt(GetPromptRequest {
                name: "greet".to_string(),
                arguments: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MCPError::Protocol(ultrafast_mcp_core::error::ProtocolError::InvalidParams(_))
        ));
    }

    #[tokio::test]
    async fn unknown_prompt_is_not_found() {
        let registry = PromptRegistry::new();
        let err = registry
            .get_prompt(GetPromptRequest {
                name: "absent".to_string(),
                arguments: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MCPError::Protocol(ultrafast_mcp_core::error::ProtocolError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_name_errors_by_default() {
        let registry = PromptRegistry::new();
        let make = || RegisteredPrompt::new("dup", vec![PromptTemplate::user("hi")]);
        registry.register(make()).await.unwrap();
        assert!(registry.register(make()).await.is_err());
    }

    #[tokio::test]
    async fn pagination_sets_next_cursor_only_when_more_remain() {
        let registry = PromptRegistry::new();
        for i in 0..3 {
            registry
                .register(RegisteredPrompt::new(
                    format!("p{i}"),
                    vec![PromptTemplate::user("hi")],
                ))
                .await
                .unwrap();
        }
        let response = registry
            .list_prompts(ListPromptsRequest { cursor: None })
            .await
            .unwrap();
        assert_eq!(response.prompts.len(), 3);
        assert!(response.next_cursor.is_none());
    }

    #[tokio::test]
    async fn non_string_argument_is_json_stringified() {
        let registry = PromptRegistry::new();
        registry
            .register(RegisteredPrompt::new(
                "count",
                vec![PromptTemplate::user("You have {{n}} items.")],
            ))
            .await
            .unwrap();
        let response = registry
            .get_prompt(GetPromptRequest {
                name: "count".to_string(),
                arguments: Some(json!({"n": 3})),
            })
            .await
            .unwrap();
        match &response.messages[0].content {
            PromptContent::Text { text } => assert_eq!(text, "You have 3 items."),
            _ => panic!("expected text content"),
        }
    }
}
