//! Completion types for MCP 2025-06-18 protocol

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What's being completed: a prompt argument or a resource template
/// variable, per the wire's `ref.type` discriminator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReference {
    /// `"ref/prompt"` or `"ref/resource"`
    #[serde(rename = "type")]
    pub ref_type: String,

    /// The prompt name for a `ref/prompt`, the resource URI (or template)
    /// for a `ref/resource`. The wire spells the latter `uri`; both forms
    /// deserialize here.
    #[serde(alias = "uri")]
    pub name: String,
}

/// The argument whose value is being completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionArgument {
    pub name: String,
    pub value: String,
}

/// Previously-resolved argument values, for completions that depend on
/// other arguments already filled in.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompletionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<HashMap<String, String>>,
}

/// Completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteRequest {
    #[serde(rename = "ref")]
    pub reference: CompletionReference,
    pub argument: CompletionArgument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<CompletionContext>,
}

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub completion: CompletionResult,
}

/// Completion result set, shaped to match the wire exactly: up to 100
/// string values, an optional total, and `hasMore` when the result was
/// truncated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResult {
    pub values: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(rename = "hasMore", skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

impl CompletionResult {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values,
            total: None,
            has_more: None,
        }
    }

    pub fn with_metadata(values: Vec<String>, total: u32, has_more: bool) -> Self {
        Self {
            values,
            total: Some(total),
            has_more: Some(has_more),
        }
    }
}
