//! Comprehensive MCP Completion Tests
//!
//! This test suite validates that the ultrafast-mcp implementation correctly handles
//! completion requests as specified in MCP 2025-06-18.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use ultrafast_mcp::{
        UltraFastClient, UltraFastServer, ClientInfo, ClientCapabilities, ServerInfo, ServerCapabilities,
        CompletionHandler, MCPResult, CompletionCapability,
    };
    use ultrafast_mcp_core::types::completion::{
        CompleteRequest, CompleteResponse, CompletionResult, CompletionReference,
        CompletionArgument, CompletionContext,
    };

    // Mock completion handler for testing
    struct TestCompletionHandler;

    #[async_trait]
    impl CompletionHandler for TestCompletionHandler {
        async fn complete(&self, request: CompleteRequest) -> MCPResult<CompleteResponse> {
            let ref_type = request.reference.ref_type.as_str();
            let argument_name = &request.argument.name;
            let argument_value = &request.argument.value;

            let values = match ref_type {
                "ref/prompt" => {
                    let prompt_name = &request.reference.name;
                    match (prompt_name.as_str(), argument_name.as_str()) {
                        ("code_review", "language") => {
                            let mut suggestions = vec!["python", "pytorch", "pyside", "rust", "javascript", "typescript"];
                            suggestions.retain(|s| s.starts_with(argument_value.as_str()));
                            suggestions
                        },
                        ("code_review", "framework") => {
                            let context_language = request.context
                                .as_ref()
                                .and_then(|c| c.arguments.as_ref())
                                .and_then(|args| args.get("language"))
                                .cloned();

                            let mut suggestions = match context_language.as_deref() {
                                Some("python") => vec!["flask", "django", "fastapi", "pytorch", "tensorflow"],
                                Some("javascript") => vec!["react", "vue", "angular", "express", "next"],
                                Some("rust") => vec!["actix", "rocket", "axum", "tokio", "serde"],
                                _ => vec!["flask", "django", "react", "vue", "actix"],
                            };
                            suggestions.retain(|s| s.starts_with(argument_value.as_str()));
                            suggestions
                        },
                        ("greeting", "style") => {
                            let mut suggestions = vec!["casual", "formal", "technical", "friendly"];
                            suggestions.retain(|s| s.starts_with(argument_value.as_str()));
                            suggestions
                        },
                        ("greeting", "temperature") => {
                            let mut suggestions = vec!["0", "0.5", "0.7", "1.0"];
                            suggestions.retain(|s| s.starts_with(argument_value.as_str()));
                            suggestions
                        },
                        _ => vec![],
                    }
                }
                "ref/resource" => {
                    let mut suggestions = vec!["1", "2", "3", "4", "5"];
                    suggestions.retain(|s| s.starts_with(argument_value.as_str()));
                    suggestions
                }
                _ => vec![],
            };

            let values: Vec<String> = values.into_iter().map(String::from).collect();
            let total = values.len() as u32;
            Ok(CompleteResponse {
                completion: CompletionResult::with_metadata(values, total, false),
            })
        }
    }

    fn create_test_server() -> UltraFastServer {
        let server_info = ServerInfo {
            name: "completion-test-server".to_string(),
            version: "1.0.0".to_string(),
            description: Some("Test server for completion tests".to_string()),
            authors: None,
            homepage: None,
            license: None,
            repository: None,
        };

        let capabilities = ServerCapabilities {
            completion: Some(CompletionCapability {}),
            ..Default::default()
        };

        UltraFastServer::new(server_info, capabilities)
            .with_completion_handler(Arc::new(TestCompletionHandler))
    }

    fn create_test_client() -> UltraFastClient {
        let client_info = ClientInfo {
            name: "completion-test-client".to_string(),
            version: "1.0.0".to_string(),
            authors: None,
            description: Some("Test client for completion tests".to_string()),
            homepage: None,
            repository: None,
            license: None,
        };

        let capabilities = ClientCapabilities::default();
        UltraFastClient::new(client_info, capabilities)
    }

    #[tokio::test]
    async fn test_completion_request_structure() {
        let request = CompleteRequest {
            reference: CompletionReference {
                ref_type: "ref/prompt".to_string(),
                name: "code_review".to_string(),
            },
            argument: CompletionArgument {
                name: "language".to_string(),
                value: "py".to_string(),
            },
            context: Some(CompletionContext {
                arguments: Some({
                    let mut map = HashMap::new();
                    map.insert("language".to_string(), "python".to_string());
                    map
                }),
            }),
        };

        assert_eq!(request.reference.ref_type, "ref/prompt");
        assert_eq!(request.reference.name, "code_review");
        assert_eq!(request.argument.name, "language");
        assert_eq!(request.argument.value, "py");
        assert!(request.context.is_some());

        let context = request.context.unwrap();
        assert!(context.arguments.is_some());
        let args = context.arguments.unwrap();
        assert_eq!(args.get("language"), Some(&"python".to_string()));
    }

    #[tokio::test]
    async fn test_completion_handler_basic() {
        let handler = TestCompletionHandler;

        let request = CompleteRequest {
            reference: CompletionReference {
                ref_type: "ref/prompt".to_string(),
                name: "code_review".to_string(),
            },
            argument: CompletionArgument {
                name: "language".to_string(),
                value: "py".to_string(),
            },
            context: None,
        };

        let response = handler.complete(request).await.unwrap();
        assert!(!response.completion.values.is_empty());

        let values = &response.completion.values;
        assert!(values.iter().any(|v| v == "python"));
        assert!(values.iter().any(|v| v == "pytorch"));
    }

    #[tokio::test]
    async fn test_completion_with_context() {
        let handler = TestCompletionHandler;

        let request = CompleteRequest {
            reference: CompletionReference {
                ref_type: "ref/prompt".to_string(),
                name: "code_review".to_string(),
            },
            argument: CompletionArgument {
                name: "framework".to_string(),
                value: "fla".to_string(),
            },
            context: Some(CompletionContext {
                arguments: Some({
                    let mut map = HashMap::new();
                    map.insert("language".to_string(), "python".to_string());
                    map
                }),
            }),
        };

        let response = handler.complete(request).await.unwrap();
        assert!(!response.completion.values.is_empty());
        assert!(response.completion.values.iter().any(|v| v == "flask"));
    }

    #[tokio::test]
    async fn test_completion_filtering() {
        let handler = TestCompletionHandler;

        let request = CompleteRequest {
            reference: CompletionReference {
                ref_type: "ref/prompt".to_string(),
                name: "code_review".to_string(),
            },
            argument: CompletionArgument {
                name: "language".to_string(),
                value: "pyt".to_string(),
            },
            context: None,
        };

        let response = handler.complete(request).await.unwrap();
        assert_eq!(response.completion.values.len(), 2);
        assert!(response.completion.values.iter().any(|v| v == "python"));
        assert!(response.completion.values.iter().any(|v| v == "pytorch"));
    }

    #[tokio::test]
    async fn test_resource_completion() {
        let handler = TestCompletionHandler;

        let request = CompleteRequest {
            reference: CompletionReference {
                ref_type: "ref/resource".to_string(),
                name: "file:///path/to/resource".to_string(),
            },
            argument: CompletionArgument {
                name: "id".to_string(),
                value: "1".to_string(),
            },
            context: None,
        };

        let response = handler.complete(request).await.unwrap();
        assert_eq!(response.completion.values, vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn test_completion_error_handling() {
        let handler = TestCompletionHandler;

        let request = CompleteRequest {
            reference: CompletionReference {
                ref_type: "ref/unknown".to_string(),
                name: "test".to_string(),
            },
            argument: CompletionArgument {
                name: "test".to_string(),
                value: "test".to_string(),
            },
            context: None,
        };

        let response = handler.complete(request).await.unwrap();
        assert!(response.completion.values.is_empty());
    }

    #[tokio::test]
    async fn test_completion_serialization() {
        let original_request = CompleteRequest {
            reference: CompletionReference {
                ref_type: "ref/prompt".to_string(),
                name: "code_review".to_string(),
            },
            argument: CompletionArgument {
                name: "language".to_string(),
                value: "py".to_string(),
            },
            context: None,
        };

        let serialized = serde_json::to_string(&original_request).unwrap();
        let deserialized: CompleteRequest = serde_json::from_str(&serialized).unwrap();

        assert_eq!(original_request.reference.ref_type, deserialized.reference.ref_type);
        assert_eq!(original_request.reference.name, deserialized.reference.name);
        assert_eq!(original_request.argument.name, deserialized.argument.name);
        assert_eq!(original_request.argument.value, deserialized.argument.value);
    }

    #[tokio::test]
    async fn test_completion_server_integration() {
        let server = create_test_server();
        assert_eq!(server.info().name, "completion-test-server");
    }

    #[tokio::test]
    async fn test_completion_client_integration() {
        let client = create_test_client();
        assert_eq!(client.info().name, "completion-test-client");
    }

    #[tokio::test]
    async fn test_completion_protocol_compliance() {
        let reference = CompletionReference {
            ref_type: "ref/prompt".to_string(),
            name: "code_review".to_string(),
        };
        assert_eq!(reference.ref_type, "ref/prompt");
        assert_eq!(reference.name, "code_review");

        let argument = CompletionArgument {
            name: "language".to_string(),
            value: "py".to_string(),
        };
        assert_eq!(argument.name, "language");
        assert_eq!(argument.value, "py");

        let context = CompletionContext {
            arguments: Some({
                let mut map = HashMap::new();
                map.insert("language".to_string(), "python".to_string());
                map
            }),
        };
        assert!(context.arguments.is_some());
        let args = context.arguments.as_ref().unwrap();
        assert_eq!(args.get("language"), Some(&"python".to_string()));

        let request = CompleteRequest {
            reference,
            argument,
            context: Some(context),
        };
        assert_eq!(request.reference.ref_type, "ref/prompt");
        assert_eq!(request.argument.name, "language");
    }
}
