//! Tool dispatch with call-shape fallback

use serde_json::Value;
use tracing::{debug, warn};

use super::ToolRegistry;
use crate::agent::ToolInput;

/// Execute a parsed tool request and always come back with text.
///
/// Structured input attempts the keyword call first; if the tool rejects
/// the argument shape, the same payload is retried as a string call with
/// its JSON rendering. The first error is the one reported, since it
/// describes the shape the model actually produced.
pub async fn invoke(registry: &ToolRegistry, name: &str, input: &ToolInput) -> String {
    let Some(tool) = registry.get(name) else {
        warn!(tool = name, "tool not found");
        return format!("Tool {} not found", name);
    };

    match input {
        ToolInput::Structured(args) => {
            debug!(tool = name, "keyword call");
            match tool.call_args(args).await {
                Ok(output) => output,
                Err(first_err) => {
                    debug!(tool = name, error = %first_err, "keyword call rejected, retrying as string call");
                    let rendered = Value::Object(args.clone()).to_string();
                    match tool.call_text(&rendered).await {
                        Ok(output) => output,
                        Err(_) => format!("Error executing tool: {}", first_err),
                    }
                }
            }
        }
        ToolInput::Text(text) => {
            debug!(tool = name, "string call");
            match tool.call_text(text).await {
                Ok(output) => output,
                Err(e) => format!("Error executing tool: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::error::ToolError;
    use crate::tools::{ArgMap, Tool, ToolParam};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes"
        }
        fn parameters(&self) -> Vec<ToolParam> {
            vec![ToolParam::required("text", "string")]
        }
        async fn call_args(&self, args: &ArgMap) -> Result<String, ToolError> {
            let text = args
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidParams("missing field `text`".into()))?;
            Ok(format!("kw:{}", text))
        }
        async fn call_text(&self, input: &str) -> Result<String, ToolError> {
            Ok(format!("str:{}", input))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "always rejects"
        }
        fn parameters(&self) -> Vec<ToolParam> {
            vec![]
        }
        async fn call_args(&self, _args: &ArgMap) -> Result<String, ToolError> {
            Err(ToolError::InvalidParams("bad shape".into()))
        }
        async fn call_text(&self, _input: &str) -> Result<String, ToolError> {
            Err(ToolError::ExecutionFailed("string call failed too".into()))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry.register(Arc::new(BrokenTool));
        registry
    }

    #[tokio::test]
    async fn test_unknown_tool_text() {
        let result = invoke(&registry(), "nope", &ToolInput::Text("x".into())).await;
        assert_eq!(result, "Tool nope not found");
    }

    #[tokio::test]
    async fn test_structured_dispatches_keyword_call() {
        let mut args = ArgMap::new();
        args.insert("text".into(), json!("hello"));
        let result = invoke(&registry(), "echo", &ToolInput::Structured(args)).await;
        assert_eq!(result, "kw:hello");
    }

    #[tokio::test]
    async fn test_bad_shape_falls_back_to_string_call() {
        let mut args = ArgMap::new();
        args.insert("wrong".into(), json!(1));
        let result = invoke(&registry(), "echo", &ToolInput::Structured(args)).await;
        assert_eq!(result, "str:{\"wrong\":1}");
    }

    #[tokio::test]
    async fn test_both_shapes_failing_reports_first_error() {
        let result = invoke(&registry(), "broken", &ToolInput::Structured(ArgMap::new())).await;
        assert_eq!(result, "Error executing tool: Invalid parameters: bad shape");
    }
}
