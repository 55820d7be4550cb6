//! Local tools that ship with the host.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use mcphost_core::error::AppError;

use crate::tool::Tool;

/// Returns its `text` argument unchanged.
#[derive(Debug, Default)]
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo back the given text"
    }

    async fn call(&self, args: Value) -> Result<Value, AppError> {
        let text = args
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::validation("'text' must be a string"))?;
        Ok(json!({ "text": text }))
    }
}

/// Build the local tool set.
pub fn local_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(EchoTool)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_returns_text() {
        let result = EchoTool.call(json!({"text": "hi"})).await.expect("echo");
        assert_eq!(result, json!({"text": "hi"}));
    }

    #[tokio::test]
    async fn test_echo_requires_text() {
        let err = EchoTool.call(json!({"text": 3})).await.expect_err("invalid");
        assert_eq!(err.kind, mcphost_core::error::ErrorKind::Validation);
    }
}
