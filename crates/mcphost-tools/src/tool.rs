//! Tool trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mcphost_core::error::AppError;

/// A callable exposed to the agent layer.
#[async_trait]
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// Unique tool name
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Invoke the tool with JSON arguments
    async fn call(&self, args: Value) -> Result<Value, AppError>;
}

/// Serializable summary of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
}

impl ToolInfo {
    /// Summarize a tool
    pub fn of(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
        }
    }
}
