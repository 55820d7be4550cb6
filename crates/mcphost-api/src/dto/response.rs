//! Response DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mcphost_plugin::{PluginStatus, RegistryState};
use mcphost_tools::ToolInfo;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
    /// Plugin registry state.
    pub plugins: RegistryState,
}

/// Plugin diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsResponse {
    /// Registry state when the server started.
    pub state: RegistryState,
    /// Per-plugin status, in registration order.
    pub plugins: Vec<PluginStatus>,
    /// Hook name → plugins wired into it.
    pub hooks: BTreeMap<String, Vec<String>>,
    /// Plugins with a mounted router.
    pub routers: Vec<String>,
    /// Plugins in middleware chain order.
    pub middlewares: Vec<String>,
}

/// Tool listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsResponse {
    /// Tools in aggregation order.
    pub tools: Vec<ToolInfo>,
    /// Number of tools.
    pub total: usize,
}

/// Tool invocation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResponse {
    /// Tool name.
    pub tool: String,
    /// Tool output.
    pub result: serde_json::Value,
}
