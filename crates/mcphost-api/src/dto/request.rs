//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Query for tool listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolQuery {
    /// Include the host's local tools.
    #[serde(default)]
    pub include_local: bool,
}

/// Tool invocation body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolRequest {
    /// Tool arguments.
    #[serde(default)]
    pub arguments: serde_json::Value,
}
