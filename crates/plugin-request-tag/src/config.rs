//! Configuration for the request tag plugin.

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Plugin configuration, read from the plugin definition's `config` value.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestTagConfig {
    /// Tag stamped on every request.
    #[validate(length(min = 1, max = 64))]
    pub tag: String,

    /// Response header carrying the tag.
    #[validate(length(min = 1, max = 128))]
    pub header: String,

    /// Interval in seconds between tag statistics log lines. `0` disables
    /// the reporter.
    #[validate(range(max = 86400))]
    pub report_interval_seconds: u64,
}

impl Default for RequestTagConfig {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            header: default_header(),
            report_interval_seconds: 0,
        }
    }
}

impl RequestTagConfig {
    /// Parse and validate the plugin's configuration value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, String> {
        let config: Self = serde_json::from_value(value.clone())
            .map_err(|e| format!("invalid request tag config: {e}"))?;
        config
            .validate()
            .map_err(|e| format!("invalid request tag config: {e}"))?;
        axum::http::HeaderValue::from_str(&config.tag)
            .map_err(|e| format!("invalid tag '{}': {e}", config.tag))?;
        Ok(config)
    }

    /// Parse the configured response header name.
    pub fn header_name(&self) -> Result<HeaderName, String> {
        HeaderName::from_bytes(self.header.as_bytes())
            .map_err(|e| format!("invalid header name '{}': {e}", self.header))
    }
}

fn default_tag() -> String {
    "mcphost".to_string()
}

fn default_header() -> String {
    "x-plugin-tag".to_string()
}
