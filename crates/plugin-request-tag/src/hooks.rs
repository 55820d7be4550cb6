//! Callbacks the plugin contributes to host hooks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use serde_json::{Value, json};
use tracing::debug;

use mcphost_api::hooks::{MiddlewareCallback, PluginNext, middleware};
use mcphost_core::error::AppError;
use mcphost_tools::{Tool, ToolCallback};

/// Tag attached to request extensions by [`stamp_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTag(pub String);

/// Counters shared by a live plugin's callbacks.
#[derive(Debug, Default)]
pub struct TagStats {
    tagged: AtomicU64,
}

impl TagStats {
    /// Number of requests stamped so far
    pub fn tagged(&self) -> u64 {
        self.tagged.load(Ordering::Relaxed)
    }

    fn record(&self) {
        self.tagged.fetch_add(1, Ordering::Relaxed);
    }
}

/// Stamps the tag into request extensions.
pub fn stamp_middleware(tag: String, stats: Arc<TagStats>) -> MiddlewareCallback {
    middleware(move |mut request: Request, next: PluginNext| {
        request.extensions_mut().insert(RequestTag(tag.clone()));
        stats.record();
        next.run(request)
    })
}

/// Copies the request's tag to a response header.
pub fn header_middleware(header: HeaderName) -> MiddlewareCallback {
    middleware(move |request: Request, next: PluginNext| {
        let header = header.clone();
        let tag = request.extensions().get::<RequestTag>().cloned();
        async move {
            let mut response = next.run(request).await;
            if let Some(value) = tag.and_then(|t| HeaderValue::from_str(&t.0).ok()) {
                response.headers_mut().insert(header, value);
            }
            response
        }
    })
}

/// Reports the plugin's tag and how many requests carried it.
#[derive(Debug)]
pub struct RequestTagTool {
    tag: String,
    base_url: String,
    stats: Arc<TagStats>,
}

#[async_trait]
impl Tool for RequestTagTool {
    fn name(&self) -> &str {
        "request_tag"
    }

    fn description(&self) -> &str {
        "Report the tag stamped on host requests"
    }

    async fn call(&self, _args: Value) -> Result<Value, AppError> {
        debug!(tag = %self.tag, "request_tag tool called");
        Ok(json!({
            "tag": self.tag,
            "tagged_requests": self.stats.tagged(),
            "host": self.base_url,
        }))
    }
}

/// Tool provider exposing [`RequestTagTool`].
pub fn tool_provider(tag: String, base_url: String, stats: Arc<TagStats>) -> ToolCallback {
    Arc::new(move || -> Result<Vec<Arc<dyn Tool>>, AppError> {
        Ok(vec![Arc::new(RequestTagTool {
            tag: tag.clone(),
            base_url: base_url.clone(),
            stats: Arc::clone(&stats),
        }) as Arc<dyn Tool>])
    })
}
