//! Request tag plugin context.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use tokio::sync::watch;
use tracing::info;

use mcphost_api::hooks::MIDDLEWARES_HOOK;
use mcphost_plugin::prelude::*;
use mcphost_tools::TOOLS_HOOK;

use crate::config::RequestTagConfig;
use crate::hooks::{TagStats, header_middleware, stamp_middleware, tool_provider};

/// Live request tag plugin.
///
/// While entered, optionally runs a reporter task that logs how many
/// requests were tagged.
#[derive(Debug)]
pub struct RequestTagPlugin {
    /// Parsed configuration
    config: RequestTagConfig,
    /// Response header name
    header: HeaderName,
    /// Host base URL
    base_url: String,
    /// Request counters
    stats: Arc<TagStats>,
    /// Reporter task cancellation
    reporter_cancel: Option<watch::Sender<bool>>,
}

impl RequestTagPlugin {
    /// Create the plugin from its definition's configuration.
    pub fn new(config: &serde_json::Value, host: &HostInfo) -> Result<Self, String> {
        let config = RequestTagConfig::from_value(config)?;
        let header = config.header_name()?;

        Ok(Self {
            config,
            header,
            base_url: host.base_url.clone(),
            stats: Arc::new(TagStats::default()),
            reporter_cancel: None,
        })
    }

    /// Constructor registered in [`MODULE`](crate::MODULE).
    pub fn factory(
        config: &serde_json::Value,
        host: &HostInfo,
    ) -> Result<Box<dyn PluginContext>, String> {
        Ok(Box::new(Self::new(config, host)?))
    }

    /// Request counters
    pub fn stats(&self) -> &Arc<TagStats> {
        &self.stats
    }

    /// Whether the plugin is entered
    pub fn is_live(&self) -> bool {
        self.reporter_cancel.is_some()
    }
}

#[async_trait]
impl PluginContext for RequestTagPlugin {
    async fn enter(&mut self) -> Result<(), String> {
        let (tx, mut rx) = watch::channel(false);

        if self.config.report_interval_seconds > 0 {
            let interval = Duration::from_secs(self.config.report_interval_seconds);
            let stats = Arc::clone(&self.stats);
            let tag = self.config.tag.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await;
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            info!(tag = %tag, tagged = stats.tagged(), "Request tag statistics");
                        }
                        _ = rx.changed() => break,
                    }
                }
            });
        }

        self.reporter_cancel = Some(tx);
        info!(tag = %self.config.tag, host = %self.base_url, "Request tag plugin entered");
        Ok(())
    }

    async fn exit(&mut self) -> Result<(), String> {
        if let Some(tx) = self.reporter_cancel.take() {
            let _ = tx.send(true);
        }
        info!(
            tag = %self.config.tag,
            tagged = self.stats.tagged(),
            "Request tag plugin released"
        );
        Ok(())
    }

    fn callbacks(&self) -> Callbacks {
        Callbacks::new()
            .with(
                "stamp",
                MIDDLEWARES_HOOK,
                Callback::new(stamp_middleware(
                    self.config.tag.clone(),
                    Arc::clone(&self.stats),
                )),
            )
            .with(
                "header",
                MIDDLEWARES_HOOK,
                Callback::new(header_middleware(self.header.clone())),
            )
            .with(
                "tools",
                TOOLS_HOOK,
                Callback::new(tool_provider(
                    self.config.tag.clone(),
                    self.base_url.clone(),
                    Arc::clone(&self.stats),
                )),
            )
    }
}
