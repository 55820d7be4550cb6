//! Shared test helpers for HTTP tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::routing::get;
use serde_json::{Value, json};
use tower::ServiceExt;

use mcphost_api::hooks::{
    MIDDLEWARES_HOOK, PluginNext, ROUTERS_HOOK, RouterCallback, middleware,
};
use mcphost_api::{Host, build_app};
use mcphost_core::config::AppConfig;
use mcphost_core::error::AppError;
use mcphost_plugin::prelude::*;
use mcphost_plugin::{PluginDef, PluginLoader};
use mcphost_tools::{TOOLS_HOOK, Tool, ToolCallback};

// ── Test plugins ─────────────────────────────────────────────────

/// Tool named after a plugin's tag.
#[derive(Debug)]
struct TagTool(String);

#[async_trait]
impl Tool for TagTool {
    fn name(&self) -> &str {
        &self.0
    }

    fn description(&self) -> &str {
        "Returns the plugin tag"
    }

    async fn call(&self, _args: Value) -> Result<Value, AppError> {
        Ok(json!({ "tag": self.0 }))
    }
}

/// Adds its tag to the `x-trail` request header on the way in and to the
/// `x-trace` response header on the way out.
struct Tagger {
    tag: String,
}

impl PluginContext for Tagger {
    fn callbacks(&self) -> Callbacks {
        let tag = self.tag.clone();
        let trail = middleware(move |mut request: Request, next: PluginNext| {
            let tag = tag.clone();
            async move {
                let value = HeaderValue::from_str(&tag).expect("header value");
                request.headers_mut().append("x-trail", value.clone());
                let mut response = next.run(request).await;
                response.headers_mut().append("x-trace", value);
                response
            }
        });

        let tool_name = format!("{}_tool", self.tag);
        let tools: ToolCallback = Arc::new(move || -> Result<Vec<Arc<dyn Tool>>, AppError> {
            Ok(vec![Arc::new(TagTool(tool_name.clone())) as Arc<dyn Tool>])
        });

        Callbacks::new()
            .with("trail", MIDDLEWARES_HOOK, Callback::new(trail))
            .with("tools", TOOLS_HOOK, Callback::new(tools))
    }
}

fn make_tagger(
    config: &serde_json::Value,
    _host: &HostInfo,
) -> Result<Box<dyn PluginContext>, String> {
    let tag = config["tag"].as_str().ok_or("missing tag")?.to_string();
    Ok(Box::new(Tagger { tag }))
}

/// Contributes a tool provider that always fails.
struct Broken;

impl PluginContext for Broken {
    fn callbacks(&self) -> Callbacks {
        let tools: ToolCallback = Arc::new(|| -> Result<Vec<Arc<dyn Tool>>, AppError> {
            Err(AppError::tool("backend unreachable"))
        });
        Callbacks::new().with("tools", TOOLS_HOOK, Callback::new(tools))
    }
}

fn make_broken(
    _config: &serde_json::Value,
    _host: &HostInfo,
) -> Result<Box<dyn PluginContext>, String> {
    Ok(Box::new(Broken))
}

fn trail_routes() -> Callbacks {
    let router: RouterCallback = Arc::new(|| -> Router {
        Router::new().route(
            "/trail",
            get(|headers: HeaderMap| async move {
                headers
                    .get_all("x-trail")
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .collect::<Vec<_>>()
                    .join(",")
            }),
        )
    });
    Callbacks::new().with("routes", ROUTERS_HOOK, Callback::new(router))
}

static TESTKIT: PluginModule = PluginModule {
    name: "testkit",
    ctx_managers: &[
        ("Tagger", make_tagger as ContextFactory),
        ("Broken", make_broken as ContextFactory),
    ],
    static_callbacks: &[("trail_routes", trail_routes as StaticCallbacksFn)],
};

// ── Test app ─────────────────────────────────────────────────────

/// Definition of a `testkit::Tagger`, optionally with the trail routes.
pub fn tagger(name: &str, tag: &str, routes: bool) -> PluginDef {
    PluginDef {
        name: name.to_string(),
        module: "testkit".to_string(),
        config: json!({ "tag": tag }),
        ctx_manager: "testkit::Tagger".to_string(),
        static_callbacks: routes.then(|| "testkit::trail_routes".to_string()),
    }
}

/// A host with entered `testkit` plugins.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The host, kept to release plugins
    pub host: Host,
}

impl TestApp {
    /// Create a test app with entered plugins
    pub async fn new() -> Self {
        Self::with_plugins(vec![
            tagger("tagger_a", "a", true),
            tagger("tagger_b", "b", false),
            PluginDef {
                name: "broken".to_string(),
                module: "testkit".to_string(),
                config: json!({}),
                ctx_manager: "testkit::Broken".to_string(),
                static_callbacks: None,
            },
        ])
        .await
    }

    /// Create a test app from the given `testkit` plugin definitions
    pub async fn with_plugins(plugins: Vec<PluginDef>) -> Self {
        let loader = PluginLoader::new().with_module(TESTKIT);
        let mut host = Host::new(loader, HostInfo::new("http://test.local")).expect("host");
        host.tools.setup_local_tools();
        host.register_plugins(plugins).expect("register plugins");

        host.manager.static_pass().await.expect("static pass");
        host.manager.enter().await.expect("enter");

        let router = build_app(host.app_state(Arc::new(AppConfig::default())));
        Self { router, host }
    }

    /// Release plugins
    pub async fn shutdown(mut self) {
        self.host.manager.exit().await.expect("exit");
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = axum::http::Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub text: String,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// All values of a header, in order
    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect()
    }
}
