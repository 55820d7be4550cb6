//! End-to-end tests: the bundled request tag plugin running in the host.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use mcphost_api::hooks::{MIDDLEWARES_HOOK, ROUTERS_HOOK};
use mcphost_api::{Host, build_app};
use mcphost_core::AppConfig;
use mcphost_plugin::{HostInfo, PluginDef, PluginLoader, RegistryState};
use mcphost_tools::TOOLS_HOOK;

fn request_tag(name: &str, config: Value) -> PluginDef {
    PluginDef {
        name: name.to_string(),
        module: "plugin_request_tag".to_string(),
        config,
        ctx_manager: "plugin_request_tag::RequestTagPlugin".to_string(),
        static_callbacks: Some("plugin_request_tag::static_callbacks".to_string()),
    }
}

async fn start(plugins: Vec<PluginDef>) -> (Host, Router) {
    let loader = PluginLoader::new().with_module(plugin_request_tag::MODULE);
    let mut host = Host::new(loader, HostInfo::new("http://mcphost.test")).expect("host");
    host.tools.setup_local_tools();
    host.register_plugins(plugins).expect("register");
    host.manager.static_pass().await.expect("static pass");
    host.manager.enter().await.expect("enter");

    let app = build_app(host.app_state(Arc::new(AppConfig::default())));
    (host, app)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Option<String>, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let tag = response
        .headers()
        .get("x-plugin-tag")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, tag, body)
}

#[tokio::test]
async fn test_plugin_wires_every_hook() {
    let (mut host, _app) = start(vec![request_tag("request_tag", json!({"tag": "blue"}))]).await;

    assert_eq!(host.manager.hooked_plugins(ROUTERS_HOOK), ["request_tag"]);
    assert_eq!(
        host.manager.hooked_plugins(MIDDLEWARES_HOOK),
        ["request_tag", "request_tag"]
    );
    assert_eq!(host.manager.hooked_plugins(TOOLS_HOOK), ["request_tag"]);
    assert_eq!(host.middlewares.len(), 2);
    assert_eq!(host.manager.live_count(), 1);

    host.manager.exit().await.expect("exit");
    assert_eq!(host.manager.state(), RegistryState::Closed);
    assert_eq!(host.manager.live_count(), 0);
}

#[tokio::test]
async fn test_router_sees_tag_and_response_carries_header() {
    let (mut host, app) = start(vec![request_tag("request_tag", json!({"tag": "blue"}))]).await;

    let (status, header, body) = send(&app, "GET", "/plugins/request_tag/tag", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header.as_deref(), Some("blue"));
    assert_eq!(body["tag"], "blue");

    let (status, header, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header.as_deref(), Some("blue"));
    assert_eq!(body["data"]["plugins"], "entered");

    host.manager.exit().await.expect("exit");
}

#[tokio::test]
async fn test_tag_tool_counts_requests() {
    let (mut host, app) = start(vec![request_tag("request_tag", json!({"tag": "green"}))]).await;

    send(&app, "GET", "/plugins/request_tag", None).await;
    let (status, _, body) = send(
        &app,
        "POST",
        "/api/tools/request_tag/call",
        Some(json!({"arguments": {}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["data"]["result"];
    assert_eq!(result["tag"], "green");
    assert_eq!(result["tagged_requests"], 2);
    assert_eq!(result["host"], "http://mcphost.test");

    host.manager.exit().await.expect("exit");
}

#[tokio::test]
async fn test_two_instances_stack_middlewares() {
    let (mut host, app) = start(vec![
        request_tag("outer", json!({"tag": "outer", "header": "x-outer"})),
        request_tag("inner", json!({"tag": "inner", "header": "x-inner"})),
    ])
    .await;

    // The inner stamp runs last, so the handler sees its tag.
    let (_, _, body) = send(&app, "GET", "/plugins/outer/tag", None).await;
    assert_eq!(body["tag"], "inner");

    let (_, _, body) = send(&app, "GET", "/api/plugins", None).await;
    let routers: Vec<&str> = body["data"]["routers"]
        .as_array()
        .expect("routers")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(routers, vec!["outer", "inner"]);

    let (_, _, body) = send(&app, "GET", "/api/tools", None).await;
    assert_eq!(body["data"]["total"], 2);

    host.manager.exit().await.expect("exit");
}

#[tokio::test]
async fn test_invalid_config_fails_startup() {
    let loader = PluginLoader::new().with_module(plugin_request_tag::MODULE);
    let mut host = Host::new(loader, HostInfo::new("http://mcphost.test")).expect("host");
    host.register_plugins([request_tag("bad", json!({"tag": ""}))])
        .expect("register");

    host.manager.static_pass().await.expect("static pass");
    let err = host.manager.enter().await.expect_err("invalid config");
    assert!(err.to_string().contains("bad"));
}
