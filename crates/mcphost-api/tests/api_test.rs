//! HTTP tests for the host API with plugins entered.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["plugins"], "entered");
    app.shutdown().await;
}

#[tokio::test]
async fn test_plugin_middlewares_wrap_in_registration_order() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/plugins/tagger_a/trail", None).await;

    assert_eq!(response.status, StatusCode::OK);
    // On the way in a runs before b; on the way out b finishes first.
    assert_eq!(response.text, "a,b");
    assert_eq!(response.header_values("x-trace"), vec!["b", "a"]);
    app.shutdown().await;
}

#[tokio::test]
async fn test_plugin_middlewares_wrap_host_routes() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.header_values("x-trace"), vec!["b", "a"]);
    app.shutdown().await;
}

#[tokio::test]
async fn test_router_only_mounted_for_static_callbacks() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/plugins/tagger_b/trail", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    app.shutdown().await;
}

#[tokio::test]
async fn test_list_tools_skips_failing_provider() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/tools", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response.body["data"]["tools"]
        .as_array()
        .expect("tools array")
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, vec!["a_tool", "b_tool"]);

    let response = app.request("GET", "/api/tools?include_local=true", None).await;
    assert_eq!(response.body["data"]["total"], 3);
    assert_eq!(response.body["data"]["tools"][2]["name"], "echo");
    app.shutdown().await;
}

#[tokio::test]
async fn test_call_tool() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/tools/echo/call",
            Some(json!({"arguments": {"text": "ping"}})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["result"]["text"], "ping");

    let response = app
        .request("POST", "/api/tools/b_tool/call", Some(json!({})))
        .await;
    assert_eq!(response.body["data"]["result"]["tag"], "b_tool");
    app.shutdown().await;
}

#[tokio::test]
async fn test_call_tool_errors() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("POST", "/api/tools/missing/call", Some(json!({})))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");

    let response = app
        .request(
            "POST",
            "/api/tools/echo/call",
            Some(json!({"arguments": {"text": 1}})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    app.shutdown().await;
}

#[tokio::test]
async fn test_plugin_diagnostics() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/plugins", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["state"], "entered");
    assert_eq!(data["plugins"].as_array().map(Vec::len), Some(3));
    assert_eq!(data["plugins"][0]["name"], "tagger_a");
    assert_eq!(data["plugins"][0]["state"], "active");
    assert_eq!(data["routers"], json!(["tagger_a"]));
    assert_eq!(data["middlewares"], json!(["tagger_a", "tagger_b"]));
    assert_eq!(
        data["hooks"]["host.tools.get_tools"],
        json!(["tagger_a", "tagger_b", "broken"])
    );
    app.shutdown().await;
}

#[tokio::test]
async fn test_unmountable_plugin_name_rejects_router_only() {
    let app = helpers::TestApp::with_plugins(vec![
        helpers::tagger("", "x", true),
        helpers::tagger("tagger_a", "a", true),
    ])
    .await;

    let response = app.request("GET", "/plugins/tagger_a/trail", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "x,a");

    let response = app.request("GET", "/api/plugins", None).await;
    let data = &response.body["data"];
    assert_eq!(data["state"], "entered");
    assert_eq!(data["routers"], json!(["tagger_a"]));
    assert_eq!(data["plugins"][0]["state"], "active");
    assert_eq!(data["plugins"][0]["rejected"], json!(["routes@host.routers"]));
    app.shutdown().await;
}
