//! Integration tests for MCP protocol handling.
//!
//! These tests verify the JSON-RPC 2.0 layer and the dispatcher end to end:
//! raw request lines in, serialised responses out.

use std::collections::HashMap;
use std::sync::Arc;

use pizzaz_mcp::catalog::Catalog;
use pizzaz_mcp::mcp::protocol::{
    encode_reply, parse_message, ErrorCode, IncomingMessage, RequestId,
};
use pizzaz_mcp::mcp::Dispatcher;
use pizzaz_mcp::pizzeria::MockPizzerias;
use pizzaz_mcp::tools::default_widgets;
use pizzaz_mcp::widget::Artifact;
use serde_json::{json, Value};

fn dispatcher() -> Dispatcher {
    let artifacts: HashMap<String, Artifact> = [
        ("helloworld", "1a2b"),
        ("pizza_list", "3c4d"),
        ("pizza_map", "5e6f"),
    ]
    .into_iter()
    .map(|(name, hash)| {
        let markup = format!("<div id=\"{name}-root\"></div><script type=\"module\"></script>");
        (name.to_string(), Artifact::new(name, hash, &markup))
    })
    .collect();

    let catalog = Catalog::new(default_widgets(Arc::new(MockPizzerias)), artifacts)
        .expect("Failed to build catalog");
    Dispatcher::new(Arc::new(catalog))
}

/// Sends one request line through parsing, dispatch and encoding.
async fn round_trip(dispatcher: &Dispatcher, line: &str) -> Value {
    let IncomingMessage::Request(req) = parse_message(line).expect("Failed to parse") else {
        panic!("Expected Request");
    };
    let reply = dispatcher.handle_request(&req).await;
    let encoded = encode_reply(&reply).expect("Failed to encode");
    assert!(!encoded.contains('\n'), "reply must fit on one line");
    serde_json::from_str(&encoded).expect("Reply is not JSON")
}

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-06-18",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, RequestId::Number(1));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_tools_call_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": "call-7",
        "method": "tools/call",
        "params": {"name": "pizza_list", "arguments": {"pizzaTopping": "pepperoni"}}
    }"#;

    let IncomingMessage::Request(req) = parse_message(json).unwrap() else {
        panic!("Expected Request");
    };
    assert_eq!(req.id, RequestId::String("call-7".to_string()));
    assert_eq!(req.params.unwrap()["arguments"]["pizzaTopping"], "pepperoni");
}

#[test]
fn test_parse_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Notification(notif) = result.unwrap() {
        assert_eq!(notif.method, "notifications/initialized");
    } else {
        panic!("Expected Notification");
    }
}

#[test]
fn test_parse_invalid_json() {
    let err = parse_message("not valid json").unwrap_err();
    assert_eq!(err.error.code, ErrorCode::ParseError.code());
}

#[test]
fn test_parse_missing_jsonrpc_version() {
    let json = r#"{
        "id": 1,
        "method": "test"
    }"#;

    let err = parse_message(json).unwrap_err();
    assert_eq!(err.error.code, ErrorCode::InvalidRequest.code());
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[tokio::test]
async fn test_initialize_advertises_tools_and_resources() {
    let d = dispatcher();
    let resp = round_trip(
        &d,
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18","capabilities":{}}}"#,
    )
    .await;

    assert_eq!(resp["jsonrpc"], "2.0");
    assert_eq!(resp["id"], 1);
    let result = &resp["result"];
    assert_eq!(result["protocolVersion"], "2025-06-18");
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["resources"].is_object());
    assert_eq!(result["serverInfo"]["name"], "pizzaz-mcp");
}

#[tokio::test]
async fn test_tools_list_wire_shape() {
    let d = dispatcher();
    let resp = round_trip(&d, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;

    let tools = resp["result"]["tools"].as_array().expect("tools array");
    assert_eq!(tools.len(), 3);

    let list = &tools[1];
    assert_eq!(list["name"], "pizza_list");
    assert_eq!(list["title"], "Show Pizza List");
    assert_eq!(list["inputSchema"]["type"], "object");
    assert_eq!(
        list["inputSchema"]["properties"]["pizzaTopping"]["type"],
        "string"
    );
    assert_eq!(list["_meta"]["openai/outputTemplate"], "ui://widget/pizza_list.html");
    assert_eq!(list["_meta"]["openai/toolInvocation/invoking"], "Preparing pizza list...");
    assert_eq!(list["_meta"]["annotations"]["readOnlyHint"], true);

    let hello = &tools[0];
    assert!(hello["inputSchema"].get("required").is_none());
}

#[tokio::test]
async fn test_resources_list_wire_shape() {
    let d = dispatcher();
    let resp = round_trip(&d, r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#).await;

    let resources = resp["result"]["resources"].as_array().expect("resources array");
    assert_eq!(resources.len(), 3);

    let map = &resources[2];
    assert_eq!(map["uri"], "ui://widget/pizza_map.html");
    assert_eq!(map["mimeType"], "text/html+skybridge");
    assert_eq!(map["_meta"]["openai/widgetPrefersBorder"], true);
    assert_eq!(
        map["_meta"]["openai/widgetCSP"]["connect_domains"],
        json!(["https://api.mapbox.com"])
    );
    // Tool invocation keys belong to tools, never to resources.
    assert!(map["_meta"].get("openai/outputTemplate").is_none());
}

#[tokio::test]
async fn test_read_resource_returns_markup() {
    let d = dispatcher();
    let resp = round_trip(
        &d,
        r#"{"jsonrpc":"2.0","id":4,"method":"resources/read","params":{"uri":"ui://widget/helloworld.html"}}"#,
    )
    .await;

    let contents = resp["result"]["contents"].as_array().expect("contents");
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0]["uri"], "ui://widget/helloworld.html");
    assert_eq!(contents[0]["mimeType"], "text/html+skybridge");
    assert_eq!(
        contents[0]["text"],
        "<div id=\"helloworld-root\"></div><script type=\"module\"></script>"
    );
}

#[tokio::test]
async fn test_tool_call_result_meta_order() {
    let d = dispatcher();
    let resp = round_trip(
        &d,
        r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"pizza_map","arguments":{"pizzaTopping":"hawaiian"}}}"#,
    )
    .await;

    let meta = resp["result"]["_meta"].as_object().expect("_meta");
    let keys: Vec<&str> = meta.keys().map(String::as_str).collect();
    assert_eq!(keys[0], "openai.com/widget");
    assert_eq!(
        &keys[1..],
        [
            "openai/outputTemplate",
            "openai/toolInvocation/invoking",
            "openai/toolInvocation/invoked",
            "openai/widgetAccessible",
            "openai/resultCanProduceWidget",
            "annotations",
        ]
    );
    assert_eq!(meta["openai.com/widget"]["type"], "resource");
    assert_eq!(meta["openai.com/widget"]["resource"]["title"], "Show Pizza Map");
}

#[tokio::test]
async fn test_tool_call_missing_params_is_protocol_error() {
    let d = dispatcher();
    let resp = round_trip(&d, r#"{"jsonrpc":"2.0","id":6,"method":"tools/call"}"#).await;

    assert_eq!(resp["id"], 6);
    assert_eq!(resp["error"]["code"], ErrorCode::InvalidParams.code());
    assert!(resp.get("result").is_none());
}

#[tokio::test]
async fn test_unknown_method() {
    let d = dispatcher();
    let resp = round_trip(&d, r#"{"jsonrpc":"2.0","id":"u","method":"sampling/createMessage"}"#).await;

    assert_eq!(resp["id"], "u");
    assert_eq!(resp["error"]["code"], ErrorCode::MethodNotFound.code());
}

#[tokio::test]
async fn test_ping() {
    let d = dispatcher();
    let resp = round_trip(&d, r#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#).await;
    assert_eq!(resp["result"], json!({}));
}
