// EDTrace - Execution Trace Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! End-to-end tests of the JSON-RPC debug server over HTTP.

use std::sync::Arc;

use edtrace_common::{logging::ensure_test_logging, test_utils::nested_call_trace};
use edtrace_engine::{
    rpc::{error_codes, DebugRpcServer, RpcServerHandle},
    Session,
};
use serde_json::{json, Value};
use tracing::info;

async fn start_server() -> RpcServerHandle {
    let trace = Arc::new(nested_call_trace());
    let session = Session::start(&trace);
    DebugRpcServer::new(trace, session).start_on_port(0).await.expect("server should start")
}

async fn post(handle: &RpcServerHandle, body: Value) -> Value {
    reqwest::Client::new()
        .post(format!("http://{}/", handle.addr()))
        .json(&body)
        .send()
        .await
        .expect("request should be sent")
        .json()
        .await
        .expect("response should be JSON")
}

async fn call(handle: &RpcServerHandle, method: &str, params: Value) -> Value {
    post(handle, json!({"jsonrpc": "2.0", "method": method, "params": params, "id": 1})).await
}

#[tokio::test]
async fn test_health_check() {
    ensure_test_logging(None);
    info!("Running test");

    let handle = start_server().await;
    let health: Value = reqwest::get(format!("http://{}/health", handle.addr()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
    handle.shutdown().unwrap();
}

#[tokio::test]
async fn test_navigation_session() {
    ensure_test_logging(None);
    info!("Running test");

    let handle = start_server().await;

    let info = call(&handle, "trace.getInfo", Value::Null).await;
    assert_eq!(info["result"], json!({"steps": 5, "files": ["A", "B"]}));

    let response = call(&handle, "debug.stepInto", json!({})).await;
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["cursor"]["step"], 1);

    let response = call(&handle, "debug.stepOver", json!({"direction": "forward"})).await;
    assert_eq!(response["result"]["moved"], true);
    assert_eq!(response["result"]["cursor"]["step"], 4);

    // Running off the end is a successful no-op
    let response = call(&handle, "debug.stepInto", json!({"direction": "forward"})).await;
    assert_eq!(response["result"]["moved"], false);
    assert!(response.get("error").is_none());

    let response = call(&handle, "debug.gotoLocation", json!({"path": "A", "lineNumber": 2})).await;
    assert_eq!(response["result"]["cursor"]["step"], 1);

    let env = call(&handle, "debug.getEnvironment", Value::Null).await;
    assert_eq!(env["result"]["y"]["contents"], 2);

    let location = call(&handle, "debug.resolveLocation", json!({"index": 3})).await;
    assert_eq!(location["result"], json!({"path": "B", "line_number": 2}));

    handle.shutdown().unwrap();
}

#[tokio::test]
async fn test_keys_toggles_and_source_view() {
    ensure_test_logging(None);
    info!("Running test");

    let handle = start_server().await;

    call(&handle, "debug.toggle", json!({"flag": "animate"})).await;
    let response = call(&handle, "debug.handleKey", json!({"key": "l"})).await;
    assert_eq!(response["result"]["cursor"]["flags"]["animate"], true);

    let view = call(&handle, "debug.getSourceView", Value::Null).await;
    let lines = view["result"]["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1]["is_current"], true);
    assert_eq!(lines[2]["cloaked"], true);

    let revealed = call(&handle, "debug.getRevealed", Value::Null).await;
    assert_eq!(revealed["result"].as_array().unwrap().len(), 2);

    handle.shutdown().unwrap();
}

#[tokio::test]
async fn test_protocol_errors() {
    ensure_test_logging(None);
    info!("Running test");

    let handle = start_server().await;

    let response = call(&handle, "debug.rewind", Value::Null).await;
    assert_eq!(response["error"]["code"], error_codes::METHOD_NOT_FOUND);

    let response = call(&handle, "debug.gotoStep", json!({"index": "first"})).await;
    assert_eq!(response["error"]["code"], error_codes::INVALID_PARAMS);

    let response = call(&handle, "debug.gotoStep", json!({"index": 40})).await;
    assert_eq!(response["error"]["code"], error_codes::STEP_OUT_OF_BOUNDS);

    let response = post(&handle, json!({"jsonrpc": "1.0", "method": "trace.getInfo", "id": "a"})).await;
    assert_eq!(response["error"]["code"], error_codes::INVALID_REQUEST);
    assert_eq!(response["id"], "a");

    let response: Value = reqwest::Client::new()
        .post(format!("http://{}/", handle.addr()))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["error"]["code"], error_codes::PARSE_ERROR);
    assert_eq!(response["id"], Value::Null);

    handle.shutdown().unwrap();
}
