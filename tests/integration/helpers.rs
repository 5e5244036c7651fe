//! Helper functions for integration tests

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zabbix_overview::{
    ZabbixClient,
    config::{ClientOptions, ConnectionProfile},
};

pub const TEST_TOKEN: &str = "test-token";

pub fn endpoint(server: &MockServer) -> String {
    format!("{}/api_jsonrpc.php", server.uri())
}

pub fn create_test_client(server: &MockServer) -> ZabbixClient {
    create_test_client_with(server, ClientOptions::default())
}

pub fn create_test_client_with(server: &MockServer, options: ClientOptions) -> ZabbixClient {
    let profile = ConnectionProfile::new(endpoint(server), TEST_TOKEN);
    ZabbixClient::with_options(&profile, options).unwrap()
}

pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": 1
    }))
}

pub fn rpc_error(code: i64, message: &str, data: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "error": {"code": code, "message": message, "data": data},
        "id": 1
    }))
}

/// Mock answering every call of `rpc_method` whose params contain `params`.
pub fn rpc_mock(rpc_method: &str, params: Value, response: ResponseTemplate) -> Mock {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method, "params": params })))
        .respond_with(response)
}

pub async fn received_methods(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| {
            let body: Value = request.body_json().unwrap();
            body["method"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

pub fn item(id: &str, name: &str, key: &str, lastvalue: &str) -> Value {
    json!({"itemid": id, "name": name, "key_": key, "lastvalue": lastvalue})
}
