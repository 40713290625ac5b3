//! Shared helpers for the mock-server tests.

use blockcypher_client::{BlockcypherClient, Chain, ClientConfig, Coin};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "T";

/// Client pointed at `server`, with the same `/v1` prefix as the real API.
pub fn client_for(server: &MockServer, coin: Coin, chain: Chain) -> BlockcypherClient {
    let config = ClientConfig::default().with_base_url(format!("{}/v1", server.uri()));
    BlockcypherClient::with_config(coin, chain, TOKEN, config).expect("client init")
}

/// Mount a mock that must be hit exactly once with `verb` on `resource_path`,
/// carrying the token and, if given, the JSON body. Responds with `{"ok": true}`.
pub async fn expect_call(server: &MockServer, verb: &str, resource_path: &str, body: Option<Value>) {
    let mock = Mock::given(method(verb))
        .and(path(resource_path))
        .and(query_param("token", TOKEN));
    let mock = match body {
        Some(body) => mock.and(body_json(body)),
        None => mock,
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(server)
        .await;
}
