//! Async REST client for the BlockCypher API.

use crate::query_helpers::{BlockRef, QueryParams};
use crate::types::{Chain, Coin};
use reqwest::{Client, Method, StatusCode, header};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Root of the public BlockCypher API.
pub const DEFAULT_BASE_URL: &str = "https://api.blockcypher.com/v1";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Non-2xx response returned by the API.
///
/// BlockCypher reports failures as JSON, either as a single error:
///
/// ```json
/// { "error": "Wallet alice not found" }
/// ```
///
/// or as a list when several inputs were rejected:
///
/// ```json
/// { "errors": [{ "error": "Unable to find a transaction to spend" }] }
/// ```
///
/// `message` holds the extracted text; `body` keeps the full payload for callers
/// that need more than the message.
#[derive(Debug, thiserror::Error)]
#[error("API error {status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Parsed error payload, if the response body was JSON.
    pub body: Option<Value>,
}

impl ApiError {
    fn from_response(status: StatusCode, bytes: &[u8]) -> Self {
        let body = serde_json::from_slice::<Value>(bytes).ok();
        let message = body
            .as_ref()
            .and_then(error_message)
            .or_else(|| {
                let text = String::from_utf8_lossy(bytes).trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string());

        Self {
            status,
            message,
            body,
        }
    }

    /// Returns `true` for HTTP 404 (unknown address, wallet, hook, ...).
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Returns `true` when the token was missing or rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
    }

    /// Returns `true` when the token's request quota is exhausted.
    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

fn error_message(body: &Value) -> Option<String> {
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    let messages: Vec<&str> = body
        .get("errors")?
        .as_array()?
        .iter()
        .filter_map(|entry| entry.get("error").and_then(Value::as_str))
        .collect();
    (!messages.is_empty()).then(|| messages.join("; "))
}

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Returns the API error if the server answered with a non-2xx status.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Transport settings for [`BlockcypherClient::with_config`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API root, without coin and chain (defaults to [`DEFAULT_BASE_URL`]).
    pub base_url: String,
    /// Total time allowed for one request. `None` leaves it to the transport.
    pub timeout: Option<Duration>,
    /// Time allowed to establish a connection.
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            connect_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Point the client at a different API root (staging or mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the total time allowed for one request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the time allowed to establish a connection.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

/// Async client for the BlockCypher REST API.
///
/// Each client is bound to one coin, one chain and one API token. Every request
/// goes to `<base>/<coin>/<chain>/<resource>` with `token` appended to the query
/// string. Responses are returned as raw JSON.
///
/// Cloning is cheap and clones share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use blockcypher_client::{BlockcypherClient, Chain, Coin};
///
/// #[tokio::main]
/// async fn main() -> blockcypher_client::client::Result<()> {
///     let client = BlockcypherClient::new(Coin::Btc, Chain::Main, "your-token");
///     let balance = client.address_balance("1DEP8i3QJCsomS4BSMY2RpU1upv62aGvhD", None).await?;
///     println!("Balance: {}", balance["balance"]);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BlockcypherClient {
    client: Client,
    base_url: String,
    coin: Coin,
    chain: Chain,
    token: String,
}

impl fmt::Debug for BlockcypherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockcypherClient")
            .field("base_url", &self.base_url)
            .field("coin", &self.coin)
            .field("chain", &self.chain)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl BlockcypherClient {
    /// Create a client for the public API.
    pub fn new(coin: Coin, chain: Chain, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            coin,
            chain,
            token: token.into(),
        }
    }

    /// Create a client with custom transport settings or a different API root.
    pub fn with_config(
        coin: Coin,
        chain: Chain,
        token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        Url::parse(&config.base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            coin,
            chain,
            token: token.into(),
        })
    }

    /// Create a client for Bitcoin mainnet.
    pub fn bitcoin(token: impl Into<String>) -> Self {
        Self::new(Coin::Btc, Chain::Main, token)
    }

    /// Create a client for Bitcoin testnet3.
    pub fn bitcoin_testnet(token: impl Into<String>) -> Self {
        Self::new(Coin::Btc, Chain::Test3, token)
    }

    /// Create a client for Litecoin mainnet.
    pub fn litecoin(token: impl Into<String>) -> Self {
        Self::new(Coin::Ltc, Chain::Main, token)
    }

    /// Create a client for Dogecoin mainnet.
    pub fn dogecoin(token: impl Into<String>) -> Self {
        Self::new(Coin::Doge, Chain::Main, token)
    }

    /// Create a client for the BlockCypher test chain, where [`faucet`](Self::faucet) works.
    pub fn blockcypher_testnet(token: impl Into<String>) -> Self {
        Self::new(Coin::Bcy, Chain::Test, token)
    }

    /// Returns the coin every request targets.
    pub fn coin(&self) -> Coin {
        self.coin
    }

    /// Returns the chain every request targets.
    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Returns the API root, without coin and chain.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for `resource`, with caller params followed by the token.
    ///
    /// A caller-supplied `token` key is dropped so the configured token is the
    /// only one sent.
    fn endpoint_url(&self, resource: &str, params: Option<&QueryParams>) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}/{}{}",
            self.base_url, self.coin, self.chain, resource
        ))?;

        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params.into_iter().flat_map(|params| params.iter()) {
                if key != "token" {
                    query.append_pair(key, value);
                }
            }
            query.append_pair("token", &self.token);
        }

        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        resource: &str,
        params: Option<&QueryParams>,
        body: Option<&B>,
    ) -> Result<Value> {
        let url = self.endpoint_url(resource, params)?;
        debug!(%method, coin = %self.coin, chain = %self.chain, resource, "sending request");

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(header::USER_AGENT, USER_AGENT);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(%method, resource, status = status.as_u16(), "received response");

        if !status.is_success() {
            let error = ApiError::from_response(status, &bytes);
            warn!(%method, resource, status = status.as_u16(), error = %error.message, "request rejected");
            return Err(error.into());
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get(&self, resource: &str, params: Option<&QueryParams>) -> Result<Value> {
        self.send::<Value>(Method::GET, resource, params, None).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        resource: &str,
        params: Option<&QueryParams>,
        body: &B,
    ) -> Result<Value> {
        self.send(Method::POST, resource, params, Some(body)).await
    }

    async fn delete(&self, resource: &str, params: Option<&QueryParams>) -> Result<Value> {
        self.send::<Value>(Method::DELETE, resource, params, None).await
    }

    // ── Chain / Blocks ───────────────────────────────────────────

    /// Returns information about the configured blockchain (height, latest hash, fees).
    pub async fn chain_info(&self) -> Result<Value> {
        self.get("/", None).await
    }

    /// Returns a block by height or hash.
    pub async fn block(
        &self,
        block: impl Into<BlockRef>,
        params: Option<&QueryParams>,
    ) -> Result<Value> {
        self.get(&format!("/blocks/{}", block.into()), params).await
    }

    // ── Addresses ────────────────────────────────────────────────

    /// Returns balance information for an address.
    pub async fn address_balance(
        &self,
        address: &str,
        params: Option<&QueryParams>,
    ) -> Result<Value> {
        self.get(&format!("/addrs/{address}/balance"), params)
            .await
    }

    /// Returns an address with concise transaction references.
    pub async fn address(&self, address: &str, params: Option<&QueryParams>) -> Result<Value> {
        self.get(&format!("/addrs/{address}"), params).await
    }

    /// Returns an address with its full transactions.
    pub async fn address_full(
        &self,
        address: &str,
        params: Option<&QueryParams>,
    ) -> Result<Value> {
        self.get(&format!("/addrs/{address}/full"), params).await
    }

    /// Generates a new address with its private and public keys.
    ///
    /// Pass `data` (e.g. `{"pubkeys": [...], "script_type": "multisig-2-of-3"}`)
    /// to generate a multisig address; `None` sends an empty object.
    pub async fn generate_address(&self, data: Option<&Value>) -> Result<Value> {
        let empty = json!({});
        self.post("/addrs", None, data.unwrap_or(&empty)).await
    }

    /// Funds an address from the faucet. Only the `bcy/test` and `btc/test3` chains accept this.
    pub async fn faucet(&self, address: &str, amount: u64) -> Result<Value> {
        self.post(
            "/faucet",
            None,
            &json!({ "address": address, "amount": amount }),
        )
        .await
    }

    // ── Wallets ──────────────────────────────────────────────────

    /// Creates a wallet. `None` sends an empty object.
    pub async fn create_wallet(&self, data: Option<&Value>) -> Result<Value> {
        let empty = json!({});
        self.post("/wallets", None, data.unwrap_or(&empty)).await
    }

    /// Creates an HD wallet from `{"name": ..., "extended_public_key": ...}`.
    pub async fn create_hd_wallet(&self, data: &Value) -> Result<Value> {
        self.post("/wallets/hd", None, data).await
    }

    /// Lists the wallet names registered under the token.
    pub async fn list_wallets(&self) -> Result<Value> {
        self.get("/wallets", None).await
    }

    /// Lists the HD wallet names registered under the token.
    pub async fn list_hd_wallets(&self) -> Result<Value> {
        self.get("/wallets/hd", None).await
    }

    /// Returns a named wallet and its addresses.
    pub async fn wallet(&self, name: &str) -> Result<Value> {
        self.get(&format!("/wallets/{name}"), None).await
    }

    /// Returns a named HD wallet.
    pub async fn hd_wallet(&self, name: &str) -> Result<Value> {
        self.get(&format!("/wallets/hd/{name}"), None).await
    }

    /// Adds addresses to a named wallet.
    pub async fn add_wallet_addresses<S: AsRef<str>>(
        &self,
        name: &str,
        addresses: &[S],
    ) -> Result<Value> {
        let addresses: Vec<&str> = addresses.iter().map(|address| address.as_ref()).collect();
        self.post(
            &format!("/wallets/{name}/addresses"),
            None,
            &json!({ "addresses": addresses }),
        )
        .await
    }

    /// Lists the addresses of a named wallet.
    pub async fn wallet_addresses(&self, name: &str) -> Result<Value> {
        self.get(&format!("/wallets/{name}/addresses"), None).await
    }

    /// Lists the derived addresses of a named HD wallet.
    pub async fn hd_wallet_addresses(&self, name: &str) -> Result<Value> {
        self.get(&format!("/wallets/hd/{name}/addresses"), None)
            .await
    }

    /// Removes addresses from a named wallet.
    ///
    /// The addresses are sent as one `address` parameter joined with `;`.
    pub async fn remove_wallet_addresses<S: AsRef<str>>(
        &self,
        name: &str,
        addresses: &[S],
    ) -> Result<Value> {
        let joined = addresses
            .iter()
            .map(|address| address.as_ref())
            .collect::<Vec<&str>>()
            .join(";");
        let params = QueryParams::new().insert("address", joined);
        self.delete(&format!("/wallets/{name}/addresses"), Some(&params))
            .await
    }

    /// Generates a new address and adds it to a named wallet.
    pub async fn generate_wallet_address(&self, name: &str) -> Result<Value> {
        self.post(&format!("/wallets/{name}/addresses/generate"), None, &json!({}))
            .await
    }

    /// Derives the next address of an HD wallet (`count`, `subchain_index` go in `params`).
    pub async fn derive_hd_wallet_address(
        &self,
        name: &str,
        params: Option<&QueryParams>,
    ) -> Result<Value> {
        self.post(
            &format!("/wallets/hd/{name}/addresses/derive"),
            params,
            &json!({}),
        )
        .await
    }

    /// Deletes a named wallet.
    pub async fn delete_wallet(&self, name: &str) -> Result<Value> {
        self.delete(&format!("/wallets/{name}"), None).await
    }

    /// Deletes a named HD wallet.
    pub async fn delete_hd_wallet(&self, name: &str) -> Result<Value> {
        self.delete(&format!("/wallets/hd/{name}"), None).await
    }

    // ── Transactions ─────────────────────────────────────────────

    /// Returns a transaction by hash.
    pub async fn transaction(&self, hash: &str, params: Option<&QueryParams>) -> Result<Value> {
        self.get(&format!("/txs/{hash}"), params).await
    }

    /// Returns the transactions currently in the mempool.
    pub async fn unconfirmed_transactions(&self) -> Result<Value> {
        self.get("/txs", None).await
    }

    /// Builds a transaction skeleton with the data that needs to be signed.
    pub async fn new_transaction(&self, tx: &Value) -> Result<Value> {
        self.post("/txs/new", None, tx).await
    }

    /// Sends a signed transaction skeleton and returns the completed transaction.
    pub async fn send_transaction(&self, skeleton: &Value) -> Result<Value> {
        self.post("/txs/send", None, skeleton).await
    }

    /// Broadcasts a raw, hex-encoded transaction.
    pub async fn push_raw_transaction(&self, hex: &str) -> Result<Value> {
        self.post("/txs/push", None, &json!({ "tx": hex })).await
    }

    /// Decodes a raw, hex-encoded transaction without broadcasting it.
    pub async fn decode_raw_transaction(&self, hex: &str) -> Result<Value> {
        self.post("/txs/decode", None, &json!({ "tx": hex })).await
    }

    /// Embeds hex-encoded data in a null-data transaction.
    pub async fn embed_data(&self, hex: &str) -> Result<Value> {
        self.post("/txs/data", None, &json!({ "data": hex })).await
    }

    /// Sends a microtransaction.
    pub async fn send_microtransaction(&self, micro: &Value) -> Result<Value> {
        self.post("/txs/micro", None, micro).await
    }

    /// Returns the double-spend confidence of an unconfirmed transaction.
    pub async fn transaction_confidence(&self, hash: &str) -> Result<Value> {
        self.get(&format!("/txs/{hash}/confidence"), None).await
    }

    // ── Payment forwards ─────────────────────────────────────────

    /// Creates a payment forward, e.g. `{"destination": ...}`.
    pub async fn create_payment_forward(&self, data: &Value) -> Result<Value> {
        self.post("/payments", None, data).await
    }

    /// Lists the payment forwards registered under the token.
    pub async fn list_payment_forwards(&self) -> Result<Value> {
        self.get("/payments", None).await
    }

    /// Deletes a payment forward by id.
    pub async fn delete_payment_forward(&self, id: &str) -> Result<Value> {
        self.delete(&format!("/payments/{id}"), None).await
    }

    // ── Webhooks ─────────────────────────────────────────────────

    /// Registers a webhook, e.g. `{"event": "unconfirmed-tx", "address": ..., "url": ...}`.
    pub async fn create_webhook(&self, data: &Value) -> Result<Value> {
        self.post("/hooks", None, data).await
    }

    /// Lists the webhooks registered under the token.
    pub async fn list_webhooks(&self) -> Result<Value> {
        self.get("/hooks", None).await
    }

    /// Returns a webhook by id.
    pub async fn webhook(&self, id: &str) -> Result<Value> {
        self.get(&format!("/hooks/{id}"), None).await
    }

    /// Deletes a webhook by id.
    pub async fn delete_webhook(&self, id: &str) -> Result<Value> {
        self.delete(&format!("/hooks/{id}"), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = BlockcypherClient::bitcoin("T");
        assert_eq!(client.coin(), Coin::Btc);
        assert_eq!(client.chain(), Chain::Main);
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);

        let client = BlockcypherClient::bitcoin_testnet("T");
        assert_eq!(client.chain(), Chain::Test3);

        let client = BlockcypherClient::blockcypher_testnet("T");
        assert_eq!((client.coin(), client.chain()), (Coin::Bcy, Chain::Test));
    }

    #[test]
    fn test_with_config_trims_base_url() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:8080/v1/")
            .with_timeout(Duration::from_secs(5));
        let client = BlockcypherClient::with_config(Coin::Ltc, Chain::Main, "T", config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_with_config_rejects_bad_base_url() {
        let config = ClientConfig::default().with_base_url("not a url");
        let err = BlockcypherClient::with_config(Coin::Btc, Chain::Main, "T", config).unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_endpoint_url_appends_token() {
        let client = BlockcypherClient::bitcoin("T");
        let url = client.endpoint_url("/addrs/1A1zP1/balance", None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.blockcypher.com/v1/btc/main/addrs/1A1zP1/balance?token=T"
        );

        let url = client.endpoint_url("/", None).unwrap();
        assert_eq!(url.as_str(), "https://api.blockcypher.com/v1/btc/main/?token=T");
    }

    #[test]
    fn test_endpoint_url_merges_params_and_token_wins() {
        let client = BlockcypherClient::new(Coin::Doge, Chain::Main, "secret");
        let params = QueryParams::new()
            .limit(10)
            .insert("token", "other")
            .unspent_only(true);
        let url = client.endpoint_url("/addrs/D8x", Some(&params)).unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("unspentOnly".to_string(), "true".to_string()),
                ("token".to_string(), "secret".to_string()),
            ]
        );
        assert_eq!(url.path(), "/v1/doge/main/addrs/D8x");
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = BlockcypherClient::bitcoin("super-secret");
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_api_error_single_message() {
        let err = ApiError::from_response(
            StatusCode::NOT_FOUND,
            br#"{"error": "Wallet alice not found"}"#,
        );
        assert!(err.is_not_found());
        assert_eq!(err.message, "Wallet alice not found");
        assert_eq!(err.to_string(), "API error 404 Not Found: Wallet alice not found");
        assert!(err.body.is_some());
    }

    #[test]
    fn test_api_error_message_list() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            br#"{"errors": [{"error": "first"}, {"error": "second"}], "tx": {}}"#,
        );
        assert_eq!(err.message, "first; second");
    }

    #[test]
    fn test_api_error_without_json() {
        let err = ApiError::from_response(StatusCode::TOO_MANY_REQUESTS, b"slow down");
        assert!(err.is_rate_limited());
        assert_eq!(err.message, "slow down");
        assert!(err.body.is_none());

        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, b"");
        assert!(err.is_unauthorized());
        assert_eq!(err.message, "Unauthorized");
    }
}
