//! HTTP client for the block explorer APIs.
//!
//! Transactions are looked up through an Etherscan compatible `proxy` endpoint, blob payloads
//! through a Blobscan compatible `blobs/{versioned_hash}` endpoint.

use crate::{BlobExplorer, Error};
use alloy_primitives::B256;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default Etherscan API endpoint.
pub const DEFAULT_ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";

/// Default blob data endpoint.
pub const DEFAULT_BLOB_API_URL: &str = "https://api.blobscan.com/blobs";

/// Default timeout of a single explorer request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Explorer endpoints and credentials.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Etherscan compatible API endpoint.
    pub etherscan_api_url: String,
    /// Etherscan API key. Requests are sent without a key when `None`.
    pub etherscan_api_key: Option<String>,
    /// Base url of the blob data endpoint.
    pub blob_api_url: String,
    /// Timeout of a single request.
    pub timeout: Duration,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            etherscan_api_url: DEFAULT_ETHERSCAN_API_URL.to_string(),
            etherscan_api_key: None,
            blob_api_url: DEFAULT_BLOB_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ExplorerConfig {
    /// Url of the `eth_getTransactionByHash` proxy call for `tx_hash`.
    pub fn transaction_url(&self, tx_hash: B256) -> Result<Url, Error> {
        let tx_hash = tx_hash.to_string();
        let mut params = vec![
            ("module", "proxy"),
            ("action", "eth_getTransactionByHash"),
            ("txhash", tx_hash.as_str()),
        ];
        if let Some(key) = &self.etherscan_api_key {
            params.push(("apikey", key.as_str()));
        }

        Url::parse_with_params(&self.etherscan_api_url, params).map_err(Into::into)
    }

    /// Url of the blob data for `versioned_hash`.
    pub fn blob_url(&self, versioned_hash: B256) -> Result<Url, Error> {
        let base = self.blob_api_url.trim_end_matches('/');
        Url::parse(&format!("{base}/{versioned_hash}")).map_err(Into::into)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionResult {
    #[serde(default)]
    blob_versioned_hashes: Option<Vec<B256>>,
}

#[derive(Debug, Deserialize)]
struct BlobDataResponse {
    #[serde(default)]
    data: Option<String>,
}

/// Extract the blob versioned hashes from an Etherscan proxy response.
///
/// Etherscan reports failures with a string in `result`, or with `message` and no `result`.
pub(crate) fn parse_transaction_response(tx_hash: B256, body: Value) -> Result<Vec<B256>, Error> {
    let result = match body.get("result") {
        None | Some(Value::Null) => {
            return match body.get("message").and_then(Value::as_str) {
                Some(message) if message != "OK" => Err(Error::Api(message.to_string())),
                _ => Err(Error::TransactionNotFound(tx_hash)),
            }
        }
        Some(Value::String(message)) if message.is_empty() => {
            return Err(Error::TransactionNotFound(tx_hash))
        }
        Some(Value::String(message)) => return Err(Error::Api(message.clone())),
        Some(result) => result.clone(),
    };

    let tx: TransactionResult = serde_json::from_value(result)?;
    match tx.blob_versioned_hashes {
        Some(hashes) if !hashes.is_empty() => Ok(hashes),
        _ => Err(Error::NoBlobHashes(tx_hash)),
    }
}

/// Extract the blob payload from a blob data response.
pub(crate) fn parse_blob_response(versioned_hash: B256, body: Value) -> Result<String, Error> {
    let response: BlobDataResponse = serde_json::from_value(body)?;
    response
        .data
        .map(|data| data.trim().to_string())
        .filter(|data| !data.is_empty())
        .ok_or(Error::BlobDataNotFound(versioned_hash))
}

/// [`BlobExplorer`] backed by HTTP APIs.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    client: reqwest::Client,
    config: ExplorerConfig,
}

impl ExplorerClient {
    /// Create a new [Self].
    pub fn new(config: ExplorerConfig) -> Result<Self, Error> {
        let client =
            reqwest::Client::builder().timeout(config.timeout).user_agent(USER_AGENT).build()?;
        Ok(Self { client, config })
    }

    async fn get_json(&self, url: Url) -> Result<Value, Error> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status: status.as_u16(), url: redact(url) });
        }

        response.json().await.map_err(Into::into)
    }
}

impl BlobExplorer for ExplorerClient {
    #[instrument(skip(self))]
    async fn blob_versioned_hashes(&self, tx_hash: B256) -> Result<Vec<B256>, Error> {
        let url = self.config.transaction_url(tx_hash)?;
        debug!(url = %redact(url.clone()), "fetching transaction");
        let body = self.get_json(url).await?;
        parse_transaction_response(tx_hash, body)
    }

    #[instrument(skip(self))]
    async fn blob_data(&self, versioned_hash: B256) -> Result<String, Error> {
        let url = self.config.blob_url(versioned_hash)?;
        debug!(%url, "fetching blob data");
        let body = self.get_json(url).await?;
        parse_blob_response(versioned_hash, body)
    }
}

/// Drop the api key from `url` so it can be logged.
fn redact(mut url: Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "apikey")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.to_string()
}
