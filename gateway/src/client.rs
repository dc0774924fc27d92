//! HTTP client for XRPL JSON-RPC nodes.

use crate::engine::EngineResult;
use crate::error::SubmissionError;
use airlock_types::{Amount, Drops, NetworkId};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

/// A signed transaction blob bound to the network it was built for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedBlob {
    hex: String,
    network: NetworkId,
}

impl SignedBlob {
    pub fn new(bytes: &[u8], network: NetworkId) -> Self {
        Self {
            hex: hex::encode_upper(bytes),
            network,
        }
    }

    pub fn from_hex(hex: impl Into<String>, network: NetworkId) -> Self {
        Self {
            hex: hex.into().to_uppercase(),
            network,
        }
    }

    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }
}

/// HTTP client for one XRPL network's JSON-RPC endpoint.
///
/// Wraps `reqwest::Client` with the node URL and provides typed methods for
/// each RPC action the wallet needs.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    network: NetworkId,
    node_url: String,
}

impl NodeClient {
    /// Client for the network's default public endpoint.
    pub fn new(network: NetworkId) -> Result<Self, SubmissionError> {
        Self::with_url(network, network.default_rpc_url())
    }

    /// Client for an explicit endpoint on the given network.
    pub fn with_url(
        network: NetworkId,
        node_url: impl Into<String>,
    ) -> Result<Self, SubmissionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SubmissionError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            network,
            node_url: node_url.into(),
        })
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    /// Send a JSON-RPC request and return the `result` object.
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, SubmissionError> {
        let body = json!({ "method": method, "params": [params] });

        let response = self
            .http
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SubmissionError::HttpStatus(response.status().as_u16()));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SubmissionError::BadResponse(format!("invalid JSON response: {e}")))?;

        let result = json
            .get("result")
            .cloned()
            .ok_or_else(|| SubmissionError::BadResponse("missing result object".into()))?;

        if result.get("status").and_then(|s| s.as_str()) == Some("error") {
            let message = result
                .get("error_message")
                .or_else(|| result.get("error"))
                .and_then(|e| e.as_str())
                .unwrap_or("unknown node error");
            return Err(SubmissionError::Node(message.to_string()));
        }

        Ok(result)
    }

    /// Fetch account sequence, balance, and owner count, plus the node's
    /// current ledger index.
    pub async fn account_info(&self, account: &str) -> Result<AccountInfoResult, SubmissionError> {
        let result = self
            .rpc_call(
                "account_info",
                json!({ "account": account, "ledger_index": "current" }),
            )
            .await?;

        let data: AccountData = serde_json::from_value(
            result
                .get("account_data")
                .cloned()
                .ok_or_else(|| SubmissionError::BadResponse("missing account_data".into()))?,
        )
        .map_err(|e| SubmissionError::BadResponse(format!("invalid account_info: {e}")))?;

        let ledger_current_index = result
            .get("ledger_current_index")
            .or_else(|| result.get("ledger_index"))
            .and_then(|v| v.as_u64())
            .ok_or_else(|| SubmissionError::BadResponse("missing ledger index".into()))?
            as u32;

        Ok(AccountInfoResult {
            sequence: data.sequence,
            balance: Drops::new(
                data.balance
                    .parse()
                    .map_err(|_| SubmissionError::BadResponse("invalid Balance".into()))?,
            ),
            owner_count: data.owner_count,
            ledger_current_index,
        })
    }

    /// Fetch the account's open DEX offers.
    pub async fn account_offers(&self, account: &str) -> Result<Vec<AccountOffer>, SubmissionError> {
        let result = self
            .rpc_call("account_offers", json!({ "account": account }))
            .await?;
        let offers = result.get("offers").cloned().unwrap_or_else(|| json!([]));
        serde_json::from_value(offers)
            .map_err(|e| SubmissionError::BadResponse(format!("invalid account_offers: {e}")))
    }

    /// Fetch the account's trustlines.
    pub async fn account_lines(&self, account: &str) -> Result<Vec<AccountLine>, SubmissionError> {
        let result = self
            .rpc_call("account_lines", json!({ "account": account }))
            .await?;
        let lines = result.get("lines").cloned().unwrap_or_else(|| json!([]));
        serde_json::from_value(lines)
            .map_err(|e| SubmissionError::BadResponse(format!("invalid account_lines: {e}")))
    }

    /// Fetch order-book depth for a currency pair.
    pub async fn book_offers(
        &self,
        taker_gets: serde_json::Value,
        taker_pays: serde_json::Value,
        limit: u32,
    ) -> Result<Vec<BookOffer>, SubmissionError> {
        let result = self
            .rpc_call(
                "book_offers",
                json!({ "taker_gets": taker_gets, "taker_pays": taker_pays, "limit": limit }),
            )
            .await?;
        let offers = result.get("offers").cloned().unwrap_or_else(|| json!([]));
        serde_json::from_value(offers)
            .map_err(|e| SubmissionError::BadResponse(format!("invalid book_offers: {e}")))
    }

    /// The node's current (open) ledger index.
    pub async fn ledger_current(&self) -> Result<u32, SubmissionError> {
        let result = self.rpc_call("ledger_current", json!({})).await?;
        result
            .get("ledger_current_index")
            .and_then(|v| v.as_u64())
            .map(|v| v as u32)
            .ok_or_else(|| SubmissionError::BadResponse("missing ledger_current_index".into()))
    }

    /// Fetch the network's reserve parameters.
    pub async fn server_reserves(&self) -> Result<ServerReserves, SubmissionError> {
        let result = self.rpc_call("server_state", json!({})).await?;
        let ledger = result
            .get("state")
            .and_then(|s| s.get("validated_ledger"))
            .cloned()
            .ok_or_else(|| SubmissionError::BadResponse("missing validated_ledger".into()))?;
        serde_json::from_value(ledger)
            .map_err(|e| SubmissionError::BadResponse(format!("invalid server_state: {e}")))
    }

    /// Submit a signed blob for this client's network.
    ///
    /// An error is terminal for the attempt; the caller decides whether a
    /// rebuild is needed (stale sequence/ledger bounds) or the result is
    /// surfaced verbatim. Never retried here.
    pub async fn submit(&self, blob: &SignedBlob) -> Result<SubmitOutcome, SubmissionError> {
        if blob.network() != self.network {
            warn!(
                blob_network = %blob.network(),
                client_network = %self.network,
                "refusing cross-network submission"
            );
            return Err(SubmissionError::NetworkMismatch {
                blob: blob.network(),
                client: self.network,
            });
        }

        let result = self
            .rpc_call("submit", json!({ "tx_blob": blob.as_hex() }))
            .await?;

        let engine_result = EngineResult(
            result
                .get("engine_result")
                .and_then(|v| v.as_str())
                .ok_or_else(|| SubmissionError::BadResponse("missing engine_result".into()))?
                .to_string(),
        );
        let engine_result_message = result
            .get("engine_result_message")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let tx_hash = result
            .get("tx_json")
            .and_then(|t| t.get("hash"))
            .and_then(|h| h.as_str())
            .map(str::to_string);

        info!(
            network = %self.network,
            %engine_result,
            hash = tx_hash.as_deref().unwrap_or("-"),
            "submit result"
        );

        Ok(SubmitOutcome {
            engine_result,
            engine_result_message,
            tx_hash,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AccountData {
    #[serde(rename = "Sequence")]
    sequence: u32,
    #[serde(rename = "Balance")]
    balance: String,
    #[serde(rename = "OwnerCount")]
    owner_count: u32,
}

/// Account state relevant to transaction building.
#[derive(Clone, Copy, Debug)]
pub struct AccountInfoResult {
    pub sequence: u32,
    pub balance: Drops,
    pub owner_count: u32,
    pub ledger_current_index: u32,
}

impl AccountInfoResult {
    /// The builder's view of this account.
    pub fn to_account_state(&self) -> airlock_tx::AccountState {
        airlock_tx::AccountState {
            sequence: self.sequence,
            balance: self.balance,
            owner_count: self.owner_count,
            ledger_index: self.ledger_current_index,
        }
    }
}

/// Reserve parameters from `server_state`.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ServerReserves {
    pub reserve_base: u64,
    pub reserve_inc: u64,
}

impl ServerReserves {
    pub fn to_reserves(&self) -> airlock_tx::Reserves {
        airlock_tx::Reserves {
            base: Drops::new(self.reserve_base),
            increment: Drops::new(self.reserve_inc),
        }
    }
}

/// One open offer from `account_offers`.
#[derive(Clone, Debug, Deserialize)]
pub struct AccountOffer {
    pub seq: u32,
    #[serde(default)]
    pub flags: u32,
    pub taker_gets: Amount,
    pub taker_pays: Amount,
    #[serde(default)]
    pub expiration: Option<u32>,
}

/// One trustline from `account_lines`.
#[derive(Clone, Debug, Deserialize)]
pub struct AccountLine {
    pub account: String,
    pub currency: String,
    pub balance: String,
    pub limit: String,
}

/// One order-book entry from `book_offers`.
#[derive(Clone, Debug, Deserialize)]
pub struct BookOffer {
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "TakerGets")]
    pub taker_gets: Amount,
    #[serde(rename = "TakerPays")]
    pub taker_pays: Amount,
    #[serde(default)]
    pub quality: Option<String>,
}

/// Result of one submit attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub engine_result: EngineResult,
    pub engine_result_message: String,
    pub tx_hash: Option<String>,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        self.engine_result.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_network_submission_rejected() {
        let client = NodeClient::new(NetworkId::Mainnet).unwrap();
        let blob = SignedBlob::new(&[0x12, 0x00, 0x00], NetworkId::Testnet);
        let err = tokio_test_block_on(client.submit(&blob)).unwrap_err();
        assert_eq!(
            err,
            SubmissionError::NetworkMismatch {
                blob: NetworkId::Testnet,
                client: NetworkId::Mainnet,
            }
        );
    }

    // Minimal executor so the network-mismatch path (which never touches
    // the wire) can run without a tokio runtime dependency in unit tests.
    fn tokio_test_block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime")
            .block_on(fut)
    }

    #[test]
    fn signed_blob_normalizes_hex_case() {
        let blob = SignedBlob::from_hex("12ab", NetworkId::Mainnet);
        assert_eq!(blob.as_hex(), "12AB");
    }
}
