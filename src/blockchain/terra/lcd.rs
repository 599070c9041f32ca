//! Cosmos SDK LCD (REST) transport.

use base64::Engine as _;
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::errors::{ClientError, Result};

/// Upper bound on followed `next_key` pages when listing balances.
const MAX_BALANCE_PAGES: usize = 50;

/// gRPC `NOT_FOUND`.
const GRPC_NOT_FOUND: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LcdCoin {
    pub denom: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxBody {
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxEnvelope {
    #[serde(default)]
    pub body: TxBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxResponse {
    #[serde(default)]
    pub height: String,
    pub txhash: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub gas_wanted: String,
    #[serde(default)]
    pub gas_used: String,
}

/// Body of `GET /cosmos/tx/v1beta1/txs/{hash}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetTxResponse {
    pub tx: TxEnvelope,
    pub tx_response: TxResponse,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageResponse {
    pub next_key: Option<String>,
    pub total: Option<String>,
}

/// Body of `GET /cosmos/tx/v1beta1/txs?events=...`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchTxsResponse {
    #[serde(default)]
    pub txs: Vec<TxEnvelope>,
    #[serde(default)]
    pub tx_responses: Vec<TxResponse>,
    pub pagination: Option<PageResponse>,
    /// Newer SDKs report the total at the top level.
    pub total: Option<String>,
}

impl SearchTxsResponse {
    pub fn total(&self) -> u64 {
        self.pagination
            .as_ref()
            .and_then(|p| p.total.as_deref())
            .or(self.total.as_deref())
            .and_then(|t| t.parse().ok())
            .unwrap_or(self.tx_responses.len() as u64)
    }

    /// Pairs each tx with its response, in response order.
    pub fn into_pairs(self) -> Vec<GetTxResponse> {
        self.txs
            .into_iter()
            .zip(self.tx_responses)
            .map(|(tx, tx_response)| GetTxResponse { tx, tx_response })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    #[serde(default)]
    balances: Vec<LcdCoin>,
    pagination: Option<PageResponse>,
}

#[derive(Debug, Deserialize)]
struct GasInfo {
    gas_used: String,
}

#[derive(Debug, Deserialize)]
struct SimulateResponse {
    gas_info: GasInfo,
}

#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    tx_response: TxResponse,
}

/// Account number and sequence needed for signing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub account_number: u64,
    pub sequence: u64,
}

/// Thin REST client bound to one LCD endpoint.
#[derive(Debug, Clone)]
pub struct LcdClient {
    base_url: String,
    http: HttpClient,
}

impl LcdClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| {
            ClientError::Config(format!("Invalid LCD URL '{}': {}", base_url, e))
        })?;
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "LCD GET");
        let resp = self.http.get(&url).query(query).send().await?;
        Self::read_json(resp).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "LCD POST");
        let resp = self.http.post(&url).json(body).send().await?;
        Self::read_json(resp).await
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Lcd {
                status: status.as_u16(),
                code: error_code(&text),
                message: error_message(&text),
            });
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(format!("{}: {}", e, text)))
    }

    pub async fn get_tx(&self, hash: &str) -> Result<GetTxResponse> {
        self.get_json(&format!("/cosmos/tx/v1beta1/txs/{}", hash), &[])
            .await
            .map_err(|e| match e {
                ClientError::Lcd { status, code, message } if is_not_found(status, code, &message) => {
                    ClientError::TxNotFound(hash.to_string())
                }
                other => other,
            })
    }

    /// Searches txs matching one event, newest first.
    pub async fn search_txs(&self, event: &str, offset: u32, limit: u32) -> Result<SearchTxsResponse> {
        let query = [
            ("events", event.to_string()),
            ("pagination.offset", offset.to_string()),
            ("pagination.limit", limit.to_string()),
            ("pagination.count_total", "true".to_string()),
            ("order_by", "ORDER_BY_DESC".to_string()),
        ];
        self.get_json("/cosmos/tx/v1beta1/txs", &query).await
    }

    pub async fn get_balances(&self, address: &str) -> Result<Vec<LcdCoin>> {
        let path = format!("/cosmos/bank/v1beta1/balances/{}", address);
        let mut coins = Vec::new();
        let mut next_key: Option<String> = None;
        for _ in 0..MAX_BALANCE_PAGES {
            let query: Vec<(&str, String)> =
                next_key.iter().map(|k| ("pagination.key", k.clone())).collect();
            let page: BalancesResponse = self.get_json(&path, &query).await?;
            coins.extend(page.balances);
            next_key = page.pagination.and_then(|p| p.next_key).filter(|k| !k.is_empty());
            if next_key.is_none() {
                return Ok(coins);
            }
        }
        warn!(address, "Balance pagination truncated after {} pages", MAX_BALANCE_PAGES);
        Ok(coins)
    }

    /// `None` when the chain has never seen the account.
    pub async fn get_account(&self, address: &str) -> Result<Option<AccountInfo>> {
        let path = format!("/cosmos/auth/v1beta1/accounts/{}", address);
        let body: Value = match self.get_json(&path, &[]).await {
            Ok(v) => v,
            Err(ClientError::Lcd { status, code, message }) if is_not_found(status, code, &message) => {
                debug!(address, "Account not found on chain");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let account = body
            .get("account")
            .and_then(find_base_account)
            .ok_or_else(|| ClientError::Decode(format!("no account_number in {}", body)))?;
        Ok(Some(AccountInfo {
            account_number: parse_u64(&account["account_number"], "account_number")?,
            sequence: parse_u64(&account["sequence"], "sequence")?,
        }))
    }

    /// Returns the gas used by a dry run of `tx_bytes`.
    pub async fn simulate(&self, tx_bytes: &[u8]) -> Result<u64> {
        let body = json!({ "tx_bytes": base64::engine::general_purpose::STANDARD.encode(tx_bytes) });
        let resp: SimulateResponse = self.post_json("/cosmos/tx/v1beta1/simulate", &body).await?;
        resp.gas_info
            .gas_used
            .parse()
            .map_err(|_| ClientError::Decode(format!("gas_used '{}'", resp.gas_info.gas_used)))
    }

    /// Broadcasts in sync mode and returns the tx hash reported by the node.
    pub async fn broadcast(&self, tx_bytes: &[u8]) -> Result<String> {
        let body = json!({
            "tx_bytes": base64::engine::general_purpose::STANDARD.encode(tx_bytes),
            "mode": "BROADCAST_MODE_SYNC",
        });
        let resp: BroadcastResponse = self.post_json("/cosmos/tx/v1beta1/txs", &body).await?;
        let tx = resp.tx_response;
        if tx.code != 0 {
            warn!(code = tx.code, log = %tx.raw_log, "Transaction rejected");
            return Err(ClientError::Broadcast { code: tx.code, log: tx.raw_log });
        }
        info!(tx_hash = %tx.txhash, "Transaction broadcast");
        Ok(tx.txhash)
    }

    /// Fetches an FCD gas price table (`{"uluna": "0.01133", ...}`).
    pub async fn get_gas_prices(&self, url: &str) -> Result<BTreeMap<String, String>> {
        debug!(url, "Fetching gas prices");
        let resp = self.http.get(url).send().await?;
        Self::read_json(resp).await
    }
}

fn is_not_found(status: u16, code: Option<u64>, message: &str) -> bool {
    status == 404 || code == Some(GRPC_NOT_FOUND) || message.to_ascii_lowercase().contains("not found")
}

/// gRPC status code of a `{code, message}` error body.
fn error_code(text: &str) -> Option<u64> {
    serde_json::from_str::<Value>(text)
        .ok()?
        .get("code")
        .and_then(|c| c.as_u64().or_else(|| c.as_str().and_then(|s| s.parse().ok())))
}

/// Extracts a readable message from `{code, message}` or `{error}` bodies.
fn error_message(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(v) => v
            .get("message")
            .or_else(|| v.get("error"))
            .and_then(|m| m.as_str())
            .map(|m| match v.get("code").and_then(|c| c.as_u64()) {
                Some(code) => format!("{} (code {})", m, code),
                None => m.to_string(),
            })
            .unwrap_or_else(|| text.to_string()),
        Err(_) => text.to_string(),
    }
}

/// Finds the object carrying `account_number`, unwrapping vesting account layers.
fn find_base_account(value: &Value) -> Option<&Value> {
    let obj = value.as_object()?;
    if obj.contains_key("account_number") {
        return Some(value);
    }
    obj.values().filter(|v| v.is_object()).find_map(find_base_account)
}

fn parse_u64(value: &Value, field: &str) -> Result<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        Value::Null => Some(0),
        _ => None,
    }
    .ok_or_else(|| ClientError::Decode(format!("{} is not an integer: {}", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"code":5,"message":"tx not found: ABC","details":[]}"#),
            "tx not found: ABC (code 5)"
        );
        assert_eq!(error_message(r#"{"error":"bad"}"#), "bad");
        assert_eq!(error_message("plain text"), "plain text");
    }

    #[test]
    fn test_grpc_not_found_code() {
        let body = r#"{"code":5,"message":"tx 0xABC unavailable","details":[]}"#;
        assert_eq!(error_code(body), Some(5));
        assert!(is_not_found(400, error_code(body), &error_message(body)));
        assert_eq!(error_code(r#"{"code":"5","message":"x"}"#), Some(5));
        assert_eq!(error_code("plain text"), None);
        assert!(!is_not_found(500, Some(2), "internal"));
    }

    #[test]
    fn test_find_base_account_in_vesting_wrapper() {
        let body = json!({
            "@type": "/cosmos.vesting.v1beta1.ContinuousVestingAccount",
            "base_vesting_account": {
                "base_account": { "address": "terra1x", "account_number": "42", "sequence": "7" }
            }
        });
        let acc = find_base_account(&body).unwrap();
        assert_eq!(parse_u64(&acc["account_number"], "account_number").unwrap(), 42);
        assert_eq!(parse_u64(&acc["sequence"], "sequence").unwrap(), 7);
    }

    #[test]
    fn test_search_total_fallbacks() {
        let resp: SearchTxsResponse =
            serde_json::from_value(json!({ "txs": [], "tx_responses": [], "total": "12" })).unwrap();
        assert_eq!(resp.total(), 12);

        let resp: SearchTxsResponse = serde_json::from_value(json!({
            "txs": [], "tx_responses": [], "pagination": { "next_key": null, "total": "3" }
        }))
        .unwrap();
        assert_eq!(resp.total(), 3);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(LcdClient::new("not a url", Duration::from_secs(1)).is_err());
        let lcd = LcdClient::new("http://localhost:1317/", Duration::from_secs(1)).unwrap();
        assert_eq!(lcd.base_url(), "http://localhost:1317");
    }

    #[tokio::test]
    async fn test_unreachable_lcd_is_network_error() {
        let lcd = LcdClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = lcd.get_tx("ABC").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)), "unexpected: {:?}", err);
    }
}
