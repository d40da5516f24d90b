//! JSON-RPC wallet adapter
//!
//! Talks to an EVM-compatible node (Cronos or a local dev chain) that holds
//! unlocked accounts, so signing happens node-side via `eth_sendTransaction`.

use super::{AccountId, Receipt, TxHandle, WalletBridge, WalletError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Wei per CRO (18 decimals)
const WEI_PER_CRO: u64 = 1_000_000_000_000_000_000;

/// EIP-1193 "user rejected request"
const USER_REJECTED: i64 = 4001;

/// Connection settings for the node
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    /// Upper bound on waiting for a receipt
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Failure of a single RPC call, before it is classified for the caller
#[derive(Debug, thiserror::Error)]
enum RpcError {
    #[error("node unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message} (code {code})")]
    Node { code: i64, message: String },
    #[error("unexpected node response: {0}")]
    Malformed(String),
}

impl RpcError {
    fn is_user_rejection(&self) -> bool {
        matches!(self, RpcError::Node { code, .. } if *code == USER_REJECTED)
    }
}

/// Production wallet backed by a node's JSON-RPC endpoint
pub struct JsonRpcWallet {
    client: reqwest::Client,
    config: RpcConfig,
    account: Mutex<Option<AccountId>>,
    next_id: AtomicU64,
}

impl JsonRpcWallet {
    pub fn new(config: RpcConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            account: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        tracing::debug!(method, id = request.id, "RPC request");

        let response: RpcResponse = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(RpcError::Node {
                code: err.code,
                message: err.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn poll_receipt(&self, handle: &TxHandle) -> Result<Receipt, WalletError> {
        loop {
            let receipt = self
                .call("eth_getTransactionReceipt", json!([handle.hash]))
                .await
                .map_err(|e| WalletError::verification(e.to_string()))?;
            if !receipt.is_null() {
                return parse_receipt(&receipt).map_err(|e| WalletError::verification(e.to_string()));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

#[async_trait]
impl WalletBridge for JsonRpcWallet {
    async fn connect(&self) -> Result<AccountId, WalletError> {
        let accounts = self.call("eth_accounts", json!([])).await.map_err(|e| {
            if e.is_user_rejection() {
                WalletError::connection("You rejected the connection request.")
            } else {
                WalletError::connection(e.to_string())
            }
        })?;
        let accounts: Vec<String> = serde_json::from_value(accounts)
            .map_err(|e| WalletError::connection(format!("unexpected account list: {e}")))?;

        let account = accounts
            .into_iter()
            .next()
            .map(AccountId::new)
            .ok_or_else(|| WalletError::connection("No accounts returned. Please unlock your wallet."))?;

        match self.call("eth_chainId", json!([])).await {
            Ok(chain_id) => tracing::info!(%chain_id, "Connected to chain"),
            Err(e) => tracing::warn!(error = %e, "Could not read chain id"),
        }

        *self.account.lock().unwrap_or_else(PoisonError::into_inner) = Some(account.clone());
        Ok(account)
    }

    async fn send(
        &self,
        destination: &AccountId,
        amount: Decimal,
    ) -> Result<TxHandle, WalletError> {
        let from = self
            .connected_account()
            .ok_or_else(|| WalletError::transaction("Wallet not connected"))?;
        let wei = to_wei(amount)?;

        let params = json!([{
            "from": from,
            "to": destination,
            "value": format!("{wei:#x}"),
        }]);
        let hash = self
            .call("eth_sendTransaction", params)
            .await
            .map_err(|e| {
                if e.is_user_rejection() {
                    WalletError::transaction("You rejected the transaction.")
                } else {
                    WalletError::transaction(e.to_string())
                }
            })?;

        hash.as_str()
            .map(TxHandle::new)
            .ok_or_else(|| WalletError::transaction("Node returned no transaction hash"))
    }

    async fn confirm(&self, handle: &TxHandle) -> Result<Receipt, WalletError> {
        tokio::time::timeout(self.config.confirm_timeout, self.poll_receipt(handle))
            .await
            .map_err(|_| {
                WalletError::verification(format!(
                    "Timed out after {}s waiting for {}",
                    self.config.confirm_timeout.as_secs(),
                    handle.hash
                ))
            })?
    }

    fn connected_account(&self) -> Option<AccountId> {
        self.account
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Convert a CRO amount to wei, rejecting sub-wei precision
pub fn to_wei(amount: Decimal) -> Result<u128, WalletError> {
    if amount.is_sign_negative() {
        return Err(WalletError::transaction("Amount must not be negative"));
    }
    let wei = amount
        .checked_mul(Decimal::from(WEI_PER_CRO))
        .ok_or_else(|| WalletError::transaction("Amount too large"))?;
    let wei = wei.normalize();
    if wei.scale() != 0 {
        return Err(WalletError::transaction(
            "Amount has more than 18 decimal places",
        ));
    }
    u128::try_from(wei.mantissa()).map_err(|_| WalletError::transaction("Amount too large"))
}

fn parse_hex_u64(value: &str) -> Option<u64> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16).ok()
}

fn parse_receipt(value: &Value) -> Result<Receipt, RpcError> {
    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::Malformed("receipt has no status".to_string()))?;
    let success = parse_hex_u64(status)
        .ok_or_else(|| RpcError::Malformed(format!("bad receipt status {status}")))?
        == 1;
    let block_number = value
        .get("blockNumber")
        .and_then(Value::as_str)
        .and_then(parse_hex_u64);

    Ok(Receipt {
        success,
        block_number,
    })
}
