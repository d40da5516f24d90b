//! Service configuration from the environment

use crate::wallet::RpcConfig;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 120;
const DEFAULT_RECEIPT_POLL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// JSON-RPC endpoint of the Cronos node
    pub rpc_url: String,
    pub confirm_timeout: Duration,
    pub receipt_poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            confirm_timeout: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
            receipt_poll_interval: Duration::from_millis(DEFAULT_RECEIPT_POLL_MS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or unparsable values use defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parsed(&lookup, "CHARITY_AGENT_PORT", DEFAULT_PORT),
            rpc_url: lookup("CRONOS_RPC_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            confirm_timeout: Duration::from_secs(parsed(
                &lookup,
                "CHARITY_CONFIRM_TIMEOUT_SECS",
                DEFAULT_CONFIRM_TIMEOUT_SECS,
            )),
            receipt_poll_interval: Duration::from_millis(parsed_nonzero(
                &lookup,
                "CHARITY_RECEIPT_POLL_MS",
                DEFAULT_RECEIPT_POLL_MS,
            )),
        }
    }

    pub fn rpc(&self) -> RpcConfig {
        RpcConfig {
            url: self.rpc_url.clone(),
            confirm_timeout: self.confirm_timeout,
            poll_interval: self.receipt_poll_interval,
        }
    }
}

fn parsed<T: FromStr + Copy>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, "Invalid configuration value, using default");
            default
        }
    }
}

/// Like [`parsed`], but zero also falls back to the default
fn parsed_nonzero(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    match parsed(lookup, key, default) {
        0 => {
            tracing::warn!(key, value = 0, "Invalid configuration value, using default");
            default
        }
        value => value,
    }
}
