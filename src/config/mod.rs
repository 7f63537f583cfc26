//! Configuration loaded from environment variables.
//!
//! Supported variables:
//! - `RPC_URLS`: comma-separated list of Solana RPC endpoint URLs. Defaults
//!   to the public mainnet-beta endpoint when unset.
//! - `RPC_TIMEOUT_MS`: per-request timeout in milliseconds.
//! - `RPC_RETRY_MAX_ATTEMPTS` / `RPC_RETRY_BASE_DELAY_MS`: retry budget,
//!   read by the provider layer.
use std::env;

use crate::{
    constants::{DEFAULT_RPC_TIMEOUT_MS, DEFAULT_RPC_URL},
    models::RpcConfig,
};

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub rpc_urls: Vec<RpcConfig>,
    pub rpc_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            rpc_urls: vec![RpcConfig::new(DEFAULT_RPC_URL.to_string())],
            rpc_timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
        }
    }
}

impl MonitorConfig {
    /// Loads configuration from the environment, reading a `.env` file first
    /// if one is present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let rpc_urls = env::var("RPC_URLS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(|url| RpcConfig::new(url.to_string()))
                    .collect::<Vec<_>>()
            })
            .ok()
            .filter(|urls| !urls.is_empty())
            .unwrap_or_else(|| vec![RpcConfig::new(DEFAULT_RPC_URL.to_string())]);

        let rpc_timeout_ms = env::var("RPC_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RPC_TIMEOUT_MS);

        Self {
            rpc_urls,
            rpc_timeout_ms,
        }
    }

    /// Timeout expressed in whole seconds, never below one second.
    pub fn timeout_seconds(&self) -> u64 {
        (self.rpc_timeout_ms / 1000).max(1)
    }
}
