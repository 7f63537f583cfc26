//! Network provider abstractions.
//!
//! Providers wrap the RPC client behind a trait so the domain pipeline can be
//! exercised against mocks, and add endpoint failover plus retry with
//! exponential backoff for transient failures.

use std::{env, future::Future, time::Duration};

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

mod solana;
pub use solana::*;

pub mod rpc_selector;
pub use rpc_selector::{RpcSelector, RpcSelectorError};

use crate::constants::{DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_ATTEMPTS};

#[derive(Error, Debug, Serialize)]
pub enum ProviderError {
    #[error("RPC client error: {0}")]
    SolanaRpcError(#[from] SolanaProviderError),
    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),
}

/// Retry budget for provider calls.
///
/// Read from `RPC_RETRY_MAX_ATTEMPTS` and `RPC_RETRY_BASE_DELAY_MS`; the delay
/// doubles on each attempt.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl RetryConfig {
    pub fn from_env() -> Self {
        let max_attempts = env::var("RPC_RETRY_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS);
        let base_delay_ms = env::var("RPC_RETRY_BASE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS);
        Self {
            max_attempts,
            base_delay_ms,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

/// Runs an RPC operation against endpoints chosen by the selector.
///
/// Transient errors are retried up to the configured attempt budget with
/// exponential backoff; errors flagged by `should_mark_failed` additionally
/// pause the endpoint so subsequent attempts fail over to another one.
/// Permanent errors are returned immediately.
pub async fn retry_rpc_call<T, E, C, F, Fut>(
    selector: &RpcSelector,
    operation_name: &str,
    is_retriable: impl Fn(&E) -> bool,
    should_mark_failed: impl Fn(&E) -> bool,
    init_client: impl Fn(&str) -> Result<C, E>,
    operation: F,
    config: &RetryConfig,
) -> Result<T, E>
where
    E: std::fmt::Display + From<RpcSelectorError>,
    F: Fn(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut last_error: Option<E> = None;

    for attempt in 0..config.max_attempts {
        if attempt > 0 {
            let delay = config.base_delay_ms.saturating_mul(1u64 << (attempt - 1));
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let url = match selector.select_url() {
            Ok(url) => url,
            Err(e) => {
                warn!("no RPC endpoint available for '{operation_name}': {e}");
                last_error = Some(E::from(e));
                break;
            }
        };

        let client = match init_client(&url) {
            Ok(client) => client,
            Err(e) => {
                warn!("client initialization failed for {url}: {e}");
                selector.mark_failed(&url);
                last_error = Some(e);
                continue;
            }
        };

        match operation(client).await {
            Ok(value) => {
                debug!(
                    "RPC operation '{}' succeeded on attempt {}",
                    operation_name,
                    attempt + 1
                );
                selector.mark_succeeded(&url);
                return Ok(value);
            }
            Err(e) => {
                warn!("RPC operation '{operation_name}' failed against {url}: {e}");
                if should_mark_failed(&e) {
                    selector.mark_failed(&url);
                }
                if !is_retriable(&e) {
                    return Err(e);
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| E::from(RpcSelectorError::AllProvidersFailed)))
}
