//! Solana Provider Module
//!
//! Abstraction layer over the Solana RPC client for the read-only lookups the
//! monitor needs: the signature history of an address, batched signature
//! statuses, and full transaction bodies at a chosen commitment level.
//!
//! The provider uses the non-blocking `RpcClient` for asynchronous operations
//! and integrates detailed error handling through `SolanaProviderError`.

use std::{str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Url;
use serde::Serialize;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::RpcTransactionConfig,
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature};
use solana_transaction_status::UiTransactionEncoding;
use thiserror::Error;

use crate::{
    constants::SIGNATURE_STATUS_BATCH_SIZE,
    models::{RpcConfig, SignatureStatusRecord, TransactionDetails},
    services::provider::{retry_rpc_call, ProviderError, RetryConfig, RpcSelector, RpcSelectorError},
};

/// Utility function to match error patterns by normalizing both strings.
/// Removes spaces and lowercases so "TransactionNotFound" matches
/// "transaction not found".
fn matches_error_pattern(error_msg: &str, pattern: &str) -> bool {
    let normalized_msg = error_msg.to_lowercase().replace(' ', "");
    let normalized_pattern = pattern.to_lowercase().replace(' ', "");
    normalized_msg.contains(&normalized_pattern)
}

/// Errors that can occur when interacting with the Solana provider.
///
/// Use `is_transient()` to determine if an error should be retried.
#[derive(Error, Debug, Serialize)]
pub enum SolanaProviderError {
    /// Network/IO error (transient - connection issues, timeouts)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// RPC protocol error (transient - node lag, sync pending)
    #[error("RPC error: {0}")]
    RpcError(String),

    /// HTTP request error with status code (transient/permanent based on code)
    #[error("Request error (HTTP {status_code}): {error}")]
    RequestError { error: String, status_code: u16 },

    /// Invalid address format (permanent)
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Signature that cannot be looked up directly (permanent)
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// RPC selector error (transient - can retry with different node)
    #[error("RPC selector error: {0}")]
    SelectorError(#[from] RpcSelectorError),

    /// Network configuration error (permanent - missing data, unsupported operations)
    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),
}

impl SolanaProviderError {
    /// Determines if this error is transient (can retry) or permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            SolanaProviderError::NetworkError(_) => true,
            SolanaProviderError::RpcError(_) => true,
            SolanaProviderError::SelectorError(_) => true,

            // HTTP errors: retriable only for temporary server-side or
            // rate-limit status codes.
            SolanaProviderError::RequestError { status_code, .. } => match *status_code {
                501 | 505 => false,
                500 | 502..=504 | 506..=599 => true,
                408 | 425 | 429 => true,
                400..=499 => false,
                _ => false,
            },

            SolanaProviderError::InvalidAddress(_) => false,
            SolanaProviderError::TransactionNotFound(_) => false,
            SolanaProviderError::NetworkConfiguration(_) => false,
        }
    }

    /// Classifies a Solana RPC client error into the appropriate variant.
    ///
    /// Uses Solana JSON-RPC error codes where present: `-32004`, `-32005`,
    /// `-32014` and `-32016` indicate temporary node state (transient), while
    /// `-32007`, `-32010` and `-32602` indicate permanent configuration or
    /// request problems.
    pub fn from_rpc_error(error: ClientError) -> Self {
        match error.kind() {
            ClientErrorKind::Io(_) => SolanaProviderError::NetworkError(error.to_string()),

            ClientErrorKind::Reqwest(reqwest_err) => {
                if let Some(status) = reqwest_err.status() {
                    SolanaProviderError::RequestError {
                        error: error.to_string(),
                        status_code: status.as_u16(),
                    }
                } else {
                    // No status code (connection error, timeout)
                    SolanaProviderError::NetworkError(error.to_string())
                }
            }

            ClientErrorKind::RpcError(rpc_err) => {
                Self::from_rpc_response_error(&format!("{rpc_err}"), &error)
            }

            ClientErrorKind::Custom(msg) => Self::from_rpc_response_error(msg, &error),

            _ => SolanaProviderError::RpcError(error.to_string()),
        }
    }

    fn from_rpc_response_error(rpc_err: &str, full_error: &ClientError) -> Self {
        const PERMANENT_CODES: [&str; 3] = ["-32007", "-32010", "-32602"];

        if PERMANENT_CODES.iter().any(|code| rpc_err.contains(code)) {
            SolanaProviderError::NetworkConfiguration(full_error.to_string())
        } else {
            // Transient codes (-32004, -32005, -32014, -32016) and anything
            // unrecognized default to a retriable RPC error.
            SolanaProviderError::RpcError(full_error.to_string())
        }
    }
}

impl From<String> for SolanaProviderError {
    fn from(s: String) -> Self {
        SolanaProviderError::RpcError(s)
    }
}

/// Determines if an error should mark the current RPC endpoint as failed,
/// triggering failover to another endpoint.
fn should_mark_solana_provider_failed(error: &SolanaProviderError) -> bool {
    match error {
        SolanaProviderError::RequestError { status_code, .. } => matches!(
            *status_code,
            500..=599 | 401 | 403 | 404 | 410
        ),
        SolanaProviderError::NetworkError(_) => true,
        _ => false,
    }
}

/// A trait that abstracts the Solana lookups used by the monitor.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SolanaProviderTrait: Send + Sync {
    /// Retrieves the recent transaction signatures for the given address.
    async fn get_signatures_for_address(
        &self,
        address: &str,
    ) -> Result<Vec<Signature>, SolanaProviderError>;

    /// Batched lightweight status lookup, searching the full transaction
    /// history. Entries are `None` for signatures the index does not know.
    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> Result<Vec<Option<SignatureStatusRecord>>, SolanaProviderError>;

    /// Fetches the full transaction body at the given commitment level and
    /// normalizes it. Returns `Ok(None)` when the transaction is not found at
    /// that commitment.
    async fn get_transaction_details(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<TransactionDetails>, SolanaProviderError>;
}

#[derive(Debug)]
pub struct SolanaProvider {
    // Endpoint selection with failover
    selector: RpcSelector,
    // Per-request timeout
    timeout: Duration,
    // Default commitment level for the client
    commitment: CommitmentConfig,
    // Retry budget for transient failures
    retry_config: RetryConfig,
}

impl SolanaProvider {
    pub fn new(configs: Vec<RpcConfig>, timeout_seconds: u64) -> Result<Self, ProviderError> {
        Self::new_with_commitment(configs, timeout_seconds, CommitmentConfig::confirmed())
    }

    /// Creates a provider over the given endpoints with a custom default
    /// commitment level.
    pub fn new_with_commitment(
        configs: Vec<RpcConfig>,
        timeout_seconds: u64,
        commitment: CommitmentConfig,
    ) -> Result<Self, ProviderError> {
        if configs.is_empty() {
            return Err(ProviderError::NetworkConfiguration(
                "At least one RPC configuration must be provided".to_string(),
            ));
        }

        RpcConfig::validate_list(&configs)
            .map_err(|e| ProviderError::NetworkConfiguration(format!("Invalid URL: {e}")))?;

        let selector = RpcSelector::new_with_defaults(configs).map_err(|e| {
            ProviderError::NetworkConfiguration(format!("Failed to create RPC selector: {e}"))
        })?;

        Ok(Self {
            selector,
            timeout: Duration::from_secs(timeout_seconds),
            commitment,
            retry_config: RetryConfig::from_env(),
        })
    }

    /// Initializes an RPC client for the given endpoint URL.
    fn initialize_client(&self, url: &str) -> Result<Arc<RpcClient>, SolanaProviderError> {
        let rpc_url: Url = url.parse().map_err(|e| {
            SolanaProviderError::NetworkConfiguration(format!("Invalid URL format: {e}"))
        })?;

        Ok(Arc::new(RpcClient::new_with_timeout_and_commitment(
            rpc_url.to_string(),
            self.timeout,
            self.commitment,
        )))
    }

    /// Retry helper for Solana RPC calls.
    async fn retry_rpc_call<T, F, Fut>(
        &self,
        operation_name: &str,
        operation: F,
    ) -> Result<T, SolanaProviderError>
    where
        F: Fn(Arc<RpcClient>) -> Fut,
        Fut: std::future::Future<Output = Result<T, SolanaProviderError>>,
    {
        retry_rpc_call(
            &self.selector,
            operation_name,
            |e: &SolanaProviderError| e.is_transient(),
            should_mark_solana_provider_failed,
            |url| self.initialize_client(url),
            operation,
            &self.retry_config,
        )
        .await
    }
}

#[async_trait]
impl SolanaProviderTrait for SolanaProvider {
    /// Retrieves the signature history for the given address.
    ///
    /// # Errors
    ///
    /// Returns `SolanaProviderError::InvalidAddress` if address parsing fails,
    /// and a classified provider error if the RPC call fails.
    async fn get_signatures_for_address(
        &self,
        address: &str,
    ) -> Result<Vec<Signature>, SolanaProviderError> {
        let pubkey = Pubkey::from_str(address)
            .map_err(|e| SolanaProviderError::InvalidAddress(e.to_string()))?;

        let history = self
            .retry_rpc_call("get_signatures_for_address", |client| async move {
                client
                    .get_signatures_for_address(&pubkey)
                    .await
                    .map_err(SolanaProviderError::from_rpc_error)
            })
            .await?;

        history
            .into_iter()
            .map(|entry| {
                Signature::from_str(&entry.signature).map_err(|e| {
                    SolanaProviderError::RpcError(format!(
                        "malformed signature in address history: {e}"
                    ))
                })
            })
            .collect()
    }

    /// Batched status lookup with history search, chunked at the RPC limit.
    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> Result<Vec<Option<SignatureStatusRecord>>, SolanaProviderError> {
        let mut records = Vec::with_capacity(signatures.len());

        for chunk in signatures.chunks(SIGNATURE_STATUS_BATCH_SIZE) {
            let owned: Vec<Signature> = chunk.to_vec();
            let response = self
                .retry_rpc_call("get_signature_statuses", move |client| {
                    let sigs = owned.clone();
                    async move {
                        client
                            .get_signature_statuses_with_history(&sigs)
                            .await
                            .map_err(SolanaProviderError::from_rpc_error)
                    }
                })
                .await?;

            records.extend(
                response
                    .value
                    .into_iter()
                    .map(|status| status.map(SignatureStatusRecord::from)),
            );
        }

        Ok(records)
    }

    /// Fetches a transaction body at the given commitment level.
    ///
    /// "Not found" responses surface as `Ok(None)` so callers can fall back to
    /// a lower commitment level without retry churn.
    async fn get_transaction_details(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<TransactionDetails>, SolanaProviderError> {
        let signature = *signature;
        let result = self
            .retry_rpc_call("get_transaction", move |client| async move {
                let config = RpcTransactionConfig {
                    encoding: Some(UiTransactionEncoding::Json),
                    commitment: Some(commitment),
                    max_supported_transaction_version: Some(0),
                };
                client
                    .get_transaction_with_config(&signature, config)
                    .await
                    .map_err(|e| {
                        let message = e.to_string();
                        if matches_error_pattern(&message, "not found")
                            || matches_error_pattern(&message, "invalid type: null")
                        {
                            SolanaProviderError::TransactionNotFound(message)
                        } else {
                            SolanaProviderError::from_rpc_error(e)
                        }
                    })
            })
            .await;

        match result {
            Ok(tx) => Ok(TransactionDetails::from_encoded(tx)),
            Err(SolanaProviderError::TransactionNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
