//! Wallet transaction monitoring pipeline.
//!
//! Given a wallet address, the monitor fetches its signature history, resolves
//! each signature to a transaction state (batched status lookup first, direct
//! per-transaction lookups for anything the status index does not know),
//! determines which transactions the wallet initiated, and aggregates the
//! result into counters and a health status.
//!
//! Record timestamps come from the transaction's block time when a body was
//! fetched; otherwise a resolved record is stamped with the current time and
//! an unlanded one with zero.

mod classifier;
mod direction;
mod fallback;
mod metrics;

pub use classifier::{classify_status, Classification};
pub use direction::is_user_initiated;
pub use fallback::{resolve_unknown, FallbackResolution};
pub use metrics::{calculate_metrics, derive_status, CountingPolicy};

use std::{collections::HashMap, str::FromStr, sync::Arc};

use chrono::Utc;
use futures::future::join_all;
use log::{debug, warn};
use serde::Serialize;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature};
use thiserror::Error;

use crate::{
    models::{TransactionDetails, TransactionRecord, TransactionState, WalletReport},
    services::provider::{SolanaProviderError, SolanaProviderTrait},
};

#[derive(Error, Debug, Serialize)]
pub enum MonitorError {
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Failed to fetch transaction history: {0}")]
    SignatureLookup(#[from] SolanaProviderError),
}

/// Classifies and aggregates the transaction history of a wallet.
pub struct TransactionMonitor<P: SolanaProviderTrait> {
    provider: Arc<P>,
}

impl<P: SolanaProviderTrait> TransactionMonitor<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Produces the full health report for a wallet: per-signature records,
    /// counters over the wallet's own transactions, and the derived status.
    ///
    /// Only the initial history fetch can fail; every later lookup degrades
    /// per signature instead of aborting the report.
    pub async fn wallet_report(&self, address: &str) -> Result<WalletReport, MonitorError> {
        let pubkey = Pubkey::from_str(address)
            .map_err(|e| MonitorError::InvalidAddress(format!("{address}: {e}")))?;
        let address = pubkey.to_string();

        let signatures = self.provider.get_signatures_for_address(&address).await?;
        debug!(
            "Fetched {} signatures for wallet {}",
            signatures.len(),
            address
        );

        let records = self.classify_signatures(&signatures, Some(&address)).await;
        let metrics = calculate_metrics(&records, CountingPolicy::UserInitiatedOnly);
        let status = derive_status(&metrics);

        Ok(WalletReport {
            records,
            metrics,
            status,
        })
    }

    /// Resolves each signature to a transaction record.
    ///
    /// When an address is supplied, transaction bodies are fetched so records
    /// carry a direction; without one, every record is marked as not
    /// user-initiated. A failed batched status lookup degrades to direct
    /// lookups for every signature rather than failing the set.
    pub async fn classify_signatures(
        &self,
        signatures: &[Signature],
        address: Option<&str>,
    ) -> Vec<TransactionRecord> {
        if signatures.is_empty() {
            return Vec::new();
        }

        let statuses = match self.provider.get_signature_statuses(signatures).await {
            Ok(statuses) => statuses,
            Err(e) => {
                warn!("Batched status lookup failed, resolving each signature directly: {e}");
                vec![None; signatures.len()]
            }
        };

        let mut resolved: Vec<Option<(TransactionState, Option<String>)>> =
            Vec::with_capacity(signatures.len());
        let mut unresolved_indices = Vec::new();
        let mut unresolved_sigs = Vec::new();

        for (index, status) in statuses.iter().enumerate() {
            match classify_status(status.as_ref()) {
                Classification::Resolved { state, error } => resolved.push(Some((state, error))),
                Classification::Unresolved => {
                    resolved.push(None);
                    unresolved_indices.push(index);
                    unresolved_sigs.push(signatures[index]);
                }
            }
        }

        let fallback: HashMap<usize, FallbackResolution> = unresolved_indices
            .iter()
            .copied()
            .zip(resolve_unknown(self.provider.as_ref(), &unresolved_sigs).await)
            .collect();

        // Transaction bodies for direction. Fallback lookups already carry
        // theirs; fast-path entries need one fetch each.
        let mut details_by_index: HashMap<usize, TransactionDetails> = fallback
            .iter()
            .filter_map(|(index, resolution)| {
                resolution.details.clone().map(|details| (*index, details))
            })
            .collect();

        if address.is_some() {
            let fast_indices: Vec<usize> = (0..signatures.len())
                .filter(|index| resolved[*index].is_some())
                .collect();
            let fetched = join_all(fast_indices.iter().map(|&index| async move {
                self.provider
                    .get_transaction_details(&signatures[index], CommitmentConfig::confirmed())
                    .await
                    .ok()
                    .flatten()
            }))
            .await;
            for (index, details) in fast_indices.into_iter().zip(fetched) {
                if let Some(details) = details {
                    details_by_index.insert(index, details);
                }
            }
        }

        signatures
            .iter()
            .enumerate()
            .map(|(index, signature)| {
                let (state, error) = match resolved[index].clone() {
                    Some((state, error)) => (state, error),
                    None => {
                        let state = fallback
                            .get(&index)
                            .map(|resolution| resolution.state)
                            .unwrap_or(TransactionState::Submitted);
                        (state, None)
                    }
                };

                let details = details_by_index.get(&index);
                let timestamp = match details.and_then(|d| d.block_time) {
                    Some(block_time) => block_time * 1000,
                    None if state == TransactionState::Submitted => 0,
                    None => Utc::now().timestamp_millis(),
                };
                let is_user_initiated = match (address, details) {
                    (Some(addr), Some(details)) => is_user_initiated(details, addr),
                    _ => false,
                };

                TransactionRecord {
                    signature: signature.to_string(),
                    state,
                    timestamp,
                    error,
                    is_user_initiated,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{ConfirmationTier, SignatureStatusRecord, WalletStatus},
        services::provider::MockSolanaProviderTrait,
    };

    fn status(error: Option<&str>, tier: ConfirmationTier) -> SignatureStatusRecord {
        SignatureStatusRecord {
            slot: 1000,
            error: error.map(str::to_string),
            confirmation: Some(tier),
        }
    }

    fn outgoing_details(wallet: &str) -> TransactionDetails {
        TransactionDetails {
            account_keys: vec![wallet.to_string(), "recipient".to_string()],
            pre_balances: vec![1_000_000, 0],
            post_balances: vec![900_000, 100_000],
            block_time: Some(1_700_000_000),
        }
    }

    fn incoming_details(wallet: &str) -> TransactionDetails {
        TransactionDetails {
            account_keys: vec!["sender".to_string(), wallet.to_string()],
            pre_balances: vec![1_000_000, 0],
            post_balances: vec![900_000, 100_000],
            block_time: Some(1_700_000_000),
        }
    }

    fn sigs(count: u8) -> Vec<Signature> {
        (1..=count).map(|n| Signature::from([n; 64])).collect()
    }

    #[tokio::test]
    async fn test_report_counts_failures_as_gutted() {
        let wallet = Pubkey::new_unique().to_string();
        let mut provider = MockSolanaProviderTrait::new();

        let history = sigs(3);
        provider
            .expect_get_signatures_for_address()
            .times(1)
            .returning(move |_| {
                let history = history.clone();
                Box::pin(async move { Ok(history) })
            });
        provider
            .expect_get_signature_statuses()
            .times(1)
            .returning(|_| {
                Box::pin(async {
                    Ok(vec![
                        Some(status(None, ConfirmationTier::Finalized)),
                        Some(status(None, ConfirmationTier::Finalized)),
                        Some(status(Some("InstructionError"), ConfirmationTier::Confirmed)),
                    ])
                })
            });
        let details_wallet = wallet.clone();
        provider
            .expect_get_transaction_details()
            .times(3)
            .returning(move |_, _| {
                let details = outgoing_details(&details_wallet);
                Box::pin(async move { Ok(Some(details)) })
            });

        let monitor = TransactionMonitor::new(Arc::new(provider));
        let report = monitor.wallet_report(&wallet).await.unwrap();

        assert_eq!(report.records.len(), 3);
        assert_eq!(report.metrics.submitted, 3);
        assert_eq!(report.metrics.confirmed, 2);
        assert_eq!(report.metrics.finalized, 2);
        assert_eq!(report.metrics.failed, 1);
        assert_eq!(report.status, WalletStatus::Gutted);
        assert_eq!(
            report.records[2].error.as_deref(),
            Some("InstructionError")
        );
        assert_eq!(report.records[0].timestamp, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_unknown_status_resolved_at_finalized_commitment() {
        let wallet = Pubkey::new_unique().to_string();
        let mut provider = MockSolanaProviderTrait::new();

        let history = sigs(1);
        provider
            .expect_get_signatures_for_address()
            .times(1)
            .returning(move |_| {
                let history = history.clone();
                Box::pin(async move { Ok(history) })
            });
        provider
            .expect_get_signature_statuses()
            .times(1)
            .returning(|_| Box::pin(async { Ok(vec![None]) }));
        let details_wallet = wallet.clone();
        provider
            .expect_get_transaction_details()
            .withf(|_, commitment| *commitment == CommitmentConfig::finalized())
            .times(1)
            .returning(move |_, _| {
                let details = outgoing_details(&details_wallet);
                Box::pin(async move { Ok(Some(details)) })
            });
        provider
            .expect_get_transaction_details()
            .withf(|_, commitment| *commitment == CommitmentConfig::confirmed())
            .times(0);

        let monitor = TransactionMonitor::new(Arc::new(provider));
        let report = monitor.wallet_report(&wallet).await.unwrap();

        assert_eq!(report.records[0].state, TransactionState::Finalized);
        assert!(report.records[0].is_user_initiated);
        assert_eq!(report.metrics.finalized, 1);
        assert_eq!(report.status, WalletStatus::Grand);
    }

    #[tokio::test]
    async fn test_unknown_status_missing_everywhere_stays_submitted() {
        let wallet = Pubkey::new_unique().to_string();
        let mut provider = MockSolanaProviderTrait::new();

        let history = sigs(1);
        provider
            .expect_get_signatures_for_address()
            .times(1)
            .returning(move |_| {
                let history = history.clone();
                Box::pin(async move { Ok(history) })
            });
        provider
            .expect_get_signature_statuses()
            .times(1)
            .returning(|_| Box::pin(async { Ok(vec![None]) }));
        provider
            .expect_get_transaction_details()
            .times(2)
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let monitor = TransactionMonitor::new(Arc::new(provider));
        let report = monitor.wallet_report(&wallet).await.unwrap();

        assert_eq!(report.records[0].state, TransactionState::Submitted);
        assert_eq!(report.records[0].timestamp, 0);
        assert!(!report.records[0].is_user_initiated);
        // Direction cannot be determined without a body, so nothing counts.
        assert_eq!(report.metrics.submitted, 0);
        assert_eq!(report.status, WalletStatus::Good);
    }

    #[tokio::test]
    async fn test_empty_history_is_good() {
        let wallet = Pubkey::new_unique().to_string();
        let mut provider = MockSolanaProviderTrait::new();

        provider
            .expect_get_signatures_for_address()
            .times(1)
            .returning(|_| Box::pin(async { Ok(Vec::new()) }));
        provider.expect_get_signature_statuses().times(0);
        provider.expect_get_transaction_details().times(0);

        let monitor = TransactionMonitor::new(Arc::new(provider));
        let report = monitor.wallet_report(&wallet).await.unwrap();

        assert!(report.records.is_empty());
        assert_eq!(report.metrics.submitted, 0);
        assert_eq!(report.status, WalletStatus::Good);
    }

    #[tokio::test]
    async fn test_incoming_transactions_do_not_count() {
        let wallet = Pubkey::new_unique().to_string();
        let mut provider = MockSolanaProviderTrait::new();

        let history = sigs(1);
        provider
            .expect_get_signatures_for_address()
            .times(1)
            .returning(move |_| {
                let history = history.clone();
                Box::pin(async move { Ok(history) })
            });
        provider
            .expect_get_signature_statuses()
            .times(1)
            .returning(|_| {
                Box::pin(async { Ok(vec![Some(status(None, ConfirmationTier::Finalized))]) })
            });
        let details_wallet = wallet.clone();
        provider
            .expect_get_transaction_details()
            .times(1)
            .returning(move |_, _| {
                let details = incoming_details(&details_wallet);
                Box::pin(async move { Ok(Some(details)) })
            });

        let monitor = TransactionMonitor::new(Arc::new(provider));
        let report = monitor.wallet_report(&wallet).await.unwrap();

        assert_eq!(report.records[0].state, TransactionState::Finalized);
        assert!(!report.records[0].is_user_initiated);
        assert_eq!(report.metrics.submitted, 0);
        assert_eq!(report.status, WalletStatus::Good);
    }

    #[tokio::test]
    async fn test_status_batch_failure_degrades_to_direct_lookups() {
        let wallet = Pubkey::new_unique().to_string();
        let mut provider = MockSolanaProviderTrait::new();

        let history = sigs(1);
        provider
            .expect_get_signatures_for_address()
            .times(1)
            .returning(move |_| {
                let history = history.clone();
                Box::pin(async move { Ok(history) })
            });
        provider
            .expect_get_signature_statuses()
            .times(1)
            .returning(|_| {
                Box::pin(async {
                    Err(SolanaProviderError::RpcError("node is behind".to_string()))
                })
            });
        let details_wallet = wallet.clone();
        provider
            .expect_get_transaction_details()
            .withf(|_, commitment| *commitment == CommitmentConfig::finalized())
            .times(1)
            .returning(move |_, _| {
                let details = outgoing_details(&details_wallet);
                Box::pin(async move { Ok(Some(details)) })
            });

        let monitor = TransactionMonitor::new(Arc::new(provider));
        let report = monitor.wallet_report(&wallet).await.unwrap();

        assert_eq!(report.records[0].state, TransactionState::Finalized);
        assert_eq!(report.status, WalletStatus::Grand);
    }

    #[tokio::test]
    async fn test_invalid_address_rejected_before_any_lookup() {
        let mut provider = MockSolanaProviderTrait::new();
        provider.expect_get_signatures_for_address().times(0);

        let monitor = TransactionMonitor::new(Arc::new(provider));
        let result = monitor.wallet_report("definitely-not-a-pubkey").await;

        assert!(matches!(result, Err(MonitorError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_history_fetch_failure_aborts_report() {
        let wallet = Pubkey::new_unique().to_string();
        let mut provider = MockSolanaProviderTrait::new();

        provider
            .expect_get_signatures_for_address()
            .times(1)
            .returning(|_| {
                Box::pin(async {
                    Err(SolanaProviderError::NetworkError("timeout".to_string()))
                })
            });

        let monitor = TransactionMonitor::new(Arc::new(provider));
        let result = monitor.wallet_report(&wallet).await;

        assert!(matches!(result, Err(MonitorError::SignatureLookup(_))));
    }
}
