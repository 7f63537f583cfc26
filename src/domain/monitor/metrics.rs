//! Aggregation of classified transactions into wallet-level metrics and a
//! health status.

use crate::models::{TransactionMetrics, TransactionRecord, TransactionState, WalletStatus};

/// Which transactions participate in the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingPolicy {
    /// Only transactions the wallet initiated. Use when direction could be
    /// determined for the record set.
    UserInitiatedOnly,
    /// Every transaction, regardless of direction.
    All,
}

/// Tallies state counters over the record set.
///
/// Every counted record increments `submitted`. A finalized transaction also
/// counts as confirmed, since finality implies confirmation.
pub fn calculate_metrics(
    records: &[TransactionRecord],
    policy: CountingPolicy,
) -> TransactionMetrics {
    let mut metrics = TransactionMetrics::default();

    for record in records {
        if policy == CountingPolicy::UserInitiatedOnly && !record.is_user_initiated {
            continue;
        }

        metrics.submitted += 1;
        match record.state {
            TransactionState::Submitted => {}
            TransactionState::Broadcast => metrics.broadcast += 1,
            TransactionState::Confirmed => metrics.confirmed += 1,
            TransactionState::Finalized => {
                metrics.finalized += 1;
                metrics.confirmed += 1;
            }
            TransactionState::Failed => metrics.failed += 1,
        }
    }

    metrics
}

/// Derives the wallet health status from the counters.
///
/// Any failure makes the wallet `Gutted`. With no failures, full finality
/// across every counted transaction is `Grand`; anything else, including an
/// empty set, is `Good`.
pub fn derive_status(metrics: &TransactionMetrics) -> WalletStatus {
    if metrics.submitted == 0 {
        return WalletStatus::Good;
    }
    if metrics.failed > 0 {
        return WalletStatus::Gutted;
    }
    if metrics.finalized == metrics.submitted {
        return WalletStatus::Grand;
    }
    WalletStatus::Good
}
