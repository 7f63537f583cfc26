//! Transaction lifecycle models.
//!
//! These types normalize the loosely shaped RPC responses into one canonical
//! representation at the provider boundary: a fast-path status becomes a
//! [`SignatureStatusRecord`], a full transaction body becomes a
//! [`TransactionDetails`] with a single address-list encoding, and the
//! classification pipeline produces [`TransactionRecord`]s that are folded
//! into [`TransactionMetrics`] and a derived [`WalletStatus`].

use serde::{Deserialize, Serialize};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, EncodedTransactionWithStatusMeta,
    TransactionConfirmationStatus, TransactionStatus, UiMessage,
};

/// Lifecycle state of a single transaction.
///
/// `Submitted → Broadcast → Confirmed → Finalized`, with `Failed` reachable
/// before `Confirmed`. `Finalized` and `Failed` are terminal and mutually
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionState {
    Submitted,
    Broadcast,
    Confirmed,
    Finalized,
    Failed,
}

/// Wallet health derived from [`TransactionMetrics`]; a pure projection with
/// no lifecycle of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum WalletStatus {
    /// Every user-initiated transaction reached finality with no failures.
    Grand,
    /// No activity, or activity that is confirmed/progressing without failures.
    Good,
    /// At least one on-chain failure in this pass.
    Gutted,
}

/// One classified transaction, valid for the duration of a single
/// aggregation pass.
///
/// `error` is set if and only if `state` is [`TransactionState::Failed`].
/// `is_user_initiated` is recomputed from on-chain data on every pass and is
/// independent of `state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: String,
    pub state: TransactionState,
    /// Best-effort observation time in milliseconds; 0 when unknown.
    pub timestamp: i64,
    pub error: Option<String>,
    pub is_user_initiated: bool,
}

/// Aggregate counters over one classification pass.
///
/// Invariant: `finalized <= confirmed`, because a finalized transaction is
/// also counted as confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMetrics {
    pub submitted: u64,
    pub broadcast: u64,
    pub confirmed: u64,
    pub finalized: u64,
    pub failed: u64,
}

/// The outcome of a full wallet health pass.
#[derive(Debug, Clone, Serialize)]
pub struct WalletReport {
    pub records: Vec<TransactionRecord>,
    pub metrics: TransactionMetrics,
    pub status: WalletStatus,
}

/// Consensus tier reported by the fast-path status lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationTier {
    Processed,
    Confirmed,
    Finalized,
}

/// Normalized result of `getSignatureStatuses` for one signature.
///
/// An absent record (the signature was not found by the fast-path index) is
/// represented as `None` at the call site, never as a defaulted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureStatusRecord {
    pub slot: u64,
    /// Serialized on-chain error, present only for failed transactions.
    pub error: Option<String>,
    pub confirmation: Option<ConfirmationTier>,
}

impl From<TransactionStatus> for SignatureStatusRecord {
    fn from(status: TransactionStatus) -> Self {
        let error = status
            .err
            .as_ref()
            .map(|err| serde_json::to_string(err).unwrap_or_else(|_| format!("{err:?}")));
        let confirmation = status.confirmation_status.as_ref().map(|tier| match tier {
            TransactionConfirmationStatus::Processed => ConfirmationTier::Processed,
            TransactionConfirmationStatus::Confirmed => ConfirmationTier::Confirmed,
            TransactionConfirmationStatus::Finalized => ConfirmationTier::Finalized,
        });
        Self {
            slot: status.slot,
            error,
            confirmation,
        }
    }
}

/// Canonical view of a fetched transaction body: the ordered account-key list
/// and the pre/post balance snapshots for those accounts.
///
/// Both RPC message encodings (raw JSON and parsed) collapse into the same
/// base58 address list here, so the rest of the pipeline never inspects
/// encoding-specific shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDetails {
    pub account_keys: Vec<String>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub block_time: Option<i64>,
}

impl TransactionDetails {
    /// Normalizes an encoded transaction into the canonical detail view.
    ///
    /// Returns `None` when the response has no meta (no balance snapshots) or
    /// the account keys cannot be recovered from the encoding.
    pub fn from_encoded(tx: EncodedConfirmedTransactionWithStatusMeta) -> Option<Self> {
        let block_time = tx.block_time;
        let EncodedTransactionWithStatusMeta {
            transaction, meta, ..
        } = tx.transaction;
        let meta = meta?;

        let account_keys = match transaction {
            EncodedTransaction::Json(ui_tx) => match ui_tx.message {
                UiMessage::Raw(raw) => raw.account_keys,
                UiMessage::Parsed(parsed) => parsed
                    .account_keys
                    .into_iter()
                    .map(|key| key.pubkey)
                    .collect(),
            },
            other => other
                .decode()?
                .message
                .static_account_keys()
                .iter()
                .map(|key| key.to_string())
                .collect(),
        };

        Some(Self {
            account_keys,
            pre_balances: meta.pre_balances,
            post_balances: meta.post_balances,
            block_time,
        })
    }
}
