//! Maps raw signature status responses onto transaction states.

use crate::models::{ConfirmationTier, SignatureStatusRecord, TransactionState};

/// Outcome of classifying a single signature status entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The status response was sufficient to determine a state.
    Resolved {
        state: TransactionState,
        error: Option<String>,
    },
    /// The status index returned nothing; a deeper lookup is required.
    Unresolved,
}

/// Classifies one entry from a batched signature status response.
///
/// An execution error takes priority over any commitment level. Without an
/// error, the confirmation tier maps directly onto a state; a present record
/// with no tier (or only processed) means the transaction was seen by the
/// cluster but is not yet confirmed.
pub fn classify_status(status: Option<&SignatureStatusRecord>) -> Classification {
    match status {
        Some(record) => {
            if record.error.is_some() {
                return Classification::Resolved {
                    state: TransactionState::Failed,
                    error: record.error.clone(),
                };
            }
            let state = match record.confirmation {
                Some(ConfirmationTier::Finalized) => TransactionState::Finalized,
                Some(ConfirmationTier::Confirmed) => TransactionState::Confirmed,
                Some(ConfirmationTier::Processed) | None => TransactionState::Broadcast,
            };
            Classification::Resolved { state, error: None }
        }
        None => Classification::Unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        error: Option<&str>,
        confirmation: Option<ConfirmationTier>,
    ) -> SignatureStatusRecord {
        SignatureStatusRecord {
            slot: 100,
            error: error.map(str::to_string),
            confirmation,
        }
    }

    #[test]
    fn test_error_takes_priority_over_commitment() {
        let status = record(
            Some("InstructionError"),
            Some(ConfirmationTier::Finalized),
        );
        assert_eq!(
            classify_status(Some(&status)),
            Classification::Resolved {
                state: TransactionState::Failed,
                error: Some("InstructionError".to_string()),
            }
        );
    }

    #[test]
    fn test_commitment_tiers_map_onto_states() {
        let finalized = record(None, Some(ConfirmationTier::Finalized));
        assert_eq!(
            classify_status(Some(&finalized)),
            Classification::Resolved {
                state: TransactionState::Finalized,
                error: None,
            }
        );

        let confirmed = record(None, Some(ConfirmationTier::Confirmed));
        assert_eq!(
            classify_status(Some(&confirmed)),
            Classification::Resolved {
                state: TransactionState::Confirmed,
                error: None,
            }
        );

        let processed = record(None, Some(ConfirmationTier::Processed));
        assert_eq!(
            classify_status(Some(&processed)),
            Classification::Resolved {
                state: TransactionState::Broadcast,
                error: None,
            }
        );
    }

    #[test]
    fn test_present_record_without_tier_is_broadcast() {
        let status = record(None, None);
        assert_eq!(
            classify_status(Some(&status)),
            Classification::Resolved {
                state: TransactionState::Broadcast,
                error: None,
            }
        );
    }

    #[test]
    fn test_missing_status_is_unresolved() {
        assert_eq!(classify_status(None), Classification::Unresolved);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let status = record(Some("custom error"), Some(ConfirmationTier::Confirmed));
        assert_eq!(
            classify_status(Some(&status)),
            classify_status(Some(&status))
        );
    }
}
