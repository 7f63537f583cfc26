//! Deeper lookups for signatures the status index does not know about.
//!
//! A signature the index cannot resolve is looked up directly, first at
//! finalized commitment and then at confirmed. Finding it at finalized means
//! the transaction is finalized; finding it only at confirmed means it is
//! confirmed; finding it at neither means it never landed and is still at the
//! submitted stage. Each wave runs concurrently across all pending signatures.

use futures::future::join_all;
use log::warn;
use solana_sdk::{commitment_config::CommitmentConfig, signature::Signature};

use crate::{
    models::{TransactionDetails, TransactionState},
    services::provider::SolanaProviderTrait,
};

/// State determined for a previously unresolved signature, along with the
/// transaction body when one was found.
#[derive(Debug, Clone)]
pub struct FallbackResolution {
    pub state: TransactionState,
    pub details: Option<TransactionDetails>,
}

/// Resolves each signature by direct lookup, finalized commitment first.
/// The confirmed-level wave only runs for signatures the finalized wave did
/// not find.
pub async fn resolve_unknown<P: SolanaProviderTrait>(
    provider: &P,
    signatures: &[Signature],
) -> Vec<FallbackResolution> {
    let finalized_wave = join_all(
        signatures
            .iter()
            .map(|sig| lookup(provider, sig, CommitmentConfig::finalized())),
    )
    .await;

    let confirmed_wave = join_all(signatures.iter().zip(finalized_wave.iter()).map(
        |(sig, found)| async move {
            match found {
                Some(_) => None,
                None => lookup(provider, sig, CommitmentConfig::confirmed()).await,
            }
        },
    ))
    .await;

    finalized_wave
        .into_iter()
        .zip(confirmed_wave)
        .map(|(finalized, confirmed)| match (finalized, confirmed) {
            (Some(details), _) => FallbackResolution {
                state: TransactionState::Finalized,
                details: Some(details),
            },
            (None, Some(details)) => FallbackResolution {
                state: TransactionState::Confirmed,
                details: Some(details),
            },
            (None, None) => FallbackResolution {
                state: TransactionState::Submitted,
                details: None,
            },
        })
        .collect()
}

async fn lookup<P: SolanaProviderTrait>(
    provider: &P,
    signature: &Signature,
    commitment: CommitmentConfig,
) -> Option<TransactionDetails> {
    match provider.get_transaction_details(signature, commitment).await {
        Ok(details) => details,
        Err(e) => {
            warn!(
                "Transaction lookup failed for {} at {:?}: {}",
                signature, commitment.commitment, e
            );
            None
        }
    }
}
