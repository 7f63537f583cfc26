//! Determines whether a transaction was initiated by the wallet under
//! inspection.

use crate::models::TransactionDetails;

/// Returns true when the wallet initiated the transaction.
///
/// The fee payer occupies the first account slot of a Solana message, so a
/// wallet in that position initiated the transaction regardless of how its
/// balance moved. Otherwise a net balance decrease at the wallet's slot is
/// treated as outgoing. A wallet absent from the account keys, or one whose
/// balance entry is missing, did not initiate the transaction.
pub fn is_user_initiated(details: &TransactionDetails, address: &str) -> bool {
    if details.account_keys.first().map(String::as_str) == Some(address) {
        return true;
    }

    let Some(position) = details.account_keys.iter().position(|key| key == address) else {
        return false;
    };

    match (
        details.pre_balances.get(position),
        details.post_balances.get(position),
    ) {
        (Some(pre), Some(post)) => post < pre,
        _ => false,
    }
}
