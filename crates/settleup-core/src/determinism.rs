//! Settlement digest for cheap re-run comparison.
//!
//! Settling the same ledger twice must produce the same list. The digest is
//! a SHA-256 over that list so two runs (or a stored result and a fresh
//! run) can be compared without diffing payloads.

use settleup_types::{Settlement, SettlementDigest, constants};
use sha2::{Digest, Sha256};

/// Compute the digest over an ordered settlement list.
///
/// Commits to:
/// - Number of settlements
/// - Each debtor and creditor (length-prefixed) and amount (16 bytes LE), in order
#[must_use]
pub fn compute_settlement_digest(settlements: &[Settlement]) -> SettlementDigest {
    let mut hasher = Sha256::new();
    hasher.update(constants::SETTLEMENT_DIGEST_DOMAIN);
    hasher.update((settlements.len() as u64).to_le_bytes());

    for settlement in settlements {
        for id in [&settlement.debtor, &settlement.creditor] {
            hasher.update((id.as_str().len() as u64).to_le_bytes());
            hasher.update(id.as_str().as_bytes());
        }
        hasher.update(settlement.amount.to_le_bytes());
    }

    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    SettlementDigest(digest)
}

/// Recompute the digest and compare with the expected one.
#[must_use]
pub fn verify_settlement_digest(settlements: &[Settlement], expected: &SettlementDigest) -> bool {
    compute_settlement_digest(settlements) == *expected
}
