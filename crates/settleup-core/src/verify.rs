//! Conservation and settlement checks.
//!
//! Mathematical invariants:
//! ```text
//! Σ balance == 0                                   (before settling)
//! balances ⊕ settlements == ∅                      (after settling)
//! ∀ s: s.amount ≤ min(|debtor|, creditor) at emit  (no overshoot)
//! ```

use settleup_types::{Balance, NetBalances, Result, SettleError, Settlement};

/// Check that a set of net balances sums to zero.
///
/// # Errors
/// Returns [`SettleError::ConservationViolation`] with the actual total.
pub fn check_conservation(balances: &NetBalances) -> Result<()> {
    let total = balances.total();
    if total != 0 {
        tracing::error!(
            total = %total,
            participants = balances.len(),
            "Net balances do not sum to zero"
        );
        return Err(SettleError::ConservationViolation { total });
    }
    Ok(())
}

/// Replay a settlement list against the balances it was computed from.
///
/// Every entry must pay from a current debtor to a current creditor without
/// exceeding either outstanding balance, and the list must leave nothing
/// unsettled.
///
/// # Errors
/// Returns [`SettleError::InvalidSettlement`] describing the first problem
/// found.
pub fn verify_settlements(original: &NetBalances, settlements: &[Settlement]) -> Result<()> {
    let mut remaining = original.clone();

    for (index, settlement) in settlements.iter().enumerate() {
        let Ok(amount) = Balance::try_from(settlement.amount) else {
            return Err(invalid(index, settlement, "amount exceeds any balance"));
        };
        if amount == 0 {
            return Err(invalid(index, settlement, "amount is zero"));
        }

        let owed = -remaining.get(&settlement.debtor);
        if owed < amount {
            return Err(invalid(
                index,
                settlement,
                &format!("debtor only owes {}", owed.max(0)),
            ));
        }

        let due = remaining.get(&settlement.creditor);
        if due < amount {
            return Err(invalid(
                index,
                settlement,
                &format!("creditor is only owed {}", due.max(0)),
            ));
        }

        remaining.adjust(&settlement.debtor, amount);
        remaining.adjust(&settlement.creditor, -amount);
    }

    if let Some((participant, balance)) = remaining.iter().next() {
        return Err(SettleError::InvalidSettlement {
            reason: format!(
                "{} participants left unsettled, first is {participant} at {balance}",
                remaining.len()
            ),
        });
    }
    Ok(())
}

fn invalid(index: usize, settlement: &Settlement, why: &str) -> SettleError {
    SettleError::InvalidSettlement {
        reason: format!("entry {index} ({settlement}): {why}"),
    }
}
