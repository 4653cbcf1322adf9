//! Greedy settlement engine.
//!
//! ```text
//! settle(NetBalances) -> [Settlement]
//! ```
//!
//! Each round pairs the largest debtor with the largest creditor and moves
//! the smaller of the two magnitudes between them. At least one side is
//! cleared per round, so `N` non-zero balances settle in at most `N - 1`
//! payments.
//!
//! ## Tie-break
//!
//! Among equal extremes the lexicographically smallest participant id is
//! picked. The choice depends only on the balances, never on ledger row
//! order, so re-running a reordered ledger yields the same list.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use settleup_types::{Balance, NetBalances, ParticipantId, Result, Settlement, Transaction};

use crate::{aggregator::aggregate, verify::check_conservation};

/// Working set of unsettled participants, split by sign.
///
/// `first()` of each set is the current extreme: debtors sort by
/// `(balance, id)` so the most negative comes first; creditors sort by
/// `(Reverse(balance), id)` so the most positive comes first.
struct ActiveSet {
    debtors: BTreeSet<(Balance, ParticipantId)>,
    creditors: BTreeSet<(Reverse<Balance>, ParticipantId)>,
}

impl ActiveSet {
    fn new(balances: NetBalances) -> Self {
        let mut debtors = BTreeSet::new();
        let mut creditors = BTreeSet::new();
        for (participant, balance) in balances.into_inner() {
            if balance < 0 {
                debtors.insert((balance, participant));
            } else if balance > 0 {
                creditors.insert((Reverse(balance), participant));
            }
        }
        Self { debtors, creditors }
    }

    fn len(&self) -> usize {
        self.debtors.len() + self.creditors.len()
    }

    fn is_empty(&self) -> bool {
        self.debtors.is_empty() && self.creditors.is_empty()
    }

    /// Take out the largest debtor and largest creditor, if both exist.
    fn pop_extremes(&mut self) -> Option<((Balance, ParticipantId), (Balance, ParticipantId))> {
        if self.debtors.is_empty() || self.creditors.is_empty() {
            return None;
        }
        let debtor = self.debtors.pop_first()?;
        let (Reverse(credit), creditor) = self.creditors.pop_first()?;
        Some((debtor, (credit, creditor)))
    }

    fn restore_debtor(&mut self, balance: Balance, participant: ParticipantId) {
        if balance != 0 {
            self.debtors.insert((balance, participant));
        }
    }

    fn restore_creditor(&mut self, balance: Balance, participant: ParticipantId) {
        if balance != 0 {
            self.creditors.insert((Reverse(balance), participant));
        }
    }
}

/// Settle a set of net balances.
///
/// ## Algorithm
///
/// 1. Reject balances that do not sum to zero
/// 2. Pick the most negative balance (debtor) and most positive (creditor)
/// 3. `transfer = min(|debtor|, creditor)`
/// 4. Move `transfer` between them; whichever reaches zero leaves the set
/// 5. Emit `(debtor, creditor, transfer)` and repeat until the set is empty
///
/// # Errors
/// Returns [`SettleError::ConservationViolation`](settleup_types::SettleError::ConservationViolation)
/// if the balances do not sum to zero. Nothing is emitted in that case.
pub fn settle(balances: NetBalances) -> Result<Vec<Settlement>> {
    check_conservation(&balances)?;

    let mut active = ActiveSet::new(balances);
    let mut settlements = Vec::with_capacity(active.len().saturating_sub(1));

    while let Some(((debt, debtor), (credit, creditor))) = active.pop_extremes() {
        let transfer = debt.saturating_neg().min(credit);
        let amount = transfer.unsigned_abs();

        tracing::debug!(
            debtor = %debtor,
            creditor = %creditor,
            amount,
            "Settlement emitted"
        );

        settlements.push(Settlement::new(debtor.clone(), creditor.clone(), amount));
        active.restore_debtor(debt + transfer, debtor);
        active.restore_creditor(credit - transfer, creditor);
    }

    debug_assert!(active.is_empty(), "conserved balances must settle completely");

    tracing::debug!(settlements = settlements.len(), "Balances settled");
    Ok(settlements)
}

/// Aggregate a validated ledger and settle it.
///
/// # Errors
/// Whatever [`settle`] returns. Aggregation debits and credits every amount
/// once, so a `ConservationViolation` here means the aggregator is broken.
pub fn minimize_cash_flow(transactions: &[Transaction]) -> Result<Vec<Settlement>> {
    settle(aggregate(transactions))
}

#[cfg(test)]
mod tests {
    use settleup_types::SettleError;

    use super::*;

    fn pid(name: &str) -> ParticipantId {
        ParticipantId::from(name)
    }

    fn balances(entries: &[(&str, Balance)]) -> NetBalances {
        entries.iter().map(|(name, b)| (pid(name), *b)).collect()
    }

    #[test]
    fn empty_balances_settle_to_nothing() {
        assert!(settle(NetBalances::new()).unwrap().is_empty());
    }

    #[test]
    fn single_pair_settles_in_one_payment() {
        let out = settle(balances(&[("Alice", -75), ("Bob", 75)])).unwrap();
        assert_eq!(out, vec![Settlement::new("Alice", "Bob", 75)]);
    }

    #[test]
    fn largest_debtor_pays_largest_creditor_first() {
        let out = settle(balances(&[("Alice", -100), ("Bob", 30), ("Charlie", 70)])).unwrap();
        assert_eq!(
            out,
            vec![
                Settlement::new("Alice", "Charlie", 70),
                Settlement::new("Alice", "Bob", 30),
            ]
        );
    }

    #[test]
    fn ties_go_to_smallest_id() {
        let out = settle(balances(&[("Alice", 200), ("Charlie", -100), ("Bob", -100)])).unwrap();
        assert_eq!(
            out,
            vec![
                Settlement::new("Bob", "Alice", 100),
                Settlement::new("Charlie", "Alice", 100),
            ]
        );
    }

    #[test]
    fn creditor_ties_go_to_smallest_id() {
        let out = settle(balances(&[("Zed", -100), ("Mia", 50), ("Kai", 50)])).unwrap();
        assert_eq!(
            out,
            vec![
                Settlement::new("Zed", "Kai", 50),
                Settlement::new("Zed", "Mia", 50),
            ]
        );
    }

    #[test]
    fn unbalanced_input_fails_fast() {
        let err = settle(balances(&[("Alice", -100), ("Bob", 100), ("Charlie", -200)])).unwrap_err();
        assert!(
            matches!(err, SettleError::ConservationViolation { total: -200 }),
            "Expected ConservationViolation, got: {err:?}"
        );
    }

    #[test]
    fn balance_beyond_one_ledger_row_settles_in_one_payment() {
        let txs = [
            Transaction::new("Alice", "Bob", u64::MAX),
            Transaction::new("Alice", "Bob", u64::MAX),
        ];
        let out = minimize_cash_flow(&txs).unwrap();
        assert_eq!(
            out,
            vec![Settlement::new("Alice", "Bob", 2 * u128::from(u64::MAX))]
        );
    }

    #[test]
    fn each_round_clears_one_side_for_huge_balances() {
        let big = 3 * Balance::from(u64::MAX) + 7;
        let out = settle(balances(&[("Alice", -big), ("Bob", big - 5), ("Charlie", 5)])).unwrap();
        assert_eq!(
            out,
            vec![
                Settlement::new("Alice", "Bob", (big - 5).unsigned_abs()),
                Settlement::new("Alice", "Charlie", 5),
            ]
        );
    }

    #[test]
    fn minimize_cash_flow_runs_full_pipeline() {
        let txs = [
            Transaction::new("Alice", "Bob", 100),
            Transaction::new("Bob", "Charlie", 200),
            Transaction::new("Charlie", "Alice", 300),
        ];
        assert_eq!(
            minimize_cash_flow(&txs).unwrap(),
            vec![
                Settlement::new("Bob", "Alice", 100),
                Settlement::new("Charlie", "Alice", 100),
            ]
        );
    }

    #[test]
    fn balanced_ledger_needs_no_payments() {
        let txs = [
            Transaction::new("Alice", "Bob", 20),
            Transaction::new("Bob", "Charlie", 20),
            Transaction::new("Charlie", "Alice", 20),
        ];
        assert!(minimize_cash_flow(&txs).unwrap().is_empty());
    }
}
