//! Balance aggregation: folds a ledger into per-participant net balances.

use settleup_types::{NetBalances, Transaction};

/// Fold a batch of validated transactions into net balances.
///
/// Each payer is debited and each payee credited by the row amount.
/// Zero results are dropped. The fold is commutative, so row order never
/// changes the result, and every amount is added and subtracted once, so
/// the output always sums to zero.
#[must_use]
pub fn aggregate<'a, I>(transactions: I) -> NetBalances
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut balances = NetBalances::new();
    for tx in transactions {
        balances.apply(tx);
    }
    balances
}

#[cfg(test)]
mod tests {
    use settleup_types::ParticipantId;

    use super::*;

    fn pid(name: &str) -> ParticipantId {
        ParticipantId::from(name)
    }

    #[test]
    fn empty_ledger_has_no_balances() {
        let balances = aggregate(std::iter::empty());
        assert!(balances.is_empty());
    }

    #[test]
    fn triangle_nets_out() {
        let txs = [
            Transaction::new("Alice", "Bob", 100),
            Transaction::new("Bob", "Charlie", 200),
            Transaction::new("Charlie", "Alice", 300),
        ];
        let balances = aggregate(&txs);
        assert_eq!(balances.get(&pid("Alice")), 200);
        assert_eq!(balances.get(&pid("Bob")), -100);
        assert_eq!(balances.get(&pid("Charlie")), -100);
        assert_eq!(balances.total(), 0);
    }

    #[test]
    fn settled_participant_is_dropped() {
        let txs = [
            Transaction::new("Alice", "Bob", 50),
            Transaction::new("Bob", "Charlie", 50),
        ];
        let balances = aggregate(&txs);
        assert_eq!(balances.len(), 2);
        assert_eq!(balances.get(&pid("Bob")), 0);
    }

    #[test]
    fn row_order_does_not_matter() {
        let txs = vec![
            Transaction::new("Alice", "Bob", 10),
            Transaction::new("Bob", "Alice", 5),
            Transaction::new("Charlie", "Bob", 5),
            Transaction::new("John", "Michael", 13),
        ];
        let mut reversed = txs.clone();
        reversed.reverse();
        assert_eq!(aggregate(&txs), aggregate(&reversed));
    }

    #[test]
    fn large_amounts_do_not_overflow() {
        let txs = [
            Transaction::new("Alice", "Bob", u64::MAX),
            Transaction::new("Alice", "Bob", u64::MAX),
        ];
        let balances = aggregate(&txs);
        assert_eq!(balances.get(&pid("Bob")), 2 * i128::from(u64::MAX));
        assert_eq!(balances.total(), 0);
    }
}
