//! Net balance tracking.
//!
//! Positive balance = net creditor (is owed money).
//! Negative balance = net debtor (owes money).
//! Zero entries are never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Amount, ParticipantId, Transaction};

/// Signed net balance. Wide enough that summing `u64` amounts cannot overflow.
pub type Balance = i128;

/// Per-participant net balances for one settlement run.
///
/// Built from a complete transaction batch, so the values sum to zero. The
/// type itself does not enforce that: the settlement engine checks it once
/// on entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetBalances {
    entries: BTreeMap<ParticipantId, Balance>,
}

impl NetBalances {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to a participant's balance, dropping the entry if it
    /// lands on zero.
    pub fn adjust(&mut self, participant: &ParticipantId, delta: Balance) {
        if delta == 0 {
            return;
        }
        match self.entries.get_mut(participant) {
            Some(value) => {
                *value += delta;
                if *value == 0 {
                    self.entries.remove(participant);
                }
            }
            None => {
                self.entries.insert(participant.clone(), delta);
            }
        }
    }

    /// Increase a participant's balance (they are owed more).
    pub fn credit(&mut self, participant: &ParticipantId, amount: Amount) {
        self.adjust(participant, Balance::from(amount));
    }

    /// Decrease a participant's balance (they owe more).
    pub fn debit(&mut self, participant: &ParticipantId, amount: Amount) {
        self.adjust(participant, -Balance::from(amount));
    }

    /// Fold one transaction in: the payer owes, the payee is owed.
    pub fn apply(&mut self, tx: &Transaction) {
        self.debit(&tx.payer, tx.amount);
        self.credit(&tx.payee, tx.amount);
    }

    /// Balance of a participant, zero if absent.
    #[must_use]
    pub fn get(&self, participant: &ParticipantId) -> Balance {
        self.entries.get(participant).copied().unwrap_or(0)
    }

    /// Number of participants with a non-zero balance.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all balances. Zero for any mapping built from transactions.
    #[must_use]
    pub fn total(&self) -> Balance {
        self.entries.values().sum()
    }

    /// Participants and balances in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, Balance)> {
        self.entries.iter().map(|(id, balance)| (id, *balance))
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<ParticipantId, Balance> {
        self.entries
    }
}

impl FromIterator<(ParticipantId, Balance)> for NetBalances {
    fn from_iter<T: IntoIterator<Item = (ParticipantId, Balance)>>(iter: T) -> Self {
        let mut balances = Self::new();
        for (participant, delta) in iter {
            balances.adjust(&participant, delta);
        }
        balances
    }
}
