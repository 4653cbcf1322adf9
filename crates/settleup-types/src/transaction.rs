//! Ledger transaction type.
//!
//! A [`Transaction`] records that `payer` owes `payee` an `amount`. The
//! same column meaning is used for settlements, so a settlement list can be
//! fed back in as a ledger.

use serde::{Deserialize, Serialize};

use crate::ParticipantId;

/// Money amount on a ledger row. Always strictly positive once validated.
pub type Amount = u64;

/// A single validated ledger row.
///
/// Construction does not validate: rows reach this type only through the
/// ledger codec, which rejects self-transactions and non-positive amounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    /// The participant who owes the amount.
    pub payer: ParticipantId,
    /// The participant who is owed the amount.
    pub payee: ParticipantId,
    /// Amount owed, in the ledger's smallest unit.
    pub amount: Amount,
}

impl Transaction {
    #[must_use]
    pub fn new(payer: impl Into<ParticipantId>, payee: impl Into<ParticipantId>, amount: Amount) -> Self {
        Self {
            payer: payer.into(),
            payee: payee.into(),
            amount,
        }
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}: {}", self.payer, self.payee, self.amount)
    }
}
