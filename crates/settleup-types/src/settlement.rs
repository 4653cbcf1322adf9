//! Settlement types produced by the settlement engine.
//!
//! A [`Settlement`] is one payment instruction in the minimized output:
//! `debtor` pays `creditor` the `amount`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ParticipantId;

/// Payment amount on a settlement.
///
/// Wider than a ledger [`Amount`](crate::Amount): a net balance can be the
/// sum of many ledger rows, and one payment clears it in full.
pub type SettledAmount = u128;

/// A single payment instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settlement {
    /// Participant who pays.
    pub debtor: ParticipantId,
    /// Participant who receives.
    pub creditor: ParticipantId,
    /// Strictly positive amount paid.
    pub amount: SettledAmount,
}

impl Settlement {
    #[must_use]
    pub fn new(debtor: impl Into<ParticipantId>, creditor: impl Into<ParticipantId>, amount: SettledAmount) -> Self {
        Self {
            debtor: debtor.into(),
            creditor: creditor.into(),
            amount,
        }
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pays {} {}", self.debtor, self.creditor, self.amount)
    }
}

/// SHA-256 digest over an ordered settlement list.
///
/// Two runs over the same ledger produce the same digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementDigest(pub [u8; 32]);

impl SettlementDigest {
    /// First four bytes, hex encoded. Used in log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for SettlementDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
