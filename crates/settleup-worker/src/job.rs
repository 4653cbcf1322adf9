//! Job message body and job result.

use serde::{Deserialize, Serialize};
use settleup_types::{LedgerId, SettlementDigest};

use crate::WorkerError;

/// Body of a queue message: which ledger to settle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    pub debts_id: LedgerId,
}

impl JobMessage {
    #[must_use]
    pub fn new(debts_id: impl Into<String>) -> Self {
        Self {
            debts_id: LedgerId::new(debts_id),
        }
    }

    /// Parse a message body.
    pub fn parse(body: &str) -> Result<Self, WorkerError> {
        serde_json::from_str(body).map_err(|e| WorkerError::InvalidMessage(e.to_string()))
    }

    /// Render as a message body.
    #[must_use]
    pub fn to_body(&self) -> String {
        // A struct holding one string field always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// What a successfully processed job produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub ledger_id: LedgerId,
    /// Key the settlements were stored under.
    pub results_key: String,
    /// Number of ledger rows read.
    pub transactions: usize,
    /// Number of settlements written.
    pub settlements: usize,
    pub digest: SettlementDigest,
}
