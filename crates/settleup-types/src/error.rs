//! Error types for SettleUp.
//!
//! All errors use the `SU_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Ledger row errors (codec)
//! - 6xx: Settlement errors (core)
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::Balance;

/// Central error enum for SettleUp operations.
#[derive(Debug, Error)]
pub enum SettleError {
    // =================================================================
    // Ledger Row Errors (1xx)
    // =================================================================
    /// The row does not have the expected shape (column count, empty field).
    #[error("SU_ERR_100: Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    /// Payer and payee are the same participant.
    #[error("SU_ERR_101: Self transaction at line {line}: payer and payee are both {participant}")]
    SelfTransaction { line: u64, participant: String },

    /// The amount is not a strictly positive integer.
    #[error("SU_ERR_102: Invalid amount at line {line}: {value:?}")]
    InvalidAmount { line: u64, value: String },

    // =================================================================
    // Settlement Errors (6xx)
    // =================================================================
    /// Net balances handed to the engine do not sum to zero.
    #[error("SU_ERR_600: Conservation violation: net balances sum to {total}, expected 0")]
    ConservationViolation { total: Balance },

    /// A settlement list does not cancel the balances it was computed for.
    #[error("SU_ERR_601: Invalid settlement: {reason}")]
    InvalidSettlement { reason: String },

    // =================================================================
    // General (9xx)
    // =================================================================
    /// Serialization / deserialization error.
    #[error("SU_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad env value, etc.).
    #[error("SU_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk).
    #[error("SU_ERR_903: I/O error: {0}")]
    Io(String),
}

impl SettleError {
    /// Whether this error means the input ledger itself was rejected.
    #[must_use]
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedRow { .. } | Self::SelfTransaction { .. } | Self::InvalidAmount { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SettleError>;

impl From<std::io::Error> for SettleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conservation_violation_display() {
        let err = SettleError::ConservationViolation { total: -200 };
        let msg = format!("{err}");
        assert!(msg.starts_with("SU_ERR_600"), "Got: {msg}");
        assert!(msg.contains("-200"));
    }

    #[test]
    fn invalid_amount_quotes_value() {
        let err = SettleError::InvalidAmount {
            line: 2,
            value: "100.5".into(),
        };
        assert_eq!(
            err.to_string(),
            "SU_ERR_102: Invalid amount at line 2: \"100.5\""
        );
    }

    #[test]
    fn malformed_input_classification() {
        assert!(SettleError::SelfTransaction {
            line: 1,
            participant: "Alice".into(),
        }
        .is_malformed_input());
        assert!(!SettleError::ConservationViolation { total: 1 }.is_malformed_input());
        assert!(!SettleError::Io("gone".into()).is_malformed_input());
    }

    #[test]
    fn all_errors_have_su_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(SettleError::MalformedRow {
                line: 1,
                reason: "x".into(),
            }),
            Box::new(SettleError::InvalidSettlement { reason: "x".into() }),
            Box::new(SettleError::Serialization("test".into())),
            Box::new(SettleError::Configuration("test".into())),
            Box::new(SettleError::from(std::io::Error::other("disk"))),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("SU_ERR_"),
                "Error missing SU_ERR_ prefix: {msg}"
            );
        }
    }
}
