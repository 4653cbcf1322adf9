//! # settleup-types
//!
//! Shared types, errors, and configuration for **SettleUp**.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ParticipantId`], [`LedgerId`]
//! - **Ledger model**: [`Transaction`], [`Amount`]
//! - **Balance model**: [`NetBalances`], [`Balance`]
//! - **Settlement model**: [`Settlement`], [`SettledAmount`], [`SettlementDigest`]
//! - **Configuration**: [`WorkerConfig`]
//! - **Errors**: [`SettleError`] with `SU_ERR_` prefix codes
//! - **Constants**: defaults and limits

pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod settlement;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use settleup_types::{Transaction, Settlement, NetBalances, ...};

pub use balance::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use settlement::*;
pub use transaction::*;

// Constants are accessed via `settleup_types::constants::FOO`
// (not re-exported to avoid name collisions).
