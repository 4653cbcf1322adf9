//! # settleup-core
//!
//! **Pure debt simplification for SettleUp.**
//!
//! The core takes a validated ledger and produces the settlement list:
//!
//! ```text
//! [Transaction] --aggregate--> NetBalances --settle--> [Settlement]
//! ```
//!
//! - **Zero side effects**: no I/O, no shared state, no async
//! - **Deterministic output**: same ledger -> same settlements, in any row order
//! - **Conservation**: balances sum to zero going in; the engine refuses
//!   anything else

pub mod aggregator;
pub mod determinism;
pub mod engine;
pub mod verify;

pub use aggregator::aggregate;
pub use determinism::{compute_settlement_digest, verify_settlement_digest};
pub use engine::{minimize_cash_flow, settle};
pub use verify::{check_conservation, verify_settlements};
