//! # settleup-codec
//!
//! Ledger text format for SettleUp.
//!
//! Rows are three comma-separated columns with no header:
//!
//! ```text
//! payer,payee,amount        (ledger in)
//! debtor,creditor,amount    (settlements out)
//! ```
//!
//! Reading validates every row and rejects the whole batch on the first bad
//! one, so the core only ever sees well-formed transactions.

pub mod reader;
pub mod writer;

pub use reader::{read_transactions, read_transactions_from_path, read_transactions_from_str};
pub use writer::{write_settlements, write_settlements_to_path, write_settlements_to_string};
