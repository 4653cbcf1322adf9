//! System-wide constants for SettleUp.

/// Number of columns in every ledger row (`payer,payee,amount`).
pub const LEDGER_COLUMNS: usize = 3;

/// Suffix appended to a ledger id to form the key its results are stored under.
pub const RESULTS_SUFFIX: &str = "_results";

/// Default number of queue messages received per poll.
pub const DEFAULT_MAX_MESSAGES: usize = 5;

/// Upper bound on messages per poll (long-poll queues cap this at 10).
pub const MAX_MESSAGES_LIMIT: usize = 10;

/// Default long-poll wait per receive, in seconds.
pub const DEFAULT_WAIT_TIME_SECS: u64 = 20;

/// Upper bound on the long-poll wait, in seconds.
pub const MAX_WAIT_TIME_SECS: u64 = 20;

/// Default object store root for the worker.
pub const DEFAULT_STORE_DIR: &str = "./data/debts";

/// Default spool queue directory for the worker.
pub const DEFAULT_QUEUE_DIR: &str = "./data/queue";

/// Default log level when neither config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable naming a TOML config file for the worker.
pub const CONFIG_ENV_VAR: &str = "SETTLEUP_CONFIG";

/// Domain separator for the settlement digest.
pub const SETTLEMENT_DIGEST_DOMAIN: &[u8] = b"settleup:settlements:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
