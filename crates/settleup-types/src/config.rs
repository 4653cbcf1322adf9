//! Configuration for the SettleUp job worker.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{SettleError, constants};

/// Worker configuration: where ledgers live, where jobs arrive, and how
/// aggressively to poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Root directory of the filesystem object store.
    pub store_dir: PathBuf,
    /// Spool directory the worker receives job messages from.
    pub queue_dir: PathBuf,
    /// Messages received per poll.
    pub max_messages: usize,
    /// Long-poll wait per receive, in seconds.
    pub wait_time_secs: u64,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(constants::DEFAULT_STORE_DIR),
            queue_dir: PathBuf::from(constants::DEFAULT_QUEUE_DIR),
            max_messages: constants::DEFAULT_MAX_MESSAGES,
            wait_time_secs: constants::DEFAULT_WAIT_TIME_SECS,
            log_level: constants::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl WorkerConfig {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            SettleError::Configuration(format!("Failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `SETTLEUP_*` environment variables.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys keep their
    /// defaults; set but unparsable numbers are an error.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup("SETTLEUP_STORE_DIR") {
            config.store_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("SETTLEUP_QUEUE_DIR") {
            config.queue_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("SETTLEUP_MAX_MESSAGES") {
            config.max_messages = parse_number("SETTLEUP_MAX_MESSAGES", &raw)?;
        }
        if let Some(raw) = lookup("SETTLEUP_WAIT_TIME_SECS") {
            config.wait_time_secs = parse_number("SETTLEUP_WAIT_TIME_SECS", &raw)?;
        }
        if let Some(level) = lookup("SETTLEUP_LOG_LEVEL") {
            config.log_level = level;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the polling limits.
    pub fn validate(&self) -> crate::Result<()> {
        if !(1..=constants::MAX_MESSAGES_LIMIT).contains(&self.max_messages) {
            return Err(SettleError::Configuration(format!(
                "max_messages must be between 1 and {}, got {}",
                constants::MAX_MESSAGES_LIMIT,
                self.max_messages
            )));
        }
        if self.wait_time_secs > constants::MAX_WAIT_TIME_SECS {
            return Err(SettleError::Configuration(format!(
                "wait_time_secs must be at most {}, got {}",
                constants::MAX_WAIT_TIME_SECS,
                self.wait_time_secs
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn wait_time(&self) -> Duration {
        Duration::from_secs(self.wait_time_secs)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> crate::Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| SettleError::Configuration(format!("{key} is not a valid number: {raw:?}")))
}
