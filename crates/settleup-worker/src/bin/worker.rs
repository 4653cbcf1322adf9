//! SettleUp worker binary.
//!
//! Settles ledgers referenced by messages in a spool directory, reading
//! and writing them in a filesystem object store.
//!
//! Configuration comes from the TOML file named by `SETTLEUP_CONFIG`, or
//! else from `SETTLEUP_*` environment variables.

use std::sync::Arc;

use anyhow::{Context, Result};
use settleup_types::{WorkerConfig, constants};
use settleup_worker::{FsObjectStore, JobRunner, SpoolQueue};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        version = constants::VERSION,
        store_dir = %config.store_dir.display(),
        queue_dir = %config.queue_dir.display(),
        "Starting SettleUp worker"
    );

    let store = Arc::new(FsObjectStore::new(&config.store_dir));
    let queue = Arc::new(
        SpoolQueue::open(&config.queue_dir)
            .await
            .with_context(|| format!("opening queue at {}", config.queue_dir.display()))?,
    );
    let runner = JobRunner::from_config(store, queue, &config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    runner.run(shutdown_rx).await;
    Ok(())
}

fn load_config() -> Result<WorkerConfig> {
    match std::env::var(constants::CONFIG_ENV_VAR) {
        Ok(path) => WorkerConfig::from_file(&path)
            .with_context(|| format!("loading config from {path}")),
        Err(_) => WorkerConfig::from_env().context("loading config from environment"),
    }
}
