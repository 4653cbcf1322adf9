//! # settleup
//!
//! Reads a ledger of `payer,payee,amount` rows and writes the minimal
//! `debtor,creditor,amount` settlement list to the output path.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use settleup_codec::{read_transactions_from_path, write_settlements_to_path};
use settleup_core::{aggregate, compute_settlement_digest, settle, verify_settlements};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simplify a debt ledger into the fewest settling payments.
#[derive(Parser, Debug)]
#[command(name = "settleup", version, about)]
struct Cli {
    /// Ledger CSV: one `payer,payee,amount` row per debt, no header.
    input: PathBuf,

    /// Where to write the settlements CSV.
    output: PathBuf,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    run(&cli)?;
    Ok(())
}

/// Settle `cli.input` into `cli.output`. Returns the number of settlements.
fn run(cli: &Cli) -> Result<usize> {
    let transactions = read_transactions_from_path(&cli.input)
        .with_context(|| format!("reading ledger {}", cli.input.display()))?;

    let balances = aggregate(&transactions);
    let settlements = settle(balances.clone()).context("settling ledger")?;
    verify_settlements(&balances, &settlements).context("checking settlements")?;

    write_settlements_to_path(&cli.output, &settlements)
        .with_context(|| format!("writing settlements {}", cli.output.display()))?;

    info!(
        transactions = transactions.len(),
        participants = balances.len(),
        settlements = settlements.len(),
        digest = %compute_settlement_digest(&settlements).short(),
        output = %cli.output.display(),
        "Ledger settled"
    );
    Ok(settlements.len())
}
