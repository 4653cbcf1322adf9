//! Ledger reader with row validation.
//!
//! Per row, in order:
//! 1. exactly three columns (a blank line is a row with none)
//! 2. non-empty payer and payee
//! 3. payer != payee
//! 4. amount is ASCII digits only, fits in `u64`, and is > 0

use std::fs::File;
use std::io::Read;
use std::path::Path;

use settleup_types::{Amount, ParticipantId, Result, SettleError, Transaction, constants};

/// Read and validate every row of a ledger.
///
/// # Errors
/// - `MalformedRow` on a wrong column count, an empty name, or bad UTF-8
/// - `SelfTransaction` if payer and payee are the same
/// - `InvalidAmount` if the amount is not a positive integer
/// - `Io` if the underlying reader fails
pub fn read_transactions<R: Read>(mut reader: R) -> Result<Vec<Transaction>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    // The csv reader skips empty lines, so they are located up front.
    let blank_line = first_blank_line(&data);

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_slice());

    let mut transactions = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map_or(0, csv::Position::line);
        if let Some(blank) = blank_line.filter(|blank| line >= *blank) {
            return Err(blank_row(blank));
        }
        match parse_row(&record, line) {
            Ok(tx) => transactions.push(tx),
            Err(err) => {
                tracing::warn!(line, error = %err, "Rejected ledger row");
                return Err(err);
            }
        }
    }

    if let Some(blank) = blank_line {
        return Err(blank_row(blank));
    }

    tracing::debug!(rows = transactions.len(), "Ledger decoded");
    Ok(transactions)
}

/// Line number of the first empty line outside a quoted field.
///
/// The newline ending the last row is a terminator, not an empty line.
fn first_blank_line(data: &[u8]) -> Option<u64> {
    let mut line = 1;
    let mut line_empty = true;
    let mut field_start = true;
    let mut in_quotes = false;
    let mut just_closed = false;

    for &byte in data {
        if in_quotes {
            if byte == b'"' {
                in_quotes = false;
                just_closed = true;
            } else if byte == b'\n' {
                line += 1;
            }
            continue;
        }
        match byte {
            // `""` inside a quoted field is an escaped quote.
            b'"' if field_start || just_closed => {
                in_quotes = true;
                line_empty = false;
            }
            b'\n' => {
                if line_empty {
                    return Some(line);
                }
                line += 1;
                line_empty = true;
                field_start = true;
                just_closed = false;
                continue;
            }
            b'\r' => {}
            b',' => {
                line_empty = false;
                field_start = true;
                just_closed = false;
                continue;
            }
            _ => line_empty = false,
        }
        field_start = false;
        just_closed = false;
    }
    None
}

fn blank_row(line: u64) -> SettleError {
    let err = SettleError::MalformedRow {
        line,
        reason: format!("expected {} columns, found 0", constants::LEDGER_COLUMNS),
    };
    tracing::warn!(line, error = %err, "Rejected ledger row");
    err
}

/// Read a ledger held in memory.
pub fn read_transactions_from_str(content: &str) -> Result<Vec<Transaction>> {
    read_transactions(content.as_bytes())
}

/// Read a ledger file.
///
/// # Errors
/// `Io` if the file cannot be opened, plus anything [`read_transactions`]
/// returns.
pub fn read_transactions_from_path(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Could not read ledger file");
        SettleError::Io(format!("{}: {e}", path.display()))
    })?;
    read_transactions(file)
}

fn parse_row(record: &csv::StringRecord, line: u64) -> Result<Transaction> {
    if record.len() != constants::LEDGER_COLUMNS {
        return Err(SettleError::MalformedRow {
            line,
            reason: format!(
                "expected {} columns, found {}",
                constants::LEDGER_COLUMNS,
                record.len()
            ),
        });
    }

    let payer = &record[0];
    let payee = &record[1];
    let raw_amount = &record[2];

    if payer.is_empty() || payee.is_empty() {
        return Err(SettleError::MalformedRow {
            line,
            reason: "payer and payee must be non-empty".to_string(),
        });
    }
    if payer == payee {
        return Err(SettleError::SelfTransaction {
            line,
            participant: payer.to_string(),
        });
    }

    let amount = parse_amount(raw_amount).ok_or_else(|| SettleError::InvalidAmount {
        line,
        value: raw_amount.to_string(),
    })?;

    Ok(Transaction {
        payer: ParticipantId::from(payer),
        payee: ParticipantId::from(payee),
        amount,
    })
}

/// Unsigned decimal digits only; no sign, point, or whitespace. Zero and
/// overflow are rejected.
fn parse_amount(raw: &str) -> Option<Amount> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<Amount>().ok().filter(|amount| *amount > 0)
}

fn csv_error(err: csv::Error) -> SettleError {
    if err.is_io_error() {
        return SettleError::Io(err.to_string());
    }
    SettleError::MalformedRow {
        line: err.position().map_or(0, csv::Position::line),
        reason: err.to_string(),
    }
}
