//! Settlement writer: one `debtor,creditor,amount` row per settlement.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use settleup_types::{Result, SettleError, Settlement};

/// Write settlements as newline-terminated rows.
pub fn write_settlements<W: Write>(writer: W, settlements: &[Settlement]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for settlement in settlements {
        let amount = settlement.amount.to_string();
        csv_writer
            .write_record([
                settlement.debtor.as_str(),
                settlement.creditor.as_str(),
                amount.as_str(),
            ])
            .map_err(|e| SettleError::Serialization(e.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render settlements to a string.
pub fn write_settlements_to_string(settlements: &[Settlement]) -> Result<String> {
    let mut buf = Vec::new();
    write_settlements(&mut buf, settlements)?;
    String::from_utf8(buf).map_err(|e| SettleError::Serialization(e.to_string()))
}

/// Write settlements to a file, creating or truncating it.
pub fn write_settlements_to_path(path: &Path, settlements: &[Settlement]) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Could not write settlement file");
        SettleError::Io(format!("{}: {e}", path.display()))
    })?;
    write_settlements(file, settlements)
}
