use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::application::{Receipt, ReceiptRequest};
use crate::domain::{format_cents, Ledger};

/// Exporter for writing the form's data out
pub struct Exporter<'a> {
    ledger: &'a Ledger,
}

impl<'a> Exporter<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Export rows to CSV. The importer reads the file back, ignoring
    /// the sequence column.
    pub fn export_rows_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["sequencia", "numero", "valor", "forma_pagamento"])?;

        let mut count = 0;
        for row in self.ledger.rows() {
            csv_writer.write_record([
                row.sequence.to_string(),
                row.service_number
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                format_cents(row.amount_cents),
                row.payment_method.as_str().to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}

/// Write the outbound request as pretty JSON
pub fn export_request_json<W: Write>(request: &ReceiptRequest, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, request)?;
    writeln!(writer)?;
    Ok(())
}

/// Save a receipt under its download name inside `dir`
pub fn save_receipt(dir: &Path, receipt: &Receipt) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(&receipt.file_name);
    std::fs::write(&path, &receipt.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
