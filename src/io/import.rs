use anyhow::Result;
use std::io::Read;

use crate::domain::{parse_cents, Ledger, PaymentMethod};

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub validate_only: bool,
}

struct ParsedRow {
    service_number: Option<u64>,
    amount_cents: i64,
    payment_method: PaymentMethod,
}

/// Importer for loading a batch file into the ledger.
///
/// Imported rows replace whatever the ledger held: the first record fills
/// row 1 and every following record appends a row.
pub struct Importer<'a> {
    ledger: &'a mut Ledger,
}

impl<'a> Importer<'a> {
    pub fn new(ledger: &'a mut Ledger) -> Self {
        Self { ledger }
    }

    /// Import rows from CSV with columns `numero,valor,forma_pagamento`.
    /// Other columns are ignored.
    pub fn import_rows_csv<R: Read>(
        &mut self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns = Columns::from_headers(csv_reader.headers()?);
        let mut ledger = Ledger::new();
        let mut imported = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            if record.iter().all(|field| field.is_empty()) {
                skipped += 1;
                continue;
            }

            let parsed = match parse_record(&record, &columns) {
                Ok(p) => p,
                Err((field, error)) => {
                    errors.push(ImportError {
                        line,
                        field: Some(field.to_string()),
                        error,
                    });
                    continue;
                }
            };

            let sequence = if imported == 0 {
                1
            } else {
                match ledger.add_row() {
                    Ok(row) => row.sequence,
                    Err(e) => {
                        errors.push(ImportError {
                            line,
                            field: None,
                            error: e.to_string(),
                        });
                        continue;
                    }
                }
            };

            ledger.set_service_number(sequence, parsed.service_number)?;
            ledger.set_amount(sequence, parsed.amount_cents)?;
            ledger.set_payment_method(sequence, parsed.payment_method)?;
            imported += 1;
        }

        if !options.validate_only {
            *self.ledger = ledger;
        }

        Ok(ImportResult {
            imported,
            skipped,
            errors,
        })
    }
}

/// Column positions, found by header name. Files without the expected
/// headers are read positionally.
struct Columns {
    numero: usize,
    valor: usize,
    forma_pagamento: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let find = |name: &str, fallback: usize| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .unwrap_or(fallback)
        };
        Self {
            numero: find("numero", 0),
            valor: find("valor", 1),
            forma_pagamento: find("forma_pagamento", 2),
        }
    }
}

fn parse_record(
    record: &csv::StringRecord,
    columns: &Columns,
) -> Result<ParsedRow, (&'static str, String)> {
    let numero = record.get(columns.numero).unwrap_or("");
    let valor = record.get(columns.valor).unwrap_or("");
    let forma = record.get(columns.forma_pagamento).unwrap_or("");

    let service_number = if numero.is_empty() {
        None
    } else {
        Some(
            numero
                .parse::<u64>()
                .map_err(|_| ("numero", format!("Invalid service number: {}", numero)))?,
        )
    };

    let amount_cents = if valor.is_empty() {
        0
    } else {
        parse_cents(valor).map_err(|e| ("valor", format!("{}: {}", e, valor)))?
    };

    let payment_method = PaymentMethod::from_str(forma)
        .ok_or_else(|| ("forma_pagamento", format!("Unknown payment method: {}", forma)))?;

    Ok(ParsedRow {
        service_number,
        amount_cents,
        payment_method,
    })
}
