use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::domain::{cents_to_amount, compute_totals, FormHeader, Ledger, PaymentMethod, Totals};

/// Body of `POST /api/gerar-pdf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    pub remetente: String,
    pub numero_lacre: String,
    pub observacao: String,
    pub atendimentos: Vec<ServiceEntry>,
    pub totais: ReceiptTotals,
    pub data_hora: String,
}

/// One complete row, as sent to the PDF service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    pub numero: u64,
    /// Amount in reais
    pub valor: f64,
    pub forma_pagamento: PaymentMethod,
}

/// Totals in reais.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceiptTotals {
    pub dinheiro: f64,
    pub cartao: f64,
    pub geral: f64,
}

impl From<Totals> for ReceiptTotals {
    fn from(totals: Totals) -> Self {
        Self {
            dinheiro: cents_to_amount(totals.cash),
            cartao: cents_to_amount(totals.card),
            geral: cents_to_amount(totals.overall),
        }
    }
}

/// Timestamp format of the `dataHora` field (pt-BR short date and time).
pub const RECEIPT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

impl ReceiptRequest {
    /// Build the request from the header and the complete rows of the ledger.
    /// Incomplete rows are left out, and so are their amounts from the totals.
    pub fn build<Tz>(header: &FormHeader, ledger: &Ledger, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let complete: Vec<_> = ledger.complete_rows().collect();

        let atendimentos = complete
            .iter()
            .filter_map(|row| {
                row.service_number.map(|numero| ServiceEntry {
                    numero,
                    valor: cents_to_amount(row.amount_cents),
                    forma_pagamento: row.payment_method,
                })
            })
            .collect();

        Self {
            remetente: header.sender_name.clone(),
            numero_lacre: header.seal_number.clone(),
            observacao: header.note.clone().unwrap_or_default(),
            atendimentos,
            totais: compute_totals(complete.iter().copied()).into(),
            data_hora: now.format(RECEIPT_TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// PDF returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Download name of a receipt: seal number plus a millisecond timestamp.
pub fn receipt_file_name<Tz: TimeZone>(seal_number: &str, now: &DateTime<Tz>) -> String {
    let seal: String = seal_number
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("protocolo_malote_{}_{}.pdf", seal, now.timestamp_millis())
}
