use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

/// Stable identity of a row. Unlike the sequence number it survives
/// renumbering, so front ends can key their handlers on it.
pub type RowId = Uuid;

/// Payment method chosen for a row.
///
/// Rows start as `Unset` and only change through an explicit selection.
/// Serialized with the names the PDF service expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "DINHEIRO")]
    Cash,
    #[serde(rename = "CARTAO")]
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Unset => "",
            PaymentMethod::Cash => "DINHEIRO",
            PaymentMethod::Card => "CARTAO",
        }
    }

    /// Human-readable label, as shown in the method selector.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Unset => "-",
            PaymentMethod::Cash => "Espécie",
            PaymentMethod::Card => "Cartão",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "-" | "none" | "unset" => Some(PaymentMethod::Unset),
            "dinheiro" | "especie" | "espécie" | "cash" => Some(PaymentMethod::Cash),
            "cartao" | "cartão" | "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, PaymentMethod::Unset)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One service transaction ("atendimento") on the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowEntry {
    pub id: RowId,
    /// 1-based position, reassigned by the ledger after removals
    pub sequence: usize,
    /// Service number typed by the operator
    pub service_number: Option<u64>,
    /// Amount in cents (never negative)
    pub amount_cents: Cents,
    pub payment_method: PaymentMethod,
}

impl RowEntry {
    /// A blank row. The sequence is assigned by the ledger.
    pub fn new(sequence: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            service_number: None,
            amount_cents: 0,
            payment_method: PaymentMethod::Unset,
        }
    }

    /// A row counts for submission only when it has a service number and a
    /// payment method. The amount always holds a value, zero included.
    pub fn is_complete(&self) -> bool {
        self.service_number.is_some() && self.payment_method.is_set()
    }

    pub fn is_blank(&self) -> bool {
        self.service_number.is_none()
            && self.amount_cents == 0
            && !self.payment_method.is_set()
    }
}
