use serde::{Deserialize, Serialize};

use super::mask::MaskedInput;
use super::{format_brl, Cents, PaymentMethod, RowEntry, RowId, MAX_AMOUNT_CENTS};

/// Maximum number of rows a batch form can hold.
pub const MAX_ROWS: usize = 18;

/// Totals per payment method. Always derived from the rows, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub cash: Cents,
    pub card: Cents,
    pub overall: Cents,
}

/// Compute totals from a list of rows.
/// Rows without a payment method contribute to neither bucket.
/// Sums saturate instead of overflowing.
pub fn compute_totals<'a>(rows: impl IntoIterator<Item = &'a RowEntry>) -> Totals {
    let (cash, card) = rows
        .into_iter()
        .fold((0 as Cents, 0 as Cents), |(cash, card), row| match row.payment_method {
            PaymentMethod::Cash => (cash.saturating_add(row.amount_cents), card),
            PaymentMethod::Card => (cash, card.saturating_add(row.amount_cents)),
            PaymentMethod::Unset => (cash, card),
        });

    Totals {
        cash,
        card,
        overall: cash.saturating_add(card),
    }
}

/// Ordered collection of rows on the form.
///
/// Holds between 1 and [`MAX_ROWS`] rows, numbered 1..N without gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    rows: Vec<RowEntry>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// A ledger with exactly one blank row.
    pub fn new() -> Self {
        Self {
            rows: vec![RowEntry::new(1)],
        }
    }

    pub fn rows(&self) -> &[RowEntry] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= MAX_ROWS
    }

    pub fn row(&self, sequence: usize) -> Option<&RowEntry> {
        sequence
            .checked_sub(1)
            .and_then(|index| self.rows.get(index))
    }

    pub fn row_by_id(&self, id: RowId) -> Option<&RowEntry> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// Sequence currently held by the row with the given id.
    pub fn sequence_of(&self, id: RowId) -> Option<usize> {
        self.row_by_id(id).map(|row| row.sequence)
    }

    fn row_mut(&mut self, sequence: usize) -> Result<&mut RowEntry, LedgerError> {
        sequence
            .checked_sub(1)
            .and_then(|index| self.rows.get_mut(index))
            .ok_or(LedgerError::RowNotFound(sequence))
    }

    /// Append a blank row.
    pub fn add_row(&mut self) -> Result<&RowEntry, LedgerError> {
        if self.is_full() {
            return Err(LedgerError::RowLimitReached { max: MAX_ROWS });
        }

        self.rows.push(RowEntry::new(self.rows.len() + 1));
        Ok(&self.rows[self.rows.len() - 1])
    }

    /// Remove a row and renumber the ones after it.
    /// The last remaining row cannot be removed.
    pub fn remove_row(&mut self, sequence: usize) -> Result<RowEntry, LedgerError> {
        if self.rows.len() <= 1 {
            return Err(LedgerError::LastRowRemoval);
        }
        if self.row(sequence).is_none() {
            return Err(LedgerError::RowNotFound(sequence));
        }

        let removed = self.rows.remove(sequence - 1);
        self.renumber();
        Ok(removed)
    }

    fn renumber(&mut self) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.sequence = index + 1;
        }
    }

    pub fn set_amount(&mut self, sequence: usize, amount_cents: Cents) -> Result<(), LedgerError> {
        if amount_cents < 0 {
            return Err(LedgerError::NegativeAmount(amount_cents));
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(LedgerError::AmountTooLarge(amount_cents));
        }
        self.row_mut(sequence)?.amount_cents = amount_cents;
        Ok(())
    }

    /// Apply text typed into a row's amount field: mask, blur, store.
    /// Returns the value the field should display.
    pub fn type_amount(&mut self, sequence: usize, raw: &str) -> Result<String, LedgerError> {
        let row = self.row_mut(sequence)?;
        let mut field = MaskedInput::with_cents(row.amount_cents);
        field.focus();
        field.input(raw);
        field.blur();
        row.amount_cents = field.cents();
        Ok(field.value().to_string())
    }

    pub fn set_payment_method(
        &mut self,
        sequence: usize,
        method: PaymentMethod,
    ) -> Result<(), LedgerError> {
        self.row_mut(sequence)?.payment_method = method;
        Ok(())
    }

    pub fn set_service_number(
        &mut self,
        sequence: usize,
        service_number: Option<u64>,
    ) -> Result<(), LedgerError> {
        self.row_mut(sequence)?.service_number = service_number;
        Ok(())
    }

    /// Back to a single blank row.
    pub fn reset(&mut self) {
        self.rows = vec![RowEntry::new(1)];
    }

    pub fn totals(&self) -> Totals {
        compute_totals(&self.rows)
    }

    pub fn complete_rows(&self) -> impl Iterator<Item = &RowEntry> {
        self.rows.iter().filter(|row| row.is_complete())
    }

    pub fn has_complete_row(&self) -> bool {
        self.rows.iter().any(RowEntry::is_complete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    RowLimitReached { max: usize },
    LastRowRemoval,
    RowNotFound(usize),
    NegativeAmount(Cents),
    AmountTooLarge(Cents),
}

impl LedgerError {
    /// Capacity errors are the ones the operator can fix by adding or
    /// removing rows elsewhere.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            LedgerError::RowLimitReached { .. } | LedgerError::LastRowRemoval
        )
    }
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::RowLimitReached { max } => {
                write!(f, "Row limit reached: at most {} rows per batch", max)
            }
            LedgerError::LastRowRemoval => {
                write!(f, "The batch must keep at least one row")
            }
            LedgerError::RowNotFound(sequence) => write!(f, "Row {} does not exist", sequence),
            LedgerError::NegativeAmount(cents) => {
                write!(f, "Amount cannot be negative ({} cents)", cents)
            }
            LedgerError::AmountTooLarge(cents) => write!(
                f,
                "Amount of {} cents is above the limit of {}",
                cents,
                format_brl(MAX_AMOUNT_CENTS)
            ),
        }
    }
}

impl std::error::Error for LedgerError {}
