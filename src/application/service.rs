use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::domain::{Cents, FormHeader, Ledger, LedgerError, PaymentMethod, RowEntry, Totals};
use crate::transport::{PdfGateway, TransportError};

use super::{receipt_file_name, AppError, Receipt, ReceiptRequest, ValidationError};

/// The person at the form. Confirmation prompts and feedback go through
/// this trait so the controller stays free of any I/O of its own.
pub trait Operator {
    fn confirm(&mut self, message: &str) -> bool;

    fn notify(&mut self, notice: Notice);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Controller for one batch form.
/// This is the primary interface for any client (CLI, TUI, etc.).
pub struct MaloteService<G> {
    gateway: G,
    header: FormHeader,
    ledger: Ledger,
    reset_after_submit: bool,
}

impl<G: PdfGateway> MaloteService<G> {
    /// A fresh form: empty header and one blank row.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            header: FormHeader::default(),
            ledger: Ledger::new(),
            reset_after_submit: false,
        }
    }

    /// Clear the form after every successful submission.
    pub fn with_reset_after_submit(mut self, reset: bool) -> Self {
        self.reset_after_submit = reset;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn header(&self) -> &FormHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut FormHeader {
        &mut self.header
    }

    pub fn set_header(&mut self, header: FormHeader) {
        self.header = header;
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Replace the whole row collection, e.g. after a batch import.
    pub fn set_ledger(&mut self, ledger: Ledger) {
        self.ledger = ledger;
    }

    pub fn totals(&self) -> Totals {
        self.ledger.totals()
    }

    // ========================
    // Row operations
    // ========================

    pub fn add_row(&mut self) -> Result<&RowEntry, AppError> {
        let row = self.ledger.add_row()?;
        debug!(sequence = row.sequence, "row added");
        Ok(row)
    }

    /// Remove a row after the operator confirms.
    /// Returns `None` when the operator declines.
    pub fn remove_row(
        &mut self,
        sequence: usize,
        operator: &mut impl Operator,
    ) -> Result<Option<RowEntry>, AppError> {
        // Refuse before asking: there is nothing to confirm.
        if self.ledger.len() <= 1 {
            return Err(LedgerError::LastRowRemoval.into());
        }
        if self.ledger.row(sequence).is_none() {
            return Err(LedgerError::RowNotFound(sequence).into());
        }

        if !operator.confirm(&format!("Remove row {}?", sequence)) {
            return Ok(None);
        }

        let removed = self.ledger.remove_row(sequence)?;
        debug!(sequence, remaining = self.ledger.len(), "row removed");
        Ok(Some(removed))
    }

    pub fn set_service_number(
        &mut self,
        sequence: usize,
        service_number: Option<u64>,
    ) -> Result<(), AppError> {
        Ok(self.ledger.set_service_number(sequence, service_number)?)
    }

    /// Apply text typed into the amount field of a row.
    /// Returns the masked value to display.
    pub fn type_amount(&mut self, sequence: usize, raw: &str) -> Result<String, AppError> {
        Ok(self.ledger.type_amount(sequence, raw)?)
    }

    pub fn set_amount(&mut self, sequence: usize, amount_cents: Cents) -> Result<(), AppError> {
        Ok(self.ledger.set_amount(sequence, amount_cents)?)
    }

    pub fn select_payment_method(
        &mut self,
        sequence: usize,
        method: PaymentMethod,
    ) -> Result<(), AppError> {
        Ok(self.ledger.set_payment_method(sequence, method)?)
    }

    /// Reset header and rows after the operator confirms.
    /// Returns whether the form was cleared.
    pub fn clear_form(&mut self, operator: &mut impl Operator) -> bool {
        if !operator.confirm("Clear all data?") {
            return false;
        }
        self.reset();
        info!("form cleared");
        true
    }

    fn reset(&mut self) {
        self.header.clear();
        self.ledger.reset();
    }

    // ========================
    // Submission
    // ========================

    /// Check the form can be submitted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.header.has_sender() {
            return Err(ValidationError::MissingSender);
        }
        if !self.header.has_seal_number() {
            return Err(ValidationError::MissingSealNumber);
        }
        if !self.ledger.has_complete_row() {
            return Err(ValidationError::NoCompleteRow);
        }
        Ok(())
    }

    pub fn build_request(&self, now: &DateTime<Local>) -> ReceiptRequest {
        ReceiptRequest::build(&self.header, &self.ledger, now)
    }

    /// Validate, send the batch to the PDF service and return the receipt.
    ///
    /// Nothing is sent when validation fails, and the form is left exactly
    /// as it was whenever the call fails.
    pub async fn generate_pdf(&mut self, now: DateTime<Local>) -> Result<Receipt, AppError> {
        self.validate()?;

        let request = self.build_request(&now);
        info!(
            seal = %request.numero_lacre,
            rows = request.atendimentos.len(),
            "generating receipt"
        );

        let bytes = match self.gateway.render_receipt(&request).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "receipt generation failed");
                return Err(err.into());
            }
        };

        let receipt = Receipt {
            file_name: receipt_file_name(&request.numero_lacre, &now),
            bytes,
        };

        if self.reset_after_submit {
            self.reset();
        }

        Ok(receipt)
    }

    /// [`Self::generate_pdf`] with the outcome reported to the operator.
    pub async fn submit(
        &mut self,
        now: DateTime<Local>,
        operator: &mut impl Operator,
    ) -> Option<Receipt> {
        match self.generate_pdf(now).await {
            Ok(receipt) => {
                operator.notify(Notice::Info(format!("PDF generated: {}", receipt.file_name)));
                Some(receipt)
            }
            Err(err) => {
                operator.notify(Notice::Error(failure_message(&err)));
                None
            }
        }
    }

    /// Probe the PDF service. Logs the outcome and never fails.
    pub async fn check_backend(&self) -> bool {
        match self.gateway.health().await {
            Ok(status) => {
                info!(reply = status.message.as_deref().unwrap_or(""), "PDF service reachable");
                true
            }
            Err(err) => {
                warn!(error = %err, "PDF service not reachable");
                false
            }
        }
    }
}

/// Operator-facing text for a failed submission.
pub fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Transport(TransportError::Unreachable { url, .. }) => format!(
            "Could not connect to the PDF service.\n\
             Check that the service is running and that the API URL is correct ({}).",
            url
        ),
        AppError::Transport(transport) if transport.is_unreachable() => {
            format!("The PDF service did not answer. {}", transport)
        }
        other => format!("Could not generate the PDF: {}", other),
    }
}
