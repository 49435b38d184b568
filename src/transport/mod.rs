// Outbound side: the PDF service contract and its HTTP client.

mod client;
mod error;

pub use client::*;
pub use error::*;

use serde::{Deserialize, Serialize};

use crate::application::ReceiptRequest;

/// Reply of the health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub message: Option<String>,
}

/// Anything that can turn a receipt request into PDF bytes.
#[allow(async_fn_in_trait)]
pub trait PdfGateway {
    async fn render_receipt(&self, request: &ReceiptRequest) -> Result<Vec<u8>, TransportError>;

    async fn health(&self) -> Result<HealthStatus, TransportError>;
}
