use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Could not connect to the PDF service at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("PDF service at {url} did not answer within {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("PDF service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Invalid response from the PDF service: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl TransportError {
    /// True when the service could not be reached at all, as opposed to
    /// answering with an error status.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            TransportError::Unreachable { .. } | TransportError::Timeout { .. }
        )
    }
}
