// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use chrono::{DateTime, Local, TimeZone};
use malote::application::{MaloteService, Notice, Operator, ReceiptRequest};
use malote::domain::PaymentMethod;
use malote::transport::{HealthStatus, PdfGateway, TransportError};

/// What the fake PDF service answers
#[derive(Debug, Clone)]
pub enum MockReply {
    Pdf(Vec<u8>),
    Service { status: u16, message: String },
    Unreachable,
}

/// In-memory gateway that records every request it receives
pub struct MockGateway {
    pub reply: MockReply,
    pub requests: RefCell<Vec<ReceiptRequest>>,
}

impl MockGateway {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn pdf() -> Self {
        Self::new(MockReply::Pdf(b"%PDF-1.4 test".to_vec()))
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl PdfGateway for MockGateway {
    async fn render_receipt(&self, request: &ReceiptRequest) -> Result<Vec<u8>, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        match &self.reply {
            MockReply::Pdf(bytes) => Ok(bytes.clone()),
            MockReply::Service { status, message } => Err(TransportError::Service {
                status: *status,
                message: message.clone(),
            }),
            MockReply::Unreachable => Err(TransportError::Unreachable {
                url: "http://mock.invalid".to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        match &self.reply {
            MockReply::Unreachable => Err(TransportError::Unreachable {
                url: "http://mock.invalid".to_string(),
                reason: "connection refused".to_string(),
            }),
            _ => Ok(HealthStatus {
                message: Some("ok".to_string()),
            }),
        }
    }
}

/// Operator that answers confirmations from a script and keeps every notice
#[derive(Default)]
pub struct ScriptedOperator {
    pub answers: VecDeque<bool>,
    pub prompts: Vec<String>,
    pub notices: Vec<Notice>,
}

impl ScriptedOperator {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl Operator for ScriptedOperator {
    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.answers.pop_front().unwrap_or(false)
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Fixed timestamp for deterministic payloads
pub fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, 17, 14, 30, 5).unwrap()
}

/// Service with a valid header and two complete rows:
/// 101 R$ 1.500,00 card and 102 R$ 500,00 cash
pub fn filled_service(gateway: MockGateway) -> MaloteService<MockGateway> {
    let mut service = MaloteService::new(gateway);
    service.header_mut().sender_name = "Maria Souza".to_string();
    service.header_mut().seal_number = "884512".to_string();

    service.set_service_number(1, Some(101)).unwrap();
    service.set_amount(1, 150000).unwrap();
    service
        .select_payment_method(1, PaymentMethod::Card)
        .unwrap();

    service.add_row().unwrap();
    service.set_service_number(2, Some(102)).unwrap();
    service.set_amount(2, 50000).unwrap();
    service
        .select_payment_method(2, PaymentMethod::Cash)
        .unwrap();

    service
}

/// Stub HTTP server on an ephemeral port, aborted on drop
pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(app: axum::Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// URL of a local port nobody listens on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
