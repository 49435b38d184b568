mod common;

use common::{filled_service, fixed_now, MockGateway, MockReply, ScriptedOperator};
use malote::application::{AppError, MaloteService, Notice, ValidationError};
use malote::domain::{FormHeader, PaymentMethod};
use malote::transport::TransportError;

#[tokio::test]
async fn test_empty_sender_blocks_submission() {
    let mut service = filled_service(MockGateway::pdf());
    service.header_mut().sender_name = "   ".to_string();

    let err = service.generate_pdf(fixed_now()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::MissingSender)
    ));
    assert_eq!(service.gateway().call_count(), 0);
}

#[tokio::test]
async fn test_missing_seal_blocks_submission() {
    let mut service = filled_service(MockGateway::pdf());
    service.header_mut().seal_number.clear();

    let err = service.generate_pdf(fixed_now()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::MissingSealNumber)
    ));
    assert_eq!(service.gateway().call_count(), 0);
}

#[tokio::test]
async fn test_rows_without_method_block_submission() {
    let mut service = MaloteService::new(MockGateway::pdf());
    service.set_header(FormHeader::new("Maria", "1"));
    service.set_service_number(1, Some(5)).unwrap();
    service.set_amount(1, 10000).unwrap();

    let err = service.generate_pdf(fixed_now()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::NoCompleteRow)
    ));
    assert_eq!(service.gateway().call_count(), 0);
}

#[tokio::test]
async fn test_request_payload() {
    let mut service = filled_service(MockGateway::pdf());
    service.header_mut().note = Some("conferido".to_string());

    let receipt = service.generate_pdf(fixed_now()).await.unwrap();
    assert_eq!(receipt.bytes, b"%PDF-1.4 test".to_vec());
    assert_eq!(
        receipt.file_name,
        format!(
            "protocolo_malote_884512_{}.pdf",
            fixed_now().timestamp_millis()
        )
    );

    let requests = service.gateway().requests.borrow();
    assert_eq!(requests.len(), 1);

    let body = serde_json::to_value(&requests[0]).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "remetente": "Maria Souza",
            "numeroLacre": "884512",
            "observacao": "conferido",
            "atendimentos": [
                {"numero": 101, "valor": 1500.0, "formaPagamento": "CARTAO"},
                {"numero": 102, "valor": 500.0, "formaPagamento": "DINHEIRO"}
            ],
            "totais": {"dinheiro": 500.0, "cartao": 1500.0, "geral": 2000.0},
            "dataHora": "17/05/2024, 14:30:05"
        })
    );
}

#[tokio::test]
async fn test_incomplete_rows_left_out_of_payload() {
    let mut service = filled_service(MockGateway::pdf());

    // Method chosen but no service number: shown in totals, not sent
    service.add_row().unwrap();
    service.set_amount(3, 7000).unwrap();
    service
        .select_payment_method(3, PaymentMethod::Cash)
        .unwrap();
    // Service number but no method: neither
    service.add_row().unwrap();
    service.set_service_number(4, Some(104)).unwrap();
    service.set_amount(4, 9900).unwrap();

    assert_eq!(service.totals().cash, 57000);

    let request = service.build_request(&fixed_now());
    assert_eq!(request.atendimentos.len(), 2);
    assert_eq!(request.totais.dinheiro, 500.0);
    assert_eq!(request.totais.geral, 2000.0);
    assert_eq!(request.observacao, "");
}

#[tokio::test]
async fn test_failed_submission_leaves_form_untouched() {
    let mut service = filled_service(MockGateway::new(MockReply::Service {
        status: 500,
        message: "template missing".to_string(),
    }))
    .with_reset_after_submit(true);
    let header_before = service.header().clone();
    let ledger_before = service.ledger().clone();

    let err = service.generate_pdf(fixed_now()).await.unwrap_err();
    match err {
        AppError::Transport(TransportError::Service { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "template missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(service.header(), &header_before);
    assert_eq!(service.ledger(), &ledger_before);

    // Resubmission is possible without re-entering anything
    service.generate_pdf(fixed_now()).await.unwrap_err();
    assert_eq!(service.gateway().call_count(), 2);
}

#[tokio::test]
async fn test_reset_after_successful_submission() {
    let mut service = filled_service(MockGateway::pdf()).with_reset_after_submit(true);

    service.generate_pdf(fixed_now()).await.unwrap();

    assert_eq!(service.ledger().len(), 1);
    assert!(service.ledger().rows()[0].is_blank());
    assert_eq!(service.header(), &FormHeader::default());
}

#[tokio::test]
async fn test_form_kept_after_success_by_default() {
    let mut service = filled_service(MockGateway::pdf());
    let ledger_before = service.ledger().clone();

    service.generate_pdf(fixed_now()).await.unwrap();
    assert_eq!(service.ledger(), &ledger_before);
}

#[tokio::test]
async fn test_submit_notifies_unreachable_service() {
    let mut service = filled_service(MockGateway::new(MockReply::Unreachable));
    let mut operator = ScriptedOperator::default();

    let receipt = service.submit(fixed_now(), &mut operator).await;
    assert!(receipt.is_none());

    match operator.notices.as_slice() {
        [Notice::Error(message)] => {
            assert!(message.contains("Could not connect"));
            assert!(message.contains("http://mock.invalid"));
        }
        other => panic!("unexpected notices: {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_notifies_service_error() {
    let mut service = filled_service(MockGateway::new(MockReply::Service {
        status: 422,
        message: "Lacre inválido".to_string(),
    }));
    let mut operator = ScriptedOperator::default();

    assert!(service.submit(fixed_now(), &mut operator).await.is_none());
    match operator.notices.as_slice() {
        [Notice::Error(message)] => {
            assert!(!message.contains("Could not connect"));
            assert!(message.contains("Lacre inválido"));
        }
        other => panic!("unexpected notices: {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_notifies_success() {
    let mut service = filled_service(MockGateway::pdf());
    let mut operator = ScriptedOperator::default();

    let receipt = service.submit(fixed_now(), &mut operator).await.unwrap();
    assert_eq!(
        operator.notices,
        vec![Notice::Info(format!("PDF generated: {}", receipt.file_name))]
    );
}

#[test]
fn test_remove_row_confirmation_flow() {
    let mut service = filled_service(MockGateway::pdf());
    let mut operator = ScriptedOperator::answering(&[false, true]);

    assert!(service.remove_row(1, &mut operator).unwrap().is_none());
    assert_eq!(service.ledger().len(), 2);

    let removed = service.remove_row(1, &mut operator).unwrap().unwrap();
    assert_eq!(removed.service_number, Some(101));
    assert_eq!(service.ledger().rows()[0].sequence, 1);
    assert_eq!(service.ledger().rows()[0].service_number, Some(102));
    assert_eq!(operator.prompts.len(), 2);
}

#[test]
fn test_remove_only_row_is_refused_without_prompt() {
    let mut service = MaloteService::new(MockGateway::pdf());
    let mut operator = ScriptedOperator::answering(&[true]);

    let err = service.remove_row(1, &mut operator).unwrap_err();
    assert!(err.is_capacity());
    assert!(operator.prompts.is_empty());
    assert_eq!(service.ledger().len(), 1);
}

#[test]
fn test_add_row_beyond_capacity() {
    let mut service = MaloteService::new(MockGateway::pdf());
    for _ in 1..18 {
        service.add_row().unwrap();
    }

    let err = service.add_row().unwrap_err();
    assert!(err.is_capacity());
    assert_eq!(service.ledger().len(), 18);
}

#[test]
fn test_clear_form_resets_to_one_blank_row() {
    let mut service = filled_service(MockGateway::pdf());
    let mut operator = ScriptedOperator::answering(&[true]);

    assert!(service.clear_form(&mut operator));
    assert_eq!(service.ledger().len(), 1);
    assert!(service.ledger().rows()[0].is_blank());
    assert!(service.header().sender_name.is_empty());
    assert_eq!(service.totals().overall, 0);
}

#[tokio::test]
async fn test_check_backend() {
    let service = MaloteService::new(MockGateway::pdf());
    assert!(service.check_backend().await);

    let service = MaloteService::new(MockGateway::new(MockReply::Unreachable));
    assert!(!service.check_backend().await);
}
