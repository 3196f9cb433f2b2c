use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use prepaid_engine::{
    events::EventHooks,
    processor_types::ProcessorOrderStatus,
    ApprovalApi,
    CommitOutcome,
    EngineOptions,
    ProcessorError,
};

use super::{
    helpers::{closed_record, pending_record, remote_order, send_request},
    mocks::{MockOrderStore, MockProcessor},
};
use crate::{config::ServerOptions, routes::OnCloseRoute};

fn approve_form(order_id: &str, reference: &str, capture_id: &str) -> TestRequest {
    TestRequest::post().uri("/paypal/default/onClose").set_form([
        ("order_id", order_id),
        ("ref_id", reference),
        ("capture_id", capture_id),
        ("action", "approve"),
    ])
}

fn action_form(reference: &str, action: &str) -> TestRequest {
    TestRequest::post().uri("/paypal/default/onClose").set_form([("ref_id", reference), ("action", action)])
}

fn configure(store: MockOrderStore, processor: MockProcessor) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = ApprovalApi::new(store, processor, EngineOptions::default(), EventHooks::default());
        let options = ServerOptions { instance_id: "default".into(), ..Default::default() };
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(options))
            .service(OnCloseRoute::<MockOrderStore, MockProcessor>::new());
    }
}

/// A processor that authenticates and reports `ORD-1` with the given status and amount.
fn processor_reporting(status: ProcessorOrderStatus, value: &'static str) -> MockProcessor {
    let mut processor = MockProcessor::new();
    processor.expect_refresh_credential().returning(|| Ok(()));
    processor
        .expect_fetch_order()
        .returning(move |id| Ok(remote_order(id, status.clone(), "ref-1", "USD", value)));
    processor
}

fn store_with_pending_order() -> MockOrderStore {
    let mut store = MockOrderStore::new();
    store.expect_fetch_order().returning(|r| Ok(Some(pending_record(r.as_str(), "USD", 245))));
    store
}

#[actix_web::test]
async fn approve_verified_payment() {
    let _ = env_logger::try_init().ok();
    let mut store = store_with_pending_order();
    store
        .expect_commit_approval()
        .times(1)
        .returning(|r, c| {
            Ok(CommitOutcome::Committed(closed_record(r.as_str(), "USD", 245, &c.order_id, &c.capture_id)))
        });
    let processor = processor_reporting(ProcessorOrderStatus::Completed, "2.45");
    let (status, body) = send_request(approve_form("ORD-1", "ref-1", "CAP-1"), configure(store, processor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"success","message":"PAYMENT_OK"}"#);
}

#[actix_web::test]
async fn approve_with_missing_capture_id() {
    let _ = env_logger::try_init().ok();
    // No expectations: any call into the engine's collaborators fails the test
    let (status, body) =
        send_request(approve_form("ORD-1", "ref-1", ""), configure(MockOrderStore::new(), MockProcessor::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"status":"error","message":"BAD_REQUEST"}"#);
}

#[actix_web::test]
async fn missing_action() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/paypal/default/onClose").set_form([("ref_id", "ref-1")]);
    let (status, body) = send_request(req, configure(MockOrderStore::new(), MockProcessor::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"status":"error","message":"BAD_REQUEST"}"#);
}

#[actix_web::test]
async fn unknown_action() {
    let _ = env_logger::try_init().ok();
    let (status, _) =
        send_request(action_form("ref-1", "refund"), configure(MockOrderStore::new(), MockProcessor::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn wrong_instance() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/paypal/other/onClose")
        .set_form([("ref_id", "ref-1"), ("action", "cancel")]);
    let (status, body) = send_request(req, configure(MockOrderStore::new(), MockProcessor::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"status":"error","message":"BAD_REQUEST"}"#);
}

#[actix_web::test]
async fn buyer_cancelled() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        send_request(action_form("ref-1", "cancel"), configure(MockOrderStore::new(), MockProcessor::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"canceled","message":"BUYER_PAYPAL_CANCEL"}"#);
}

#[actix_web::test]
async fn buyer_side_error() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        send_request(action_form("ref-1", "error"), configure(MockOrderStore::new(), MockProcessor::new())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, r#"{"status":"error","message":"BUYER_PAYPAL_ERROR"}"#);
}

#[actix_web::test]
async fn tampered_amount() {
    let _ = env_logger::try_init().ok();
    let store = store_with_pending_order();
    let processor = processor_reporting(ProcessorOrderStatus::Completed, "0.01");
    let (status, body) = send_request(approve_form("ORD-1", "ref-1", "CAP-1"), configure(store, processor)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"status":"error","message":"SERVER_PAYPAL_BAD_ORDER"}"#);
}

#[actix_web::test]
async fn unparsable_amount() {
    let _ = env_logger::try_init().ok();
    let store = store_with_pending_order();
    let processor = processor_reporting(ProcessorOrderStatus::Completed, "two dollars");
    let (status, body) = send_request(approve_form("ORD-1", "ref-1", "CAP-1"), configure(store, processor)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"status":"error","message":"SERVER_PAYPAL_BAD_ORDER"}"#);
}

#[actix_web::test]
async fn payment_not_yet_approved() {
    let _ = env_logger::try_init().ok();
    let store = store_with_pending_order();
    let processor = processor_reporting(ProcessorOrderStatus::Saved, "2.45");
    let (status, body) = send_request(approve_form("ORD-1", "ref-1", "CAP-1"), configure(store, processor)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"status":"error","message":"PAYMENT_NOT_APPROVED"}"#);
}

#[actix_web::test]
async fn bad_paypal_credentials() {
    let _ = env_logger::try_init().ok();
    let mut processor = MockProcessor::new();
    processor.expect_refresh_credential().returning(|| Err(ProcessorError::Authentication("invalid_client".into())));
    let (status, body) =
        send_request(approve_form("ORD-1", "ref-1", "CAP-1"), configure(MockOrderStore::new(), processor)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"status":"error","message":"SERVER_PAYPAL_BAD_AUTH"}"#);
}

#[actix_web::test]
async fn approval_already_recorded() {
    let _ = env_logger::try_init().ok();
    let mut store = store_with_pending_order();
    store.expect_commit_approval().returning(|_, _| Ok(CommitOutcome::AlreadyClosed));
    let processor = processor_reporting(ProcessorOrderStatus::Approved, "2.45");
    let (status, body) = send_request(approve_form("ORD-1", "ref-1", "CAP-1"), configure(store, processor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"success","message":"PAYMENT_ALREADY_RECORDED"}"#);
}
