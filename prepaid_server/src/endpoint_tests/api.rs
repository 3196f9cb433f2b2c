use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use prepaid_engine::{
    db_types::{Cents, ReferenceId},
    processor_types::{ProcessorOrderStatus, RefundReceipt, RefundStatus},
    CheckoutApi,
    EngineOptions,
    LedgerApi,
    OrderStoreError,
    RefundReservation,
};
use serde_json::{json, Value};

use super::{
    helpers::{closed_record, pending_record, remote_order, send_request},
    mocks::{MockOrderStore, MockProcessor},
};
use crate::{
    config::ServerOptions,
    routes::{OpenCheckoutRoute, OrderRecordRoute, PaymentStatusRoute, RefundRoute, RefundableRoute},
};

fn engine_options() -> EngineOptions {
    EngineOptions {
        callback_base: "https://shop.example.com".into(),
        instance_id: "default".into(),
        ..Default::default()
    }
}

fn configure_checkout(store: MockOrderStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let options =
            ServerOptions { instance_id: "default".into(), paypal_client_id: "sb-client".into(), ..Default::default() };
        cfg.app_data(web::Data::new(CheckoutApi::new(store, engine_options())))
            .app_data(web::Data::new(options))
            .service(OpenCheckoutRoute::<MockOrderStore>::new());
    }
}

fn configure_ledger(store: MockOrderStore, processor: MockProcessor) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(LedgerApi::new(store, processor, engine_options())))
            .service(PaymentStatusRoute::<MockOrderStore, MockProcessor>::new())
            .service(RefundableRoute::<MockOrderStore, MockProcessor>::new())
            .service(RefundRoute::<MockOrderStore, MockProcessor>::new())
            .service(OrderRecordRoute::<MockOrderStore, MockProcessor>::new());
    }
}

/// A store holding `ref-1`, closed with processor order `ORD-1` for USD 2.45 and nothing refunded yet.
fn store_with_paid_order() -> MockOrderStore {
    let mut store = MockOrderStore::new();
    store.expect_fetch_order().returning(|r| Ok(Some(closed_record(r.as_str(), "USD", 245, "ORD-1", "CAP-1"))));
    store
}

fn processor_reporting(status: ProcessorOrderStatus) -> MockProcessor {
    let mut processor = MockProcessor::new();
    processor.expect_fetch_order().returning(move |id| Ok(remote_order(id, status.clone(), "ref-1", "USD", "2.45")));
    processor
}

#[actix_web::test]
async fn open_checkout() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().times(1).returning(|order| {
        let mut record = pending_record(order.reference_id.as_str(), &order.currency, 0);
        record.total = order.total;
        Ok(record)
    });
    let body = json!({"reference": "ref-1", "currency": "usd", "amount": 2.45});
    let req = TestRequest::post().uri("/checkout").set_json(body);
    let (status, body) = send_request(req, configure_checkout(store)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["reference"], "ref-1");
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["amount"], "2.45");
    assert_eq!(body["notify_url"], "https://shop.example.com/paypal/default/onClose");
    assert_eq!(body["sdk_url"], "https://www.paypal.com/sdk/js?client-id=sb-client&currency=USD");
    assert_eq!(body["purchase_units"][0]["amount"]["value"], "2.45");
}

#[actix_web::test]
async fn open_checkout_twice() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store
        .expect_insert_order()
        .returning(|order| Err(OrderStoreError::DuplicateReference(order.reference_id.clone())));
    let body = json!({"reference": "ref-1", "currency": "USD", "amount": 1.0});
    let req = TestRequest::post().uri("/checkout").set_json(body);
    let (status, body) = send_request(req, configure_checkout(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "DUPLICATE_REFERENCE");
}

#[actix_web::test]
async fn open_checkout_for_nothing() {
    let _ = env_logger::try_init().ok();
    let body = json!({"reference": "ref-1", "currency": "USD", "amount": 0.001});
    let req = TestRequest::post().uri("/checkout").set_json(body);
    let (status, body) = send_request(req, configure_checkout(MockOrderStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "INVALID_AMOUNT");
}

#[actix_web::test]
async fn payment_status_of_unknown_reference() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order().returning(|_| Ok(None));
    let req = TestRequest::get().uri("/payment/never-opened");
    let (status, body) = send_request(req, configure_ledger(store, MockProcessor::new())).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "UNPAID");
    assert_eq!(body["verified"], false);
}

#[actix_web::test]
async fn payment_status_of_paid_order() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/payment/ref-1");
    let config = configure_ledger(store_with_paid_order(), processor_reporting(ProcessorOrderStatus::Completed));
    let (status, body) = send_request(req, config).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "PAID");
    assert_eq!(body["verified"], true);
    assert_eq!(body["unit"]["amount"], "2.45");
}

#[actix_web::test]
async fn voided_order_is_not_refundable() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/refundable/ref-1");
    let config = configure_ledger(store_with_paid_order(), processor_reporting(ProcessorOrderStatus::Voided));
    let (status, body) = send_request(req, config).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"reference":"ref-1","refundable":false}"#);
}

#[actix_web::test]
async fn paid_order_is_refundable() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/refundable/ref-1");
    let config = configure_ledger(store_with_paid_order(), processor_reporting(ProcessorOrderStatus::Completed));
    let (status, body) = send_request(req, config).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"reference":"ref-1","refundable":true}"#);
}

#[actix_web::test]
async fn refund_more_than_was_paid() {
    let _ = env_logger::try_init().ok();
    // The request is rejected before anything is reserved, so no reservation expectations are set
    let req = TestRequest::post().uri("/refund").set_json(json!({"reference": "ref-1", "amount": "2.46"}));
    let config = configure_ledger(store_with_paid_order(), processor_reporting(ProcessorOrderStatus::Completed));
    let (status, body) = send_request(req, config).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "REFUND_EXCEEDS_CAPTURED");
}

#[actix_web::test]
async fn partial_refund() {
    let _ = env_logger::try_init().ok();
    let mut store = store_with_paid_order();
    store.expect_reserve_refund().times(1).returning(|r, amount, _| {
        let mut record = closed_record(r.as_str(), "USD", 245, "ORD-1", "CAP-1");
        record.refund_pending = amount;
        Ok(RefundReservation::Reserved(record))
    });
    store.expect_settle_refund().times(1).returning(|r, amount| {
        let mut record = closed_record(r.as_str(), "USD", 245, "ORD-1", "CAP-1");
        record.refunded = amount;
        Ok(record)
    });
    let mut processor = processor_reporting(ProcessorOrderStatus::Completed);
    processor.expect_refund_capture().times(1).returning(|capture_id, currency, amount| {
        assert_eq!(capture_id, "CAP-1");
        assert_eq!(currency, "USD");
        assert_eq!(amount, Cents::from(100));
        Ok(RefundReceipt {
            id: "RF-1".into(),
            status: RefundStatus::Completed,
        })
    });
    let body = json!({"reference": "ref-1", "currency": "usd", "amount": "1.00"});
    let req = TestRequest::post().uri("/refund").set_json(body);
    let (status, body) = send_request(req, configure_ledger(store, processor)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"outcome": "refunded", "refund_id": "RF-1", "total_refunded": "1.00"}));
}

#[actix_web::test]
async fn order_record_not_found() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order().returning(|_| Ok(None));
    let req = TestRequest::get().uri("/order/ref-404");
    let (status, body) = send_request(req, configure_ledger(store, MockProcessor::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[actix_web::test]
async fn order_record_includes_the_snapshot() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/order/ref-1");
    let (status, body) = send_request(req, configure_ledger(store_with_paid_order(), MockProcessor::new())).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["reference_id"], ReferenceId::from("ref-1").as_str());
    assert_eq!(body["order_id"], "ORD-1");
    assert_eq!(body["capture_id"], "CAP-1");
    assert_eq!(body["active"], false);
}
