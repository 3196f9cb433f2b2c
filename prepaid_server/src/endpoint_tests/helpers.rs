use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::Utc;
use log::debug;
use prepaid_engine::{
    db_types::{Cents, OrderRecord, ReferenceId},
    processor_types::{ProcessorOrder, ProcessorOrderStatus, PurchaseUnit},
};

pub async fn send_request(req: TestRequest, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    debug!("Response: {status} {body}");
    (status, body)
}

pub fn pending_record(reference: &str, currency: &str, total: i64) -> OrderRecord {
    OrderRecord {
        id: 1,
        reference_id: ReferenceId::from(reference),
        order_id: String::new(),
        capture_id: String::new(),
        currency: currency.to_string(),
        total: Cents::from(total),
        refunded: Cents::ZERO,
        refund_pending: Cents::ZERO,
        order_details: String::new(),
        created_at: Utc::now(),
        closed_at: None,
        active: true,
    }
}

pub fn closed_record(reference: &str, currency: &str, total: i64, order_id: &str, capture_id: &str) -> OrderRecord {
    OrderRecord {
        order_id: order_id.to_string(),
        capture_id: capture_id.to_string(),
        closed_at: Some(Utc::now()),
        active: false,
        ..pending_record(reference, currency, total)
    }
}

pub fn remote_order(
    id: &str,
    status: ProcessorOrderStatus,
    reference: &str,
    currency: &str,
    value: &str,
) -> ProcessorOrder {
    ProcessorOrder {
        id: id.to_string(),
        status,
        purchase_units: vec![PurchaseUnit::new(reference, currency, value)],
        raw: format!(r#"{{"id":"{id}"}}"#),
    }
}
