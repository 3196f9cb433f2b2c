use cucumber::{then, when};
use prepaid_engine::{
    db_types::{Cents, ReferenceId},
    payment_objects::PaymentStatus,
    CheckoutError,
    OrderStore,
};

use crate::cucumber::GatewayWorld;

fn checkout_code(e: &CheckoutError) -> &'static str {
    match e {
        CheckoutError::EmptyReference => "EMPTY_REFERENCE",
        CheckoutError::InvalidReference(_) => "INVALID_REFERENCE",
        CheckoutError::InvalidCurrency(_) => "INVALID_CURRENCY",
        CheckoutError::InvalidAmount(_) => "INVALID_AMOUNT",
        CheckoutError::DuplicateReference(_) => "DUPLICATE_REFERENCE",
        CheckoutError::StorageError(_) => "STORAGE_ERROR",
    }
}

fn cents(value: &str) -> Cents {
    value.parse().expect("Not a valid amount")
}

#[when(expr = "I open order {string} for {word} {word}")]
async fn open_order(world: &mut GatewayWorld, reference: String, currency: String, amount: String) {
    let amount = amount.parse::<f64>().expect("Not a valid amount");
    let result = world.gateway().checkout.open_order(&reference, &currency, amount).await;
    world.record(result, checkout_code);
}

#[when(expr = "the buyer approves order {word} for {string} with capture {word}")]
async fn approve(world: &mut GatewayWorld, order_id: String, reference: String, capture_id: String) {
    let reference = ReferenceId::from(reference);
    let result = world.gateway().approvals.approve(&order_id, &reference, &capture_id).await;
    world.record(result, |e| e.code());
}

#[when(expr = "the buyer cancels {string}")]
async fn cancel(world: &mut GatewayWorld, reference: String) {
    let result = world.gateway().approvals.cancel(&ReferenceId::from(reference)).await;
    world.record(result, |e| e.code());
}

#[when(expr = "the checkout reports an error for {string}")]
async fn error_reported(world: &mut GatewayWorld, reference: String) {
    let result = world.gateway().approvals.error_reported(&ReferenceId::from(reference)).await;
    world.record(result, |e| e.code());
}

#[when(expr = "I refund {word} {word} for {string}")]
async fn refund(world: &mut GatewayWorld, currency: String, amount: String, reference: String) {
    let reference = ReferenceId::from(reference);
    let result = world.gateway().ledger.refund(&reference, Some(&currency), cents(&amount)).await;
    world.record(result, |e| e.code());
}

#[then("the call succeeds")]
async fn call_succeeds(world: &mut GatewayWorld) {
    assert_eq!(world.last_outcome, Some(Ok(())));
}

#[then(expr = "the call fails with {word}")]
async fn call_fails(world: &mut GatewayWorld, code: String) {
    assert_eq!(world.last_outcome, Some(Err(code)));
}

#[then(expr = "the payment result for {string} is {word}")]
async fn payment_result(world: &mut GatewayWorld, reference: String, status: String) {
    let result = world.gateway().ledger.payment_result(&ReferenceId::from(reference)).await.unwrap();
    assert_eq!(result.status.to_string(), status);
}

#[then(expr = "the payment result for {string} is {word} at {word} {word}")]
async fn payment_result_with_unit(
    world: &mut GatewayWorld,
    reference: String,
    status: String,
    currency: String,
    amount: String,
) {
    let result = world.gateway().ledger.payment_result(&ReferenceId::from(reference)).await.unwrap();
    assert_eq!(result.status.to_string(), status);
    let unit = result.unit.expect("No payment unit in result");
    assert_eq!(unit.currency, currency);
    assert_eq!(unit.amount, cents(&amount));
}

#[then(expr = "{string} has {word} refunded")]
async fn refunded(world: &mut GatewayWorld, reference: String, amount: String) {
    let record = world.gateway().db.fetch_order(&ReferenceId::from(reference)).await.unwrap().unwrap();
    assert_eq!(record.refunded, cents(&amount));
}

#[then(expr = "{string} is refundable")]
async fn is_refundable(world: &mut GatewayWorld, reference: String) {
    assert!(world.gateway().ledger.is_refundable(&ReferenceId::from(reference)).await);
}

#[then(expr = "{string} is not refundable")]
async fn is_not_refundable(world: &mut GatewayWorld, reference: String) {
    assert!(!world.gateway().ledger.is_refundable(&ReferenceId::from(reference)).await);
}

#[then(expr = "the order {string} is still pending")]
async fn still_pending(world: &mut GatewayWorld, reference: String) {
    let record = world.gateway().db.fetch_order(&ReferenceId::from(reference)).await.unwrap().unwrap();
    assert!(record.active);
    assert!(record.order_id.is_empty());
    assert!(record.closed_at.is_none());
}

#[then(expr = "the order {string} is closed with processor order {word}")]
async fn closed(world: &mut GatewayWorld, reference: String, order_id: String) {
    let record = world.gateway().db.fetch_order(&ReferenceId::from(reference)).await.unwrap().unwrap();
    assert!(!record.active);
    assert_eq!(record.order_id, order_id);
    assert!(record.closed_at.is_some());
}

#[then(expr = "the order {string} has a total of {word} {word}")]
async fn order_total(world: &mut GatewayWorld, reference: String, currency: String, amount: String) {
    let record = world.gateway().db.fetch_order(&ReferenceId::from(reference)).await.unwrap().unwrap();
    assert_eq!(record.currency, currency);
    assert_eq!(record.total, cents(&amount));
}

#[then(expr = "the change notifier was told {string} is {word}")]
async fn notified(world: &mut GatewayWorld, reference: String, status: String) {
    let notifications = world.notifications.lock().unwrap();
    let last = notifications.last().expect("The change notifier was never called");
    assert_eq!(last.reference.as_str(), reference);
    assert_eq!(last.result.status.to_string(), status);
}

#[then(expr = "the change notifier was told {string} is {word} \\(unverified\\)")]
async fn notified_unverified(world: &mut GatewayWorld, reference: String, status: String) {
    let notifications = world.notifications.lock().unwrap();
    let last = notifications.last().expect("The change notifier was never called");
    assert_eq!(last.reference.as_str(), reference);
    assert_eq!(last.result.status.to_string(), status);
    assert!(!last.result.verified);
}

#[then(expr = "the change notifier was called {int} time(s)")]
async fn notifier_count(world: &mut GatewayWorld, count: usize) {
    assert_eq!(world.notifications.lock().unwrap().len(), count);
}

#[then(expr = "{int} PAID notification(s) was/were sent")]
async fn paid_count(world: &mut GatewayWorld, count: usize) {
    let notifications = world.notifications.lock().unwrap();
    let paid = notifications.iter().filter(|n| n.result.status == PaymentStatus::Paid).count();
    assert_eq!(paid, count);
}
