//! A [`PaymentProcessor`] whose answers are scripted by the test.
//!
//! Clones share state, so a test can keep one handle to steer the processor while the API under test owns another.
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use serde_json::json;

use crate::{
    db_types::Cents,
    processor_types::{ProcessorOrder, ProcessorOrderStatus, PurchaseUnit, RefundReceipt, RefundStatus},
    traits::{PaymentProcessor, ProcessorError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedRefund {
    pub capture_id: String,
    pub currency: String,
    pub amount: Cents,
}

#[derive(Default)]
struct ScriptState {
    orders: Mutex<HashMap<String, ProcessorOrder>>,
    refund_script: Mutex<VecDeque<Result<RefundStatus, ProcessorError>>>,
    refunds: Mutex<Vec<IssuedRefund>>,
    auth_fails: AtomicBool,
    fetch_calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

#[derive(Clone, Default)]
pub struct ScriptedProcessor {
    state: Arc<ScriptState>,
}

/// Builds a processor order with the given purchase units. The raw payload mirrors the processor's JSON shape.
pub fn scripted_order(id: &str, status: &str, units: Vec<PurchaseUnit>) -> ProcessorOrder {
    let raw_units = units
        .iter()
        .map(|u| json!({ "reference_id": u.reference_id, "amount": { "currency_code": u.currency, "value": u.value } }))
        .collect::<Vec<_>>();
    let raw = json!({ "id": id, "status": status, "purchase_units": raw_units }).to_string();
    ProcessorOrder { id: id.to_string(), status: ProcessorOrderStatus::from(status), purchase_units: units, raw }
}

impl ScriptedProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_order(&self, order: ProcessorOrder) {
        self.state.orders.lock().unwrap().insert(order.id.clone(), order);
    }

    /// Convenience for the common case: a single-unit order.
    pub fn add_simple_order(&self, id: &str, reference: &str, currency: &str, value: &str, status: &str) {
        self.add_order(scripted_order(id, status, vec![PurchaseUnit::new(reference, currency, value)]));
    }

    pub fn set_order_status(&self, id: &str, status: &str) {
        if let Some(order) = self.state.orders.lock().unwrap().get_mut(id) {
            order.status = ProcessorOrderStatus::from(status);
        }
    }

    pub fn fail_auth(&self, fail: bool) {
        self.state.auth_fails.store(fail, Ordering::SeqCst);
    }

    /// Every remote call sleeps for `delay` before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.state.delay.lock().unwrap() = delay;
    }

    /// Queues the outcome of the next refund call. With nothing queued, refunds complete.
    pub fn push_refund_response(&self, response: Result<RefundStatus, ProcessorError>) {
        self.state.refund_script.lock().unwrap().push_back(response);
    }

    pub fn refunds(&self) -> Vec<IssuedRefund> {
        self.state.refunds.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.state.fetch_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.state.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl PaymentProcessor for ScriptedProcessor {
    async fn refresh_credential(&self) -> Result<(), ProcessorError> {
        self.pause().await;
        if self.state.auth_fails.load(Ordering::SeqCst) {
            return Err(ProcessorError::Authentication("invalid client credentials".into()));
        }
        Ok(())
    }

    async fn fetch_order(&self, order_id: &str) -> Result<ProcessorOrder, ProcessorError> {
        self.pause().await;
        self.state.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let order = self.state.orders.lock().unwrap().get(order_id).cloned();
        order.ok_or_else(|| ProcessorError::NotFound(format!("order {order_id}")))
    }

    async fn refund_capture(
        &self,
        capture_id: &str,
        currency: &str,
        amount: Cents,
    ) -> Result<RefundReceipt, ProcessorError> {
        self.pause().await;
        let scripted = self.state.refund_script.lock().unwrap().pop_front();
        let status = scripted.unwrap_or(Ok(RefundStatus::Completed))?;
        let mut refunds = self.state.refunds.lock().unwrap();
        refunds.push(IssuedRefund { capture_id: capture_id.to_string(), currency: currency.to_string(), amount });
        Ok(RefundReceipt { id: format!("RF-{}", refunds.len()), status })
    }
}
