use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db_types::{Cents, ReferenceId};

/// The payment status the host application sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Closed,
    Unknown,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "UNPAID"),
            PaymentStatus::Paid => write!(f, "PAID"),
            PaymentStatus::Closed => write!(f, "CLOSED"),
            PaymentStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentUnit {
    pub reference_id: ReferenceId,
    pub currency: String,
    pub amount: Cents,
}

impl PaymentUnit {
    pub fn new(reference_id: ReferenceId, currency: &str, amount: Cents) -> Self {
        Self { reference_id, currency: currency.to_string(), amount }
    }
}

/// A payment status report, as returned from queries and passed to the change notifier.
///
/// `verified` is true when the status was decided after cross-checking the processor's order against the local
/// record. Statuses taken at face value from the buyer's browser are unverified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub status: PaymentStatus,
    pub unit: Option<PaymentUnit>,
    pub verified: bool,
    pub message: String,
}

impl PaymentResult {
    pub fn verified<S: Display>(status: PaymentStatus, message: S) -> Self {
        Self { status, unit: None, verified: true, message: format!("(Verified) {message}") }
    }

    pub fn unverified<S: Display>(status: PaymentStatus, message: S) -> Self {
        Self { status, unit: None, verified: false, message: format!("(Unverified) {message}") }
    }

    pub fn with_unit(mut self, unit: PaymentUnit) -> Self {
        self.unit = Some(unit);
        self
    }
}

/// Everything a caller needs to start a processor-hosted checkout for a freshly opened order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutParameters {
    pub reference: ReferenceId,
    pub currency: String,
    pub amount: Cents,
    /// Where the buyer-side checkout must report approve/cancel/error events.
    pub notify_url: String,
    /// The purchase units to hand to the processor when the buyer-side checkout creates the order.
    pub purchase_units: serde_json::Value,
}

impl CheckoutParameters {
    pub fn new(reference: ReferenceId, currency: &str, amount: Cents, notify_url: String) -> Self {
        let purchase_units = json!([{
            "reference_id": reference.as_str(),
            "amount": {
                "currency_code": currency,
                "value": amount.to_string(),
            }
        }]);
        Self { reference, currency: currency.to_string(), amount, notify_url, purchase_units }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefundOutcome {
    /// The requested amount was zero or negative. Nothing was sent to the processor and nothing was recorded.
    NothingToDo,
    Refunded { refund_id: String, total_refunded: Cents },
}
