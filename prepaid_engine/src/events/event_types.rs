use serde::{Deserialize, Serialize};

use crate::{db_types::ReferenceId, gateway_api::payment_objects::PaymentResult};

/// Emitted every time the engine decides something about the payment status of an order: a committed approval, a
/// rejected one, or a buyer-side cancel/error report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeEvent {
    pub reference: ReferenceId,
    pub result: PaymentResult,
}

impl StatusChangeEvent {
    pub fn new(reference: ReferenceId, result: PaymentResult) -> Self {
        Self { reference, result }
    }
}
