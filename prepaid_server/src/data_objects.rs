use prepaid_engine::{
    db_types::{Cents, ReferenceId},
    payment_objects::CheckoutParameters,
};
use serde::{Deserialize, Serialize};

/// The form the buyer-side checkout posts when the PayPal button closes. Every field is optional on the wire, so
/// that a missing field gets the `BAD_REQUEST` callback response rather than actix's generic form error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloseNotification {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub capture_id: String,
    /// One of `approve`, `cancel` or `error`.
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Success,
    Canceled,
    Error,
}

/// The body of every `onClose` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub status: CallbackStatus,
    pub message: String,
}

impl CallbackResponse {
    pub fn new(status: CallbackStatus, message: &str) -> Self {
        Self { status, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub reference: String,
    pub currency: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    #[serde(flatten)]
    pub parameters: CheckoutParameters,
    /// Where the buyer-side page loads the PayPal JS SDK from.
    pub sdk_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    pub reference: ReferenceId,
    /// Defaults to the currency the order was opened in.
    #[serde(default)]
    pub currency: Option<String>,
    pub amount: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundableResponse {
    pub reference: ReferenceId,
    pub refundable: bool,
}
