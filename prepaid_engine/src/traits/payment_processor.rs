use std::time::Duration;

use thiserror::Error;

use crate::{
    db_types::Cents,
    processor_types::{ProcessorOrder, RefundReceipt},
};

/// The operations the engine needs from the remote payment processor.
///
/// The processor is treated as an external oracle: the engine re-queries it on every verification and never caches
/// what it says.
#[allow(async_fn_in_trait)]
pub trait PaymentProcessor {
    /// Obtains a fresh access credential, replacing any cached one.
    async fn refresh_credential(&self) -> Result<(), ProcessorError>;

    /// Fetches the processor's current view of the order with the processor-assigned id `order_id`.
    async fn fetch_order(&self, order_id: &str) -> Result<ProcessorOrder, ProcessorError>;

    /// Refunds `amount` of `currency` from the capture identified by `capture_id`.
    async fn refund_capture(
        &self,
        capture_id: &str,
        currency: &str,
        amount: Cents,
    ) -> Result<RefundReceipt, ProcessorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    #[error("Could not authenticate with the payment processor. {0}")]
    Authentication(String),
    #[error("The payment processor does not know about {0}")]
    NotFound(String),
    #[error("Could not communicate with the payment processor. {0}")]
    Transport(String),
    #[error("The payment processor did not respond within {0:?}")]
    Timeout(Duration),
    #[error("The payment processor sent a response we could not understand. {0}")]
    InvalidResponse(String),
}
