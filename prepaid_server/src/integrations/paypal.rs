use log::*;
use paypal_tools::{Money, PayPalApi, PayPalApiError, PayPalConfig, PayPalOrder};
use prepaid_engine::{
    db_types::Cents,
    processor_types::{ProcessorOrder, ProcessorOrderStatus, PurchaseUnit, RefundReceipt, RefundStatus},
    PaymentProcessor,
    ProcessorError,
};

/// Lets the engine talk to PayPal through [`PayPalApi`].
#[derive(Clone)]
pub struct PayPalProcessor {
    api: PayPalApi,
}

impl PayPalProcessor {
    pub fn new(config: PayPalConfig) -> Result<Self, PayPalApiError> {
        let api = PayPalApi::new(config)?;
        Ok(Self { api })
    }

    pub fn api(&self) -> &PayPalApi {
        &self.api
    }
}

impl PaymentProcessor for PayPalProcessor {
    async fn refresh_credential(&self) -> Result<(), ProcessorError> {
        self.api.refresh_token().await.map(|_| ()).map_err(|e| {
            warn!("🅿️ Could not refresh the PayPal access token. {e}");
            ProcessorError::Authentication(e.to_string())
        })
    }

    async fn fetch_order(&self, order_id: &str) -> Result<ProcessorOrder, ProcessorError> {
        let order = self.api.get_order(order_id).await.map_err(processor_error)?;
        Ok(processor_order(order))
    }

    async fn refund_capture(
        &self,
        capture_id: &str,
        currency: &str,
        amount: Cents,
    ) -> Result<RefundReceipt, ProcessorError> {
        let refund = self
            .api
            .refund_capture(capture_id, Money::new(currency, amount.to_string()))
            .await
            .map_err(processor_error)?;
        Ok(RefundReceipt { id: refund.id, status: RefundStatus::from(refund.status.as_str()) })
    }
}

pub fn processor_order(order: PayPalOrder) -> ProcessorOrder {
    let purchase_units = order
        .purchase_units
        .iter()
        .map(|u| PurchaseUnit::new(&u.reference_id, &u.amount.currency_code, &u.amount.value))
        .collect();
    ProcessorOrder {
        id: order.id,
        status: ProcessorOrderStatus::from(order.status.as_str()),
        purchase_units,
        raw: order.raw,
    }
}

pub fn processor_error(e: PayPalApiError) -> ProcessorError {
    match e {
        PayPalApiError::Unauthorized(s) => ProcessorError::Authentication(s),
        PayPalApiError::NotFound(s) => ProcessorError::NotFound(s),
        PayPalApiError::Initialization(s) |
        PayPalApiError::RestRequestError(s) |
        PayPalApiError::RestResponseError(s) => {
            ProcessorError::Transport(s)
        },
        PayPalApiError::QueryError { status, message } if status >= 500 => {
            ProcessorError::Transport(format!("Error {status}. {message}"))
        },
        PayPalApiError::QueryError { status, message } => {
            ProcessorError::InvalidResponse(format!("Error {status}. {message}"))
        },
        PayPalApiError::JsonError(s) => ProcessorError::InvalidResponse(s),
    }
}
