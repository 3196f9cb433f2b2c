use thiserror::Error;

use crate::{
    db_types::{Cents, ReferenceId},
    processor_types::{ProcessorOrderStatus, RefundStatus},
    traits::{OrderStoreError, ProcessorError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("A reference id is required to open an order")]
    EmptyReference,
    #[error("Invalid reference id. {0}")]
    InvalidReference(String),
    #[error("'{0}' is not a three-letter currency code")]
    InvalidCurrency(String),
    #[error("Invalid order amount. {0}")]
    InvalidAmount(String),
    #[error("An order with reference {0} already exists")]
    DuplicateReference(ReferenceId),
    #[error("Could not store the order. {0}")]
    StorageError(OrderStoreError),
}

impl From<OrderStoreError> for CheckoutError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::DuplicateReference(r) => CheckoutError::DuplicateReference(r),
            e => CheckoutError::StorageError(e),
        }
    }
}

/// Why an approval was not committed.
///
/// None of these leave a partial write behind: the order record is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApprovalRejection {
    #[error("The notification did not include a reference id")]
    MissingReference,
    #[error("The approval did not include a processor order id")]
    MissingOrderId,
    #[error("The approval did not include a capture id")]
    MissingCaptureId,
    #[error("Could not refresh the processor credential. {0}")]
    AuthFailure(ProcessorError),
    #[error("Could not fetch the order from the processor. {0}")]
    RemoteFetchFailure(ProcessorError),
    #[error("The processor order has {0} purchase units. Only single-unit orders are supported")]
    BundlingUnsupported(usize),
    #[error("The processor order belongs to reference '{reported}', not {expected}")]
    ReferenceMismatch { expected: ReferenceId, reported: String },
    #[error("Could not load the local order record. {0}")]
    LocalRecordUnavailable(String),
    #[error("Could not parse the amount charged, '{0}'")]
    AmountUnparsable(String),
    #[error("Payment doesn't match expectation. Expected {expected}, but the processor charged {charged}")]
    AmountMismatch { expected: String, charged: String },
    #[error("The order is not paid yet. The processor reports it as {0}")]
    NotYetPaid(ProcessorOrderStatus),
    #[error("Could not record the confirmed payment. {0}")]
    CommitFailed(OrderStoreError),
    #[error("The order had already been closed by another approval")]
    ConcurrentCommitLost,
}

impl ApprovalRejection {
    /// A stable, machine-readable code for the rejection.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingReference => "MISSING_REFERENCE",
            Self::MissingOrderId => "MISSING_ORDER_ID",
            Self::MissingCaptureId => "MISSING_CAPTURE_ID",
            Self::AuthFailure(_) => "AUTH_FAILURE",
            Self::RemoteFetchFailure(_) => "REMOTE_FETCH_FAILURE",
            Self::BundlingUnsupported(_) => "BUNDLING_UNSUPPORTED",
            Self::ReferenceMismatch { .. } => "REFERENCE_MISMATCH",
            Self::LocalRecordUnavailable(_) => "LOCAL_RECORD_UNAVAILABLE",
            Self::AmountUnparsable(_) => "AMOUNT_UNPARSABLE",
            Self::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            Self::NotYetPaid(_) => "NOT_YET_PAID",
            Self::CommitFailed(_) => "COMMIT_FAILED",
            Self::ConcurrentCommitLost => "CONCURRENT_COMMIT_LOST",
        }
    }

    /// True if repeating the same call later may succeed. False means the attempt should be investigated rather than
    /// retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AuthFailure(_)
                | Self::RemoteFetchFailure(_)
                | Self::LocalRecordUnavailable(_)
                | Self::NotYetPaid(_)
                | Self::CommitFailed(_)
        )
    }

    /// Caller errors are rejected before any remote call is made.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::MissingReference | Self::MissingOrderId | Self::MissingCaptureId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("A reference id is required")]
    MissingReference,
    #[error("The refund amount is not a valid amount. {0}")]
    InvalidAmount(String),
    #[error("Could not query the order store. {0}")]
    StorageError(#[from] OrderStoreError),
    #[error("There is no capture id associated with reference {0}")]
    NoCaptureID(ReferenceId),
    #[error("Could not fetch the order from the processor. {0}")]
    RemoteFetchFailure(ProcessorError),
    #[error("The processor order is not usable. {0}")]
    InvalidProcessorOrder(String),
    #[error("The order is not paid. The processor reports it as {0}")]
    OrderNotPaid(ProcessorOrderStatus),
    #[error("Could not parse the amount paid, '{0}'")]
    AmountUnparsable(String),
    #[error("Refund rejected. {0}")]
    RefundExceedsCaptured(String),
    #[error("The processor refund call failed. {0}")]
    RemoteRefundFailure(ProcessorError),
    #[error("The processor reports the refund as {0}, not COMPLETED")]
    RefundNotCompleted(RefundStatus),
}

impl LedgerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingReference => "MISSING_REFERENCE",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::NoCaptureID(_) => "NO_CAPTURE_ID",
            Self::RemoteFetchFailure(_) => "REMOTE_FETCH_FAILURE",
            Self::InvalidProcessorOrder(_) => "INVALID_PROCESSOR_ORDER",
            Self::OrderNotPaid(_) => "ORDER_NOT_PAID",
            Self::AmountUnparsable(_) => "AMOUNT_UNPARSABLE",
            Self::RefundExceedsCaptured(_) => "REFUND_EXCEEDS_CAPTURED",
            Self::RemoteRefundFailure(_) => "REMOTE_REFUND_FAILURE",
            Self::RefundNotCompleted(_) => "REFUND_NOT_COMPLETED",
        }
    }

    pub(crate) fn exceeds(refunded: Cents, requested: Cents, paid: Cents) -> Self {
        Self::RefundExceedsCaptured(format!(
            "{refunded} has already been refunded or is pending, and another {requested} would exceed the {paid} paid"
        ))
    }
}
