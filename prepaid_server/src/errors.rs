use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use prepaid_engine::{CheckoutError, LedgerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Requests from {0} are not allowed.")]
    ForbiddenPeer(String),
    #[error("Could not open order. {0}")]
    CheckoutError(#[from] CheckoutError),
    #[error("{0}")]
    LedgerError(#[from] LedgerError),
}

impl ServerError {
    /// A stable, machine-readable code for the error, where the engine provides one.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CheckoutError(e) => checkout_code(e),
            Self::LedgerError(e) => e.code(),
            Self::ForbiddenPeer(_) => "FORBIDDEN",
            Self::NoRecordFound(_) => "NOT_FOUND",
            _ => "SERVER_ERROR",
        }
    }
}

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

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ForbiddenPeer(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CheckoutError(e) => match e {
                CheckoutError::DuplicateReference(_) => StatusCode::CONFLICT,
                CheckoutError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::LedgerError(e) => match e {
                LedgerError::MissingReference | LedgerError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                LedgerError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                LedgerError::NoCaptureID(_) | LedgerError::OrderNotPaid(_) | LedgerError::RefundExceedsCaptured(_) => {
                    StatusCode::CONFLICT
                },
                LedgerError::RemoteFetchFailure(_) |
                LedgerError::InvalidProcessorOrder(_) |
                LedgerError::AmountUnparsable(_) |
                LedgerError::RemoteRefundFailure(_) |
                LedgerError::RefundNotCompleted(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string(), "code": self.code() }).to_string())
    }
}
