use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayPalApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("PayPal rejected our credentials: {0}")]
    Unauthorized(String),
    #[error("PayPal could not find {0}")]
    NotFound(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
