mod api;
mod config;
mod error;

mod data_objects;

pub use api::PayPalApi;
pub use config::PayPalConfig;
pub use data_objects::{AccessToken, Money, PayPalOrder, PayPalPurchaseUnit, PayPalRefund};
pub use error::PayPalApiError;
