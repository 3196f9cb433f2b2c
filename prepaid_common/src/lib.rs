mod cents;

pub mod helpers;
pub mod op;
mod secret;

pub use cents::{Cents, CentsConversionError, CURRENCY_CODE_LEN};
pub use secret::Secret;
