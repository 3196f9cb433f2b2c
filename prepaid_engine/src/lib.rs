//! Prepaid Order Engine
//!
//! The engine lets a merchant application accept prepaid payments through a third-party payment processor, while
//! keeping its own authoritative record of what was ordered, what the processor confirms was paid, and how much has
//! been refunded.
//!
//! The library is divided into three main sections:
//! 1. Storage behind the [`OrderStore`] trait. SQLite ([`SqliteDatabase`]) is the supported backend. The data types
//!    used in the database are defined in the [`db_types`] module and are public.
//! 2. The remote processor, which the engine only sees through the [`PaymentProcessor`] trait.
//! 3. The public API ([`mod@gateway_api`]): opening orders, reconciling buyer-side approvals against the processor, and
//!    the status/refund ledger.
//!
//! Status changes are reported to a single host-supplied subscriber via the [`events::ChangeNotifier`]. Hosts that
//! want to move slow work off the request path can relay those events through an [`events::EventHandler`].
pub mod db_types;
pub mod events;
pub mod gateway_api;
pub mod processor_types;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use gateway_api::{
    approval_api::ApprovalApi,
    checkout_api::CheckoutApi,
    errors::{ApprovalRejection, CheckoutError, LedgerError},
    ledger_api::LedgerApi,
    payment_objects,
    EngineOptions,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{CommitOutcome, OrderStore, OrderStoreError, PaymentProcessor, ProcessorError, RefundReservation};
