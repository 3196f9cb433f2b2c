//! # Interface contracts for the engine's collaborators.
//!
//! The reconciler and the refund ledger never talk to a database or a payment processor directly. Instead, they are
//! generic over two narrow capability traits:
//!
//! * [`OrderStore`] defines the persistence operations for [`OrderRecord`](crate::db_types::OrderRecord)s. The
//!   two concurrency-sensitive operations, the one-shot approval commit and the refund reservation, are expressed as
//!   conditional writes so that a backend can enforce them atomically without an application-level lock.
//! * [`PaymentProcessor`] is the remote processor: credential refresh, order lookup and capture refunds.
//!
//! [`SqliteDatabase`](crate::SqliteDatabase) implements [`OrderStore`]. Processor implementations live with the host
//! (see the `paypal_tools` crate), and tests use a scripted processor from `test_utils`.
mod data_objects;
mod order_store;
mod payment_processor;

pub use data_objects::{CommitOutcome, RefundReservation};
pub use order_store::{OrderStore, OrderStoreError};
pub use payment_processor::{PaymentProcessor, ProcessorError};
