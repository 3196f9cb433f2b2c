use thiserror::Error;

use crate::{
    db_types::{ApprovalCommit, Cents, NewOrderRecord, OrderRecord, ReferenceId},
    traits::{CommitOutcome, RefundReservation},
};

/// Persistence for order records.
///
/// Backends must guarantee:
/// * at most one record per reference id. Inserting a duplicate is an error, never an upsert.
/// * `commit_approval` is a single conditional write on `active = true`, so exactly one of any number of concurrent
///   commits for the same reference succeeds.
/// * `reserve_refund`, `settle_refund` and `release_refund` are each atomic per reference, and `refunded` is only
///   ever increased by `settle_refund`.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Stores a new, active order record. Fails with [`OrderStoreError::DuplicateReference`] if a record for the
    /// reference already exists; the existing record is left untouched.
    async fn insert_order(&self, order: NewOrderRecord) -> Result<OrderRecord, OrderStoreError>;

    /// Fetches the record for the given reference, if it exists.
    async fn fetch_order(&self, reference: &ReferenceId) -> Result<Option<OrderRecord>, OrderStoreError>;

    /// Closes a pending order, storing the processor identifiers and order snapshot.
    ///
    /// The write only happens if the record is still active. If it is not (or does not exist), the call returns
    /// [`CommitOutcome::AlreadyClosed`] rather than an error.
    async fn commit_approval(
        &self,
        reference: &ReferenceId,
        commit: ApprovalCommit,
    ) -> Result<CommitOutcome, OrderStoreError>;

    /// Holds `amount` against the capture for an in-flight refund.
    ///
    /// Succeeds only if the order is closed, has a capture id, and `refunded + refund_pending + amount` does not
    /// exceed `ceiling` (nor the order total).
    async fn reserve_refund(
        &self,
        reference: &ReferenceId,
        amount: Cents,
        ceiling: Cents,
    ) -> Result<RefundReservation, OrderStoreError>;

    /// Moves a previously reserved `amount` into the completed `refunded` total.
    async fn settle_refund(&self, reference: &ReferenceId, amount: Cents) -> Result<OrderRecord, OrderStoreError>;

    /// Returns a previously reserved `amount` after the remote refund did not complete.
    async fn release_refund(&self, reference: &ReferenceId, amount: Cents) -> Result<OrderRecord, OrderStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderStoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) error: {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since an order with reference {0} already exists")]
    DuplicateReference(ReferenceId),
    #[error("The requested order with reference {0} does not exist")]
    OrderNotFound(ReferenceId),
    #[error("Refund accounting for reference {0} is inconsistent. {1}")]
    RefundAccountingError(ReferenceId, String),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}
