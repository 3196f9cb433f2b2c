use log::{debug, trace, warn};
use sqlx::SqliteConnection;

use crate::{
    db_types::{ApprovalCommit, Cents, NewOrderRecord, OrderRecord, ReferenceId},
    traits::{CommitOutcome, OrderStoreError, RefundReservation},
};

/// Inserts a new order record, failing with `DuplicateReference` if the reference already exists.
///
/// The UNIQUE constraint on `reference_id` is the arbiter, so two racing inserts for one reference cannot both land.
pub async fn insert_order(order: NewOrderRecord, conn: &mut SqliteConnection) -> Result<OrderRecord, OrderStoreError> {
    let reference = order.reference_id.clone();
    let records: Vec<OrderRecord> = sqlx::query_as(
        r#"
            INSERT INTO prepaid_orders (
                reference_id,
                currency,
                total,
                created_at
            ) VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order.reference_id)
    .bind(order.currency)
    .bind(order.total.value())
    .bind(order.created_at)
    .fetch_all(conn)
    .await
    .map_err(|e| map_unique_violation(e, &reference))?;
    first_row(records)
        .ok_or_else(|| OrderStoreError::DatabaseError(format!("Insert of [{reference}] returned no row")))
}

/// Statements here are always read with `fetch_all`. A `RETURNING` statement that is not stepped to completion has
/// not finished its write, and keeps the connection's lock.
fn first_row<T>(rows: Vec<T>) -> Option<T> {
    rows.into_iter().next()
}

fn map_unique_violation(e: sqlx::Error, reference: &ReferenceId) -> OrderStoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            debug!("🗃️ Order [{reference}] already exists. Not inserting it again.");
            return OrderStoreError::DuplicateReference(reference.clone());
        }
    }
    OrderStoreError::from(e)
}

/// Returns the order record for the corresponding reference id
pub async fn fetch_order_by_reference(
    reference: &ReferenceId,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderRecord>, sqlx::Error> {
    let orders: Vec<OrderRecord> = sqlx::query_as("SELECT * FROM prepaid_orders WHERE reference_id = $1")
        .bind(reference.as_str())
        .fetch_all(conn)
        .await?;
    Ok(first_row(orders))
}

/// Closes a pending order. This is a single conditional update; if the order is no longer active, no rows change and
/// `AlreadyClosed` is returned.
pub async fn commit_approval(
    reference: &ReferenceId,
    commit: ApprovalCommit,
    conn: &mut SqliteConnection,
) -> Result<CommitOutcome, OrderStoreError> {
    let rows: Vec<OrderRecord> = sqlx::query_as(
        r#"
            UPDATE prepaid_orders
            SET order_id = $1,
                capture_id = $2,
                order_details = $3,
                closed_at = $4,
                active = FALSE
            WHERE reference_id = $5 AND active = TRUE
            RETURNING *;
        "#,
    )
    .bind(commit.order_id)
    .bind(commit.capture_id)
    .bind(commit.order_details)
    .bind(commit.closed_at)
    .bind(reference.as_str())
    .fetch_all(conn)
    .await?;
    let updated = first_row(rows);
    let outcome = match updated {
        Some(record) => {
            debug!("🗃️ Order [{reference}] closed with processor order {}", record.order_id);
            CommitOutcome::Committed(record)
        },
        None => {
            debug!("🗃️ Order [{reference}] was not pending. Approval commit skipped.");
            CommitOutcome::AlreadyClosed
        },
    };
    Ok(outcome)
}

/// Adds `amount` to `refund_pending`, provided that completed plus pending refunds stay within `ceiling` and the order
/// total.
pub async fn reserve_refund(
    reference: &ReferenceId,
    amount: Cents,
    ceiling: Cents,
    conn: &mut SqliteConnection,
) -> Result<RefundReservation, OrderStoreError> {
    let rows: Vec<OrderRecord> = sqlx::query_as(
        r#"
            UPDATE prepaid_orders
            SET refund_pending = refund_pending + $1
            WHERE reference_id = $2
              AND active = FALSE
              AND capture_id <> ''
              AND refunded + refund_pending + $3 <= MIN($4, total)
            RETURNING *;
        "#,
    )
    .bind(amount.value())
    .bind(reference.as_str())
    .bind(amount.value())
    .bind(ceiling.value())
    .fetch_all(conn)
    .await?;
    let updated = first_row(rows);
    let reservation = match updated {
        Some(record) => {
            trace!("🗃️ Reserved {amount} against order [{reference}]. {} now pending", record.refund_pending);
            RefundReservation::Reserved(record)
        },
        None => {
            debug!("🗃️ Could not reserve {amount} against order [{reference}] with a ceiling of {ceiling}");
            RefundReservation::Exceeded
        },
    };
    Ok(reservation)
}

/// Moves `amount` out of `refund_pending` and into `refunded`.
pub async fn settle_refund(
    reference: &ReferenceId,
    amount: Cents,
    conn: &mut SqliteConnection,
) -> Result<OrderRecord, OrderStoreError> {
    let rows: Vec<OrderRecord> = sqlx::query_as(
        r#"
            UPDATE prepaid_orders
            SET refunded = refunded + $1,
                refund_pending = refund_pending - $2
            WHERE reference_id = $3 AND refund_pending >= $4
            RETURNING *;
        "#,
    )
    .bind(amount.value())
    .bind(amount.value())
    .bind(reference.as_str())
    .bind(amount.value())
    .fetch_all(conn)
    .await?;
    let updated = first_row(rows);
    updated.ok_or_else(|| {
        warn!("🗃️ Tried to settle a refund of {amount} for [{reference}], but that much was never reserved");
        OrderStoreError::RefundAccountingError(reference.clone(), format!("No reservation of {amount} to settle"))
    })
}

/// Removes `amount` from `refund_pending` without touching `refunded`.
pub async fn release_refund(
    reference: &ReferenceId,
    amount: Cents,
    conn: &mut SqliteConnection,
) -> Result<OrderRecord, OrderStoreError> {
    let rows: Vec<OrderRecord> = sqlx::query_as(
        r#"
            UPDATE prepaid_orders
            SET refund_pending = refund_pending - $1
            WHERE reference_id = $2 AND refund_pending >= $3
            RETURNING *;
        "#,
    )
    .bind(amount.value())
    .bind(reference.as_str())
    .bind(amount.value())
    .fetch_all(conn)
    .await?;
    let updated = first_row(rows);
    updated.ok_or_else(|| {
        warn!("🗃️ Tried to release a reservation of {amount} for [{reference}], but that much was never reserved");
        OrderStoreError::RefundAccountingError(reference.clone(), format!("No reservation of {amount} to release"))
    })
}
