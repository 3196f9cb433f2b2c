//! `SqliteDatabase` is a concrete implementation of a prepaid order engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`OrderStore`] trait.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{db_url, new_pool, orders};
use crate::{
    db_types::{ApprovalCommit, Cents, NewOrderRecord, OrderRecord, ReferenceId},
    traits::{CommitOutcome, OrderStore, OrderStoreError, RefundReservation},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderStore for SqliteDatabase {
    async fn insert_order(&self, order: NewOrderRecord) -> Result<OrderRecord, OrderStoreError> {
        // The UNIQUE constraint arbitrates duplicate races
        let mut conn = self.pool.acquire().await?;
        let record = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order [{}] inserted with id {}", record.reference_id, record.id);
        Ok(record)
    }

    async fn fetch_order(&self, reference: &ReferenceId) -> Result<Option<OrderRecord>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let record = orders::fetch_order_by_reference(reference, &mut conn).await?;
        Ok(record)
    }

    async fn commit_approval(
        &self,
        reference: &ReferenceId,
        commit: ApprovalCommit,
    ) -> Result<CommitOutcome, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let outcome = orders::commit_approval(reference, commit, &mut tx).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn reserve_refund(
        &self,
        reference: &ReferenceId,
        amount: Cents,
        ceiling: Cents,
    ) -> Result<RefundReservation, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let reservation = orders::reserve_refund(reference, amount, ceiling, &mut tx).await?;
        tx.commit().await?;
        Ok(reservation)
    }

    async fn settle_refund(&self, reference: &ReferenceId, amount: Cents) -> Result<OrderRecord, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let record = orders::settle_refund(reference, amount, &mut tx).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn release_refund(&self, reference: &ReferenceId, amount: Cents) -> Result<OrderRecord, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let record = orders::release_refund(reference, amount, &mut tx).await?;
        tx.commit().await?;
        Ok(record)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `PPG_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// The URL of the database
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. This is idempotent.
    pub async fn migrate(&self) -> Result<(), OrderStoreError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| OrderStoreError::DatabaseError(format!("Migration failed. {e}")))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Closes all connections in the pool. Any further calls on this object will fail.
    pub async fn close(&mut self) -> Result<(), OrderStoreError> {
        self.pool.close().await;
        Ok(())
    }
}
