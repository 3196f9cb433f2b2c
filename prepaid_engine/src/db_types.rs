use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use prepaid_common::Cents;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Longest reference id the store will accept. Processor reference fields are capped at 127 characters, and a longer
/// id could never be matched against a processor order.
pub const MAX_REFERENCE_LEN: usize = 127;

//--------------------------------------      ReferenceId      ---------------------------------------------------------
/// The caller-chosen correlation key for an order. This is the primary external identity of an [`OrderRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ReferenceId(pub String);

impl FromStr for ReferenceId {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for ReferenceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ReferenceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for ReferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ReferenceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//--------------------------------------      OrderRecord      ---------------------------------------------------------
/// One row per reference id.
///
/// A record is created `active` with empty processor identifiers. It is closed exactly once, when an approval is
/// verified against the processor and committed, after which only the refund columns change.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub reference_id: ReferenceId,
    /// Processor-assigned order id. Empty until approved.
    pub order_id: String,
    /// Processor-assigned capture id. Empty until approved. Refunds are issued against this.
    pub capture_id: String,
    pub currency: String,
    pub total: Cents,
    /// Running sum of completed refunds.
    pub refunded: Cents,
    /// Refunds that have been reserved against the capture but not yet confirmed by the processor.
    pub refund_pending: Cents,
    /// Last-known processor order payload, kept for audit.
    pub order_details: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl OrderRecord {
    pub fn is_pending(&self) -> bool {
        self.active
    }

    pub fn has_order_id(&self) -> bool {
        !self.order_id.is_empty()
    }

    pub fn has_capture_id(&self) -> bool {
        !self.capture_id.is_empty()
    }
}

//--------------------------------------     NewOrderRecord    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRecord {
    pub reference_id: ReferenceId,
    pub currency: String,
    pub total: Cents,
    pub created_at: DateTime<Utc>,
}

impl NewOrderRecord {
    pub fn new<R: Into<ReferenceId>>(reference_id: R, currency: &str, total: Cents) -> Self {
        Self { reference_id: reference_id.into(), currency: currency.to_string(), total, created_at: Utc::now() }
    }
}

//--------------------------------------     ApprovalCommit    ---------------------------------------------------------
/// The patch applied to a pending order when its approval is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalCommit {
    pub order_id: String,
    pub capture_id: String,
    pub order_details: String,
    pub closed_at: DateTime<Utc>,
}

impl ApprovalCommit {
    pub fn new(order_id: &str, capture_id: &str, order_details: String) -> Self {
        Self {
            order_id: order_id.to_string(),
            capture_id: capture_id.to_string(),
            order_details,
            closed_at: Utc::now(),
        }
    }
}
