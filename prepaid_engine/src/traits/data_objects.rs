use serde::{Deserialize, Serialize};

use crate::db_types::OrderRecord;

/// The result of the conditional approval commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitOutcome {
    /// This call flipped the record from pending to closed. Contains the updated record.
    Committed(OrderRecord),
    /// The record was no longer pending when the update ran, so nothing was written. Another approval got there
    /// first.
    AlreadyClosed,
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// The result of trying to reserve part of a capture for a refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundReservation {
    /// The amount is now held in `refund_pending`. Contains the updated record.
    Reserved(OrderRecord),
    /// The reservation would take completed plus pending refunds past the ceiling, or the order is not a closed,
    /// captured order. Nothing was written.
    Exceeded,
}
