//! Engine-side view of the remote payment processor's data.
//!
//! These types are deliberately narrow: only the fields the reconciler and the refund ledger act on are modelled.
//! The full processor payload is carried verbatim in [`ProcessorOrder::raw`] for the audit snapshot.
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::gateway_api::payment_objects::PaymentStatus;

//--------------------------------------  ProcessorOrderStatus  --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProcessorOrderStatus {
    Created,
    /// The buyer must take further action before the order can be captured.
    Saved,
    Approved,
    Voided,
    Completed,
    PayerActionRequired,
    Other(String),
}

impl ProcessorOrderStatus {
    /// Only these two states mean the buyer has paid.
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Approved | Self::Completed)
    }

    pub fn payment_status(&self) -> PaymentStatus {
        match self {
            Self::Created | Self::Saved => PaymentStatus::Unpaid,
            Self::Approved | Self::Completed => PaymentStatus::Paid,
            _ => PaymentStatus::Unknown,
        }
    }
}

impl FromStr for ProcessorOrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "CREATED" => Self::Created,
            "SAVED" => Self::Saved,
            "APPROVED" => Self::Approved,
            "VOIDED" => Self::Voided,
            "COMPLETED" => Self::Completed,
            "PAYER_ACTION_REQUIRED" => Self::PayerActionRequired,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<&str> for ProcessorOrderStatus {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl Display for ProcessorOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Saved => write!(f, "SAVED"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Voided => write!(f, "VOIDED"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::PayerActionRequired => write!(f, "PAYER_ACTION_REQUIRED"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

//--------------------------------------      PurchaseUnit      --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseUnit {
    pub reference_id: String,
    pub currency: String,
    /// The charged amount exactly as the processor reported it, e.g. `"2.45"`.
    pub value: String,
}

impl PurchaseUnit {
    pub fn new(reference_id: &str, currency: &str, value: &str) -> Self {
        Self { reference_id: reference_id.to_string(), currency: currency.to_string(), value: value.to_string() }
    }
}

//--------------------------------------     ProcessorOrder     --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorOrder {
    pub id: String,
    pub status: ProcessorOrderStatus,
    pub purchase_units: Vec<PurchaseUnit>,
    /// The full order payload as returned by the processor.
    pub raw: String,
}

impl ProcessorOrder {
    /// The single purchase unit of a non-bundled order. Returns `None` for empty or bundled orders.
    pub fn single_unit(&self) -> Option<&PurchaseUnit> {
        match self.purchase_units.as_slice() {
            [unit] => Some(unit),
            _ => None,
        }
    }
}

//--------------------------------------      RefundStatus      --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefundStatus {
    Completed,
    Pending,
    Cancelled,
    Failed,
    Other(String),
}

impl From<&str> for RefundStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "COMPLETED" => Self::Completed,
            "PENDING" => Self::Pending,
            "CANCELLED" => Self::Cancelled,
            "FAILED" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for RefundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "COMPLETED"),
            Self::Pending => write!(f, "PENDING"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundReceipt {
    pub id: String,
    pub status: RefundStatus,
}

impl RefundReceipt {
    pub fn is_completed(&self) -> bool {
        self.status == RefundStatus::Completed
    }
}
