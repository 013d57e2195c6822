//! Payment record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bill type a payment applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillType {
    Rent,
    Electricity,
    Internet,
    Water,
}

impl BillType {
    pub const ALL: [BillType; 4] = [
        BillType::Rent,
        BillType::Electricity,
        BillType::Internet,
        BillType::Water,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BillType::Rent => "rent",
            BillType::Electricity => "electricity",
            BillType::Internet => "internet",
            BillType::Water => "water",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "electricity" => BillType::Electricity,
            "internet" => BillType::Internet,
            "water" => BillType::Water,
            _ => BillType::Rent,
        }
    }
}

/// Payment verification status for one member and bill type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    /// Proof submitted, awaiting verification.
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "pending" => PaymentStatus::Pending,
            "completed" => PaymentStatus::Completed,
            _ => PaymentStatus::Unpaid,
        }
    }
}

/// Per-member, per-bill-type payment state for a cycle.
///
/// Mutated by the external payment-verification workflow; the engine only
/// reads it to decide auto-completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub cycle_id: Uuid,
    pub user_id: Uuid,
    pub bill_type: BillType,
    pub status: PaymentStatus,
    pub updated_utc: DateTime<Utc>,
}
