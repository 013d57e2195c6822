//! Billing cycle model.

use crate::error::BillingError;
use crate::models::MemberCharge;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Billing cycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Open for rate/presence edits; charges recomputed on every mutation.
    Active,
    /// All payers have paid every billed type; still closable by the admin.
    Completed,
    /// Archived historical record, terminal.
    Closed,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Active => "active",
            CycleStatus::Completed => "completed",
            CycleStatus::Closed => "closed",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "completed" => CycleStatus::Completed,
            "closed" => CycleStatus::Closed,
            _ => CycleStatus::Active,
        }
    }
}

/// Raw billing inputs supplied by the admin for a cycle.
///
/// Amounts that were never entered stay `None` and contribute nothing; the
/// allocator never distinguishes "unset" from zero when splitting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleInputs {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent: Option<Decimal>,
    pub electricity: Option<Decimal>,
    pub internet: Option<Decimal>,
    pub previous_meter_reading: Option<Decimal>,
    pub current_meter_reading: Option<Decimal>,
}

impl CycleInputs {
    /// Boundary validation: date ordering, non-negative amounts, monotonic
    /// meter readings. Rejected inputs never reach the allocator.
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.start_date >= self.end_date {
            return Err(BillingError::ValidationError(format!(
                "start_date {} must be before end_date {}",
                self.start_date, self.end_date
            )));
        }

        let amounts = [
            ("rent", self.rent),
            ("electricity", self.electricity),
            ("internet", self.internet),
            ("previous_meter_reading", self.previous_meter_reading),
            ("current_meter_reading", self.current_meter_reading),
        ];
        for (name, value) in amounts {
            if let Some(value) = value {
                if value < Decimal::ZERO {
                    return Err(BillingError::ValidationError(format!(
                        "{} must not be negative (got {})",
                        name, value
                    )));
                }
            }
        }

        if let (Some(previous), Some(current)) =
            (self.previous_meter_reading, self.current_meter_reading)
        {
            if current < previous {
                return Err(BillingError::ValidationError(format!(
                    "current_meter_reading {} must not be less than previous_meter_reading {}",
                    current, previous
                )));
            }
        }

        Ok(())
    }
}

/// Billing cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingCycle {
    pub cycle_id: Uuid,
    pub room_id: Uuid,
    pub status: CycleStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent: Option<Decimal>,
    pub electricity: Option<Decimal>,
    pub internet: Option<Decimal>,
    pub previous_meter_reading: Option<Decimal>,
    pub current_meter_reading: Option<Decimal>,
    /// Derived water total for the cycle window.
    pub water_bill_amount: Decimal,
    /// May be empty or stale relative to live presence; resolve through the
    /// reconciliation guard rather than reading this directly.
    pub member_charges: Vec<MemberCharge>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl BillingCycle {
    /// The cycle's raw inputs, for re-running the allocator.
    pub fn inputs(&self) -> CycleInputs {
        CycleInputs {
            start_date: self.start_date,
            end_date: self.end_date,
            rent: self.rent,
            electricity: self.electricity,
            internet: self.internet,
            previous_meter_reading: self.previous_meter_reading,
            current_meter_reading: self.current_meter_reading,
        }
    }
}
