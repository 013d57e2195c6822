//! Room model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Water billing mode for a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterBillingMode {
    /// Each member's water cost is prorated by their presence days.
    PresenceBased,
    /// A fixed monthly amount is split across the room.
    FixedMonthly,
}

impl WaterBillingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterBillingMode::PresenceBased => "presence_based",
            WaterBillingMode::FixedMonthly => "fixed_monthly",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "fixed_monthly" => WaterBillingMode::FixedMonthly,
            _ => WaterBillingMode::PresenceBased,
        }
    }
}

/// Shared room that owns members and billing cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_id: Uuid,
    pub name: String,
    pub water_billing_mode: WaterBillingMode,
    /// Monthly water total, used iff the mode is `fixed_monthly`.
    pub water_fixed_amount: Decimal,
    /// The room's active cycle, at most one at any time.
    pub current_cycle_id: Option<Uuid>,
}

impl Room {
    pub fn new(name: impl Into<String>, water_billing_mode: WaterBillingMode) -> Self {
        Self {
            room_id: Uuid::new_v4(),
            name: name.into(),
            water_billing_mode,
            water_fixed_amount: Decimal::ZERO,
            current_cycle_id: None,
        }
    }
}
