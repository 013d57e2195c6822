//! Charge allocation.
//!
//! The single source of truth for converting raw room-level totals into
//! per-member shares. `allocate` is a pure function of membership, presence,
//! rates, raw inputs, and the cycle window, so it serves both to seed a
//! cycle's charges and to verify a cached set against fresh inputs.

use crate::config::EngineConfig;
use crate::models::{round2, CycleInputs, Member, MemberCharge, Room, WaterBillingMode};
use crate::services::presence;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Per-unit rates and water mode in effect for one allocation pass.
#[derive(Debug, Clone)]
pub struct RateTable {
    pub daily_water_rate: Decimal,
    pub electricity_unit_rate: Decimal,
    pub water_billing_mode: WaterBillingMode,
    pub water_fixed_amount: Decimal,
}

impl RateTable {
    /// Rates for a room, falling back to the engine-wide defaults.
    pub fn for_room(room: &Room, config: &EngineConfig) -> Self {
        Self {
            daily_water_rate: config.daily_water_rate,
            electricity_unit_rate: config.electricity_unit_rate,
            water_billing_mode: room.water_billing_mode,
            water_fixed_amount: room.water_fixed_amount,
        }
    }
}

/// Result of one allocation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Room-level water total for the cycle window.
    pub water_bill_amount: Decimal,
    /// One entry per member; non-payers carry an all-zero record.
    pub charges: Vec<MemberCharge>,
}

impl Allocation {
    pub fn empty() -> Self {
        Self {
            water_bill_amount: Decimal::ZERO,
            charges: Vec::new(),
        }
    }
}

/// Compute the cycle's electricity amount, if any.
///
/// When meter readings are supplied they win over the admin-entered amount.
/// A non-positive usage delta signals bad or unset readings, not a real
/// bill, and leaves the amount unset rather than billing a negative or zero
/// charge. Without readings, the admin-entered amount is used verbatim.
pub fn electricity_amount(inputs: &CycleInputs, rates: &RateTable) -> Option<Decimal> {
    match (inputs.previous_meter_reading, inputs.current_meter_reading) {
        (Some(previous), Some(current)) => {
            let usage = current - previous;
            if usage > Decimal::ZERO {
                Some(usage * rates.electricity_unit_rate)
            } else {
                None
            }
        }
        _ => inputs.electricity,
    }
}

/// Allocate a cycle's raw totals into per-member charges.
///
/// Rounding discipline: every intermediate division is rounded to 2 decimals
/// before being summed into a total, matching penny-level reconciliation
/// between independently computed figures.
pub fn allocate(
    members: &[Member],
    rates: &RateTable,
    inputs: &CycleInputs,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Allocation {
    if members.is_empty() {
        return Allocation::empty();
    }

    // A payor-less room divides by a synthetic 1, never by zero.
    let payor_count = Decimal::from(members.iter().filter(|m| m.is_payer).count().max(1));
    let member_count = Decimal::from(members.len());

    let own_water: Vec<Decimal> = members
        .iter()
        .map(|member| match rates.water_billing_mode {
            WaterBillingMode::FixedMonthly => round2(rates.water_fixed_amount / member_count),
            WaterBillingMode::PresenceBased => {
                let days = Decimal::from(presence::presence_days(&member.presence, start, end));
                round2(days * rates.daily_water_rate)
            }
        })
        .collect();

    let water_bill_amount = match rates.water_billing_mode {
        WaterBillingMode::FixedMonthly => rates.water_fixed_amount,
        WaterBillingMode::PresenceBased => own_water.iter().copied().sum(),
    };

    // Non-payor absorption: payers split the non-payers' water evenly.
    let nonpayor_water: Decimal = members
        .iter()
        .zip(&own_water)
        .filter(|(member, _)| !member.is_payer)
        .map(|(_, own)| *own)
        .sum();
    let shared_nonpayor_water = round2(nonpayor_water / payor_count);

    let rent_per_payor = round2(inputs.rent.unwrap_or_default() / payor_count);
    let electricity_per_payor = round2(
        electricity_amount(inputs, rates).unwrap_or_default() / payor_count,
    );
    let internet_per_payor = round2(inputs.internet.unwrap_or_default() / payor_count);

    let charges = members
        .iter()
        .zip(&own_water)
        .map(|(member, own)| {
            if member.is_payer {
                let water_bill_share = round2(*own + shared_nonpayor_water);
                MemberCharge {
                    user_id: member.user_id,
                    is_payer: true,
                    rent_share: rent_per_payor,
                    electricity_share: electricity_per_payor,
                    internet_share: internet_per_payor,
                    water_bill_share,
                    water_own: *own,
                    water_shared_nonpayor: shared_nonpayor_water,
                    total_due: round2(
                        rent_per_payor
                            + electricity_per_payor
                            + internet_per_payor
                            + water_bill_share,
                    ),
                }
            } else {
                MemberCharge::zero(member.user_id)
            }
        })
        .collect();

    Allocation {
        water_bill_amount,
        charges,
    }
}
