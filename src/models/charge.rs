//! Per-member charge captured at allocation time.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Round a currency amount to 2 decimal places, half away from zero.
///
/// Every intermediate division is rounded with this helper before being
/// summed into a total. As a consequence the room-level total and the sum of
/// per-payer shares may differ by up to `payor_count - 1` cents; that drift
/// is accepted, not corrected.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One payer's share of a cycle's bills, or an all-zero audit record for a
/// non-payer.
///
/// Invariants: `total_due = round2(rent_share + electricity_share +
/// internet_share + water_bill_share)` and `water_bill_share = water_own +
/// water_shared_nonpayor`. Charge sets are always produced whole by the
/// allocator and replaced wholesale, never patched entry by entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCharge {
    pub user_id: Uuid,
    pub is_payer: bool,
    pub rent_share: Decimal,
    pub electricity_share: Decimal,
    pub internet_share: Decimal,
    pub water_bill_share: Decimal,
    /// Water cost attributable to this member's own usage.
    pub water_own: Decimal,
    /// This payer's slice of the non-payers' water cost.
    pub water_shared_nonpayor: Decimal,
    pub total_due: Decimal,
}

impl MemberCharge {
    /// All-zero record for a non-payer, kept for completeness and auditing.
    pub fn zero(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_payer: false,
            rent_share: Decimal::ZERO,
            electricity_share: Decimal::ZERO,
            internet_share: Decimal::ZERO,
            water_bill_share: Decimal::ZERO,
            water_own: Decimal::ZERO,
            water_shared_nonpayor: Decimal::ZERO,
            total_due: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(dec("7.125")), dec("7.13"));
        assert_eq!(round2(dec("7.124")), dec("7.12"));
        assert_eq!(round2(dec("-7.125")), dec("-7.13"));
    }

    #[test]
    fn test_round2_preserves_exact_values() {
        assert_eq!(round2(dec("100.50")), dec("100.50"));
        assert_eq!(round2(Decimal::ZERO), Decimal::ZERO);
    }
}
