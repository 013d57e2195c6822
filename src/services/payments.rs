//! Payment status tracking and the cycle auto-completion gate.

use crate::models::{BillType, BillingCycle, Member, PaymentRecord, PaymentStatus};
use rust_decimal::Decimal;

/// Bill types that carry a non-zero amount for this cycle.
///
/// Derived from the cycle's charge set, which the engine keeps fresh on
/// every mutation; a type nobody owes anything for never gates completion.
pub fn billable_types(cycle: &BillingCycle) -> Vec<BillType> {
    BillType::ALL
        .into_iter()
        .filter(|bill_type| {
            cycle.member_charges.iter().any(|charge| {
                let share = match bill_type {
                    BillType::Rent => charge.rent_share,
                    BillType::Electricity => charge.electricity_share,
                    BillType::Internet => charge.internet_share,
                    BillType::Water => charge.water_bill_share,
                };
                share > Decimal::ZERO
            })
        })
        .collect()
}

/// Whether every payer has completed payment on every billed type.
///
/// False when the room has no payers or the cycle bills nothing; an empty
/// cycle never auto-completes.
pub fn all_payers_paid(
    cycle: &BillingCycle,
    members: &[Member],
    records: &[PaymentRecord],
) -> bool {
    let payers: Vec<_> = members.iter().filter(|m| m.is_payer).collect();
    if payers.is_empty() {
        return false;
    }

    let billed = billable_types(cycle);
    if billed.is_empty() {
        return false;
    }

    payers.iter().all(|payer| {
        billed.iter().all(|bill_type| {
            records.iter().any(|record| {
                record.user_id == payer.user_id
                    && record.bill_type == *bill_type
                    && record.status == PaymentStatus::Completed
            })
        })
    })
}
