//! Cache-or-recompute resolution for member charges.
//!
//! The authoritative allocation is computed when a cycle mutates and cached
//! on the cycle record, but callers must stay correct when the cache is
//! momentarily empty or stale. Resolution returns numerically identical
//! results whether it hits the cache or recomputes, given the same
//! underlying inputs.

use crate::models::{BillingCycle, Member, MemberCharge};
use crate::services::allocator::{allocate, RateTable};
use uuid::Uuid;

/// Resolve one member's charge for a cycle.
///
/// The cached entry is trusted only when the cache is non-empty, contains
/// the member, and that entry is a payer record; anything else falls back to
/// a fresh allocation over live membership and presence. Returns `None` only
/// when the user is not part of the room at all.
pub fn resolve(
    cycle: &BillingCycle,
    members: &[Member],
    rates: &RateTable,
    user_id: Uuid,
) -> Option<MemberCharge> {
    if !cycle.member_charges.is_empty() {
        if let Some(cached) = cycle
            .member_charges
            .iter()
            .find(|charge| charge.user_id == user_id)
        {
            if cached.is_payer {
                return Some(cached.clone());
            }
        }
    }

    resolve_all(cycle, members, rates)
        .into_iter()
        .find(|charge| charge.user_id == user_id)
}

/// Fresh allocation over the cycle's current raw inputs and live membership.
pub fn resolve_all(cycle: &BillingCycle, members: &[Member], rates: &RateTable) -> Vec<MemberCharge> {
    allocate(
        members,
        rates,
        &cycle.inputs(),
        Some(cycle.start_date),
        Some(cycle.end_date),
    )
    .charges
}
