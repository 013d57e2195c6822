//! Room member model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Member of a room.
///
/// `is_payer` is a required flag with no implicit default: non-payers use the
/// room but owe nothing directly, and their water cost is redistributed
/// across payers. Call sites branch on the flag explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub member_id: Uuid,
    pub user_id: Uuid,
    pub is_payer: bool,
    /// Timestamps of the days the member was marked present, unique and
    /// ordered. Check-in actions may record arbitrary times of day; range
    /// filtering compares calendar dates, not raw instants.
    pub presence: BTreeSet<DateTime<Utc>>,
}

impl Member {
    pub fn new(user_id: Uuid, is_payer: bool) -> Self {
        Self {
            member_id: Uuid::new_v4(),
            user_id,
            is_payer,
            presence: BTreeSet::new(),
        }
    }
}
