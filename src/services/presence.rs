//! Presence ledger range filtering.
//!
//! Pure queries over a member's stored presence timestamps and a cycle's
//! date window. No side effects, no errors.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;

/// Filter presence timestamps to a cycle window, inclusive on both ends.
///
/// If either bound is absent the cycle is not yet defined and all dates pass
/// unfiltered. The end bound covers the whole calendar day, so a same-day
/// entry is kept regardless of time-of-day noise in the stored timestamp.
pub fn filter_by_range(
    dates: &BTreeSet<DateTime<Utc>>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<DateTime<Utc>> {
    let (Some(start), Some(end)) = (start, end) else {
        return dates.iter().copied().collect();
    };

    dates
        .iter()
        .copied()
        .filter(|d| {
            let day = d.date_naive();
            day >= start && day <= end
        })
        .collect()
}

/// Count of distinct calendar days the member was present in the window.
///
/// Duplicate timestamps on the same day count once; water proration is per
/// presence day, not per check-in.
pub fn presence_days(
    dates: &BTreeSet<DateTime<Utc>>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> usize {
    filter_by_range(dates, start, end)
        .iter()
        .map(|d| d.date_naive())
        .collect::<BTreeSet<_>>()
        .len()
}
