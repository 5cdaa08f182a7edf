//! Rate-limit advisory for the setup wizard.
//!
//! The provider allows 3600 API calls per hour and 28800 per day. The wizard
//! warns when the worst case (every poll cycle triggers an update of every
//! record) would strictly exceed half of either limit, and suggests the
//! smallest interval that would not.

pub const PROVIDER_HOURLY_LIMIT: u64 = 3600;
pub const PROVIDER_DAILY_LIMIT: u64 = 28800;

const SECS_PER_HOUR: u64 = 3600;
const SECS_PER_DAY: u64 = 86400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advisory {
    pub per_hour: u64,
    pub per_day: u64,
    pub exceeds: bool,
    pub suggested_interval: Option<u64>,
}

/// Worst-case update calls in one hour. Integer division, like the limits
/// themselves: a 7s interval yields 514 cycles, not 514.28.
pub fn calls_per_hour(interval_secs: u64, record_count: u64) -> u64 {
    (SECS_PER_HOUR / interval_secs.max(1)) * record_count
}

pub fn calls_per_day(interval_secs: u64, record_count: u64) -> u64 {
    (SECS_PER_DAY / interval_secs.max(1)) * record_count
}

pub fn advise(interval_secs: u64, record_count: u64) -> Advisory {
    let per_hour = calls_per_hour(interval_secs, record_count);
    let per_day = calls_per_day(interval_secs, record_count);

    // Strictly greater: landing exactly on half the limit is fine.
    let exceeds = per_hour > PROVIDER_HOURLY_LIMIT / 2 || per_day > PROVIDER_DAILY_LIMIT / 2;

    Advisory {
        per_hour,
        per_day,
        exceeds,
        suggested_interval: exceeds.then(|| minimal_compliant_interval(record_count)),
    }
}

/// Smallest interval keeping both worst-case figures at or under half the
/// provider limits.
fn minimal_compliant_interval(record_count: u64) -> u64 {
    let by_hour = (SECS_PER_HOUR * record_count).div_ceil(PROVIDER_HOURLY_LIMIT / 2);
    let by_day = (SECS_PER_DAY * record_count).div_ceil(PROVIDER_DAILY_LIMIT / 2);

    by_hour.max(by_day).max(1)
}
