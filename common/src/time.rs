//! UTC calendar helpers shared by the scheduler and the daily trigger.

use chrono::{DateTime, Days, NaiveTime, Utc};

/// Truncates `now` to 00:00:00 of the same UTC day.
///
/// Every range computed from this value is stable for the whole calendar day.
pub fn utc_day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Next instant strictly after `now` whose UTC wall-clock time is `at`.
pub fn next_daily_run(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        return today;
    }
    today
        .checked_add_days(Days::new(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
