//! Opening window evaluation
//!
//! Times are zero-padded `HH:MM` strings and compare lexically. A window whose
//! end sorts before its start runs past midnight.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use shared::models::WeeklySchedule;

use crate::utils::time::local_day_and_hhmm;

/// Whether `t` lies in `[start, end]`, wrapping past midnight when `end < start`
pub fn time_in_range(t: &str, start: &str, end: &str) -> bool {
    if end < start {
        t >= start || t <= end
    } else {
        start <= t && t <= end
    }
}

/// Whether the schedule says the restaurant is open at `instant`
///
/// Only the entry for the local weekday is consulted. A missing or closed day
/// is closed; a day without both times falls back to `manual_is_open`.
pub fn is_open_at(
    hours: &WeeklySchedule,
    tz: Tz,
    instant: DateTime<Utc>,
    manual_is_open: bool,
) -> bool {
    let (day, now) = local_day_and_hhmm(instant, tz);

    let Some(today) = hours.get(day) else {
        return false;
    };
    if !today.is_open {
        return false;
    }
    if !today.has_window() {
        return manual_is_open;
    }
    time_in_range(&now, &today.open_time, &today.close_time)
}
