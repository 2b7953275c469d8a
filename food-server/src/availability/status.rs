//! Time-aware restaurant status

use chrono::{DateTime, Datelike, Days, Utc};
use chrono_tz::Tz;
use shared::models::{Restaurant, RestaurantTimeStatus, WeeklySchedule};

use super::window::is_open_at;
use crate::utils::time::{local_to_utc, parse_hhmm, parse_timezone};

/// Restaurant timezone, falling back to `default_tz` when unparseable
pub fn restaurant_tz(restaurant: &Restaurant, default_tz: Tz) -> Tz {
    parse_timezone(&restaurant.timezone, default_tz)
}

/// Effective status at `instant`: schedule when auto-managed, else the manual flag
pub fn should_be_open(restaurant: &Restaurant, tz: Tz, instant: DateTime<Utc>) -> bool {
    if restaurant.auto_open_close {
        is_open_at(&restaurant.opening_hours, tz, instant, restaurant.is_open)
    } else {
        restaurant.is_open
    }
}

pub fn restaurant_time_status(
    restaurant: &Restaurant,
    tz: Tz,
    instant: DateTime<Utc>,
) -> RestaurantTimeStatus {
    let mut status = RestaurantTimeStatus {
        is_open: should_be_open(restaurant, tz, instant),
        opening_time: None,
        closing_time: None,
        next_open_time: None,
        auto_open_close_enabled: restaurant.auto_open_close,
        last_status_update: restaurant.last_status_update,
        timezone: tz.name().to_string(),
    };

    if !restaurant.auto_open_close {
        return status;
    }

    let today = instant.with_timezone(&tz).weekday();
    if let Some(hours) = restaurant.opening_hours.get(today).filter(|h| h.is_open) {
        status.opening_time = Some(hours.open_time.clone()).filter(|t| !t.is_empty());
        status.closing_time = Some(hours.close_time.clone()).filter(|t| !t.is_empty());
    }

    if !status.is_open {
        status.next_open_time =
            next_open_time(&restaurant.opening_hours, tz, instant).map(|t| t.to_rfc3339());
    }
    status
}

/// First opening time after `instant`, looking at today and the six days after
///
/// Today only counts if its opening time is still ahead.
pub fn next_open_time(
    hours: &WeeklySchedule,
    tz: Tz,
    instant: DateTime<Utc>,
) -> Option<DateTime<Tz>> {
    let local_today = instant.with_timezone(&tz).date_naive();

    (0..7u64).find_map(|offset| {
        let date = local_today.checked_add_days(Days::new(offset))?;
        let day = hours.get(date.weekday()).filter(|h| h.is_open)?;
        let open = parse_hhmm(&day.open_time).ok()?;
        let open_at = local_to_utc(date, open, tz);
        (offset > 0 || open_at > instant).then(|| open_at.with_timezone(&tz))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};
    use chrono_tz::UTC;
    use shared::models::DayHours;

    fn restaurant(hours: WeeklySchedule, auto: bool, is_open: bool) -> Restaurant {
        Restaurant {
            id: 1,
            name: "Test".into(),
            status: "active".into(),
            is_open,
            auto_open_close: auto,
            opening_hours: hours,
            timezone: "UTC".into(),
            contact_number: None,
            last_status_update: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    // 2025-01-06 is a Monday
    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, h, m, 0).unwrap()
    }

    fn weekdays_9_to_5() -> WeeklySchedule {
        WeeklySchedule::default()
            .with(Weekday::Mon, DayHours::new("09:00", "17:00"))
            .with(Weekday::Wed, DayHours::new("10:00", "18:00"))
    }

    #[test]
    fn test_manual_restaurant_ignores_schedule() {
        let r = restaurant(weekdays_9_to_5(), false, true);
        let status = restaurant_time_status(&r, UTC, at(6, 3, 0));
        assert!(status.is_open);
        assert_eq!(status.opening_time, None);
        assert_eq!(status.next_open_time, None);
        assert!(!status.auto_open_close_enabled);
    }

    #[test]
    fn test_open_now_reports_today_window() {
        let r = restaurant(weekdays_9_to_5(), true, false);
        let status = restaurant_time_status(&r, UTC, at(6, 12, 0));
        assert!(status.is_open);
        assert_eq!(status.opening_time.as_deref(), Some("09:00"));
        assert_eq!(status.closing_time.as_deref(), Some("17:00"));
        assert_eq!(status.next_open_time, None);
        assert_eq!(status.timezone, "UTC");
    }

    #[test]
    fn test_closed_before_opening_points_to_today() {
        let r = restaurant(weekdays_9_to_5(), true, false);
        let status = restaurant_time_status(&r, UTC, at(6, 7, 0));
        assert!(!status.is_open);
        assert_eq!(status.next_open_time.as_deref(), Some("2025-01-06T09:00:00+00:00"));
    }

    #[test]
    fn test_closed_after_hours_points_to_next_open_day() {
        let r = restaurant(weekdays_9_to_5(), true, true);
        let status = restaurant_time_status(&r, UTC, at(6, 18, 0));
        assert!(!status.is_open);
        assert_eq!(status.next_open_time.as_deref(), Some("2025-01-08T10:00:00+00:00"));
    }

    #[test]
    fn test_no_open_day_within_a_week() {
        assert_eq!(next_open_time(&WeeklySchedule::default(), UTC, at(6, 12, 0)), None);
    }

    #[test]
    fn test_next_open_time_in_restaurant_timezone() {
        let kolkata = chrono_tz::Asia::Kolkata;
        // Monday 02:00 UTC = Monday 07:30 IST, before the 09:00 opening
        let next = next_open_time(&weekdays_9_to_5(), kolkata, at(6, 2, 0)).unwrap();
        assert_eq!(next.to_rfc3339(), "2025-01-06T09:00:00+05:30");
    }
}
