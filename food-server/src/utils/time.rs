//! 时间工具函数 — 餐厅时区转换
//!
//! 营业时间按餐厅所在时区解释；数据库只存 UTC Unix millis。

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析时区名称，失败时回退到默认时区
pub fn parse_timezone(name: &str, fallback: Tz) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!(
            "Unknown timezone '{}', falling back to {}",
            name,
            fallback.name()
        );
        fallback
    })
}

/// 本地星期 + "HH:MM"
pub fn local_day_and_hhmm(instant: DateTime<Utc>, tz: Tz) -> (Weekday, String) {
    let local = instant.with_timezone(&tz);
    (local.weekday(), local.format("%H:%M").to_string())
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析时间字符串 (HH:MM)
pub fn parse_hhmm(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time format: {}", time)))
}

/// 本地日期 + 时间 → UTC (餐厅时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，按 UTC 解释。
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// 解析查询时间点
///
/// 优先级：
/// 1. `date_time` — RFC 3339
/// 2. `date` + `time` — 餐厅本地日期和时间
/// 3. `time` — 餐厅本地今天
/// 4. 都没有 → `now`
///
/// 只给 `date` 不给 `time` 按当天 00:00 处理。
pub fn parse_request_instant(
    date_time: Option<&str>,
    date: Option<&str>,
    time: Option<&str>,
    tz: Tz,
    now: DateTime<Utc>,
) -> AppResult<DateTime<Utc>> {
    if let Some(dt) = date_time {
        return DateTime::parse_from_rfc3339(dt)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|_| AppError::validation(format!("Invalid date_time (RFC 3339): {}", dt)));
    }

    let today = now.with_timezone(&tz).date_naive();
    match (date, time) {
        (Some(d), Some(t)) => Ok(local_to_utc(parse_date(d)?, parse_hhmm(t)?, tz)),
        (Some(d), None) => Ok(local_to_utc(parse_date(d)?, NaiveTime::MIN, tz)),
        (None, Some(t)) => Ok(local_to_utc(today, parse_hhmm(t)?, tz)),
        (None, None) => Ok(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_local_day_and_hhmm_crosses_midnight() {
        // 2025-01-06 20:00 UTC = 2025-01-07 01:30 IST (Tuesday)
        let (day, hhmm) = local_day_and_hhmm(utc(2025, 1, 6, 20, 0), Kolkata);
        assert_eq!(day, Weekday::Tue);
        assert_eq!(hhmm, "01:30");
    }

    #[test]
    fn test_parse_timezone_fallback() {
        assert_eq!(parse_timezone("Europe/Madrid", Kolkata), chrono_tz::Europe::Madrid);
        assert_eq!(parse_timezone("Mars/Olympus", Kolkata), Kolkata);
    }

    #[test]
    fn test_parse_request_instant_rfc3339() {
        let now = utc(2025, 1, 1, 0, 0);
        let t = parse_request_instant(Some("2025-01-02T14:30:00Z"), None, None, Kolkata, now).unwrap();
        assert_eq!(t, utc(2025, 1, 2, 14, 30));
    }

    #[test]
    fn test_parse_request_instant_date_and_time_are_local() {
        let now = utc(2025, 1, 1, 0, 0);
        let t = parse_request_instant(None, Some("2025-01-02"), Some("14:30"), Kolkata, now).unwrap();
        // 14:30 IST = 09:00 UTC
        assert_eq!(t, utc(2025, 1, 2, 9, 0));
    }

    #[test]
    fn test_parse_request_instant_time_only_uses_local_today() {
        // 2025-01-01 20:00 UTC is already 2025-01-02 in Kolkata
        let now = utc(2025, 1, 1, 20, 0);
        let t = parse_request_instant(None, None, Some("08:00"), Kolkata, now).unwrap();
        assert_eq!(t, utc(2025, 1, 2, 2, 30));
    }

    #[test]
    fn test_parse_request_instant_defaults_to_now() {
        let now = utc(2025, 3, 3, 3, 3);
        assert_eq!(parse_request_instant(None, None, None, Kolkata, now).unwrap(), now);
    }

    #[test]
    fn test_parse_request_instant_rejects_garbage() {
        let now = utc(2025, 1, 1, 0, 0);
        assert!(parse_request_instant(Some("tomorrow"), None, None, Kolkata, now).is_err());
        assert!(parse_request_instant(None, Some("2025/01/02"), None, Kolkata, now).is_err());
        assert!(parse_request_instant(None, None, Some("25:00"), Kolkata, now).is_err());
    }
}
