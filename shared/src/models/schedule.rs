//! Weekly opening hours
//!
//! Stored as JSON on the restaurant row:
//!
//! ```json
//! { "monday": { "is_open": true, "open_time": "09:00", "close_time": "22:00" } }
//! ```
//!
//! A weekday with no entry is closed that day.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Opening window for one weekday
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    #[serde(default)]
    pub is_open: bool,
    /// "HH:MM", zero padded. Empty means "not configured".
    #[serde(default)]
    pub open_time: String,
    /// "HH:MM", zero padded. Earlier than `open_time` means the window runs past midnight.
    #[serde(default)]
    pub close_time: String,
}

impl DayHours {
    pub fn new(open_time: impl Into<String>, close_time: impl Into<String>) -> Self {
        Self {
            is_open: true,
            open_time: open_time.into(),
            close_time: close_time.into(),
        }
    }

    /// Day explicitly marked closed
    pub fn closed() -> Self {
        Self::default()
    }

    /// Both ends of the window are set
    pub fn has_window(&self) -> bool {
        !self.open_time.is_empty() && !self.close_time.is_empty()
    }
}

/// Per-weekday schedule (周营业时间)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thursday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturday: Option<DayHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunday: Option<DayHours>,
}

impl WeeklySchedule {
    pub fn get(&self, day: Weekday) -> Option<&DayHours> {
        self.slot(day).as_ref()
    }

    pub fn set(&mut self, day: Weekday, hours: DayHours) {
        *self.slot_mut(day) = Some(hours);
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, day: Weekday, hours: DayHours) -> Self {
        self.set(day, hours);
        self
    }

    /// Iterate configured days, Monday first
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &DayHours)> {
        ALL_WEEKDAYS
            .iter()
            .filter_map(move |day| self.get(*day).map(|h| (*day, h)))
    }

    pub fn is_empty(&self) -> bool {
        self.days().next().is_none()
    }

    fn slot(&self, day: Weekday) -> &Option<DayHours> {
        match day {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    fn slot_mut(&mut self, day: Weekday) -> &mut Option<DayHours> {
        match day {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }
}

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Lowercase English weekday name, the key used in stored schedules
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_week() {
        let json = r#"{"monday":{"is_open":true,"open_time":"22:00","close_time":"04:00"}}"#;
        let schedule: WeeklySchedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.get(Weekday::Mon), Some(&DayHours::new("22:00", "04:00")));
        assert!(schedule.get(Weekday::Tue).is_none());
    }

    #[test]
    fn test_missing_fields_default_to_closed_and_empty() {
        let json = r#"{"sunday":{}}"#;
        let schedule: WeeklySchedule = serde_json::from_str(json).unwrap();
        let sunday = schedule.get(Weekday::Sun).unwrap();
        assert!(!sunday.is_open);
        assert!(!sunday.has_window());
    }

    #[test]
    fn test_serialize_skips_absent_days() {
        let schedule = WeeklySchedule::default().with(Weekday::Fri, DayHours::new("11:00", "23:00"));
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["friday"]["open_time"], "11:00");
    }

    #[test]
    fn test_days_iterates_in_week_order() {
        let schedule = WeeklySchedule::default()
            .with(Weekday::Sun, DayHours::new("10:00", "14:00"))
            .with(Weekday::Mon, DayHours::closed());
        let days: Vec<_> = schedule.days().map(|(d, _)| d).collect();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Sun]);
        assert!(!schedule.is_empty());
        assert!(WeeklySchedule::default().is_empty());
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name(Weekday::Wed), "wednesday");
    }
}
