use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Open/close window for a single weekday. Times are zero-padded 24-hour
/// "HH:MM" strings; `open`/`close` are kept even when the day is disabled
/// so re-enabling a day restores its previous hours.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayHours {
    pub enabled: bool,
    pub open: String,
    pub close: String,
}

impl DayHours {
    fn workday() -> Self {
        Self {
            enabled: true,
            open: "09:00".to_string(),
            close: "17:00".to_string(),
        }
    }

    fn closed() -> Self {
        Self {
            enabled: false,
            open: "09:00".to_string(),
            close: "17:00".to_string(),
        }
    }
}

/// Weekly schedule keyed by weekday name. Serializes as
/// `{"monday": {...}, ..., "sunday": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            monday: DayHours::workday(),
            tuesday: DayHours::workday(),
            wednesday: DayHours::workday(),
            thursday: DayHours::workday(),
            friday: DayHours::workday(),
            saturday: DayHours::closed(),
            sunday: DayHours::closed(),
        }
    }
}

impl BusinessHours {
    pub fn for_weekday(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn for_date(&self, date: NaiveDate) -> &DayHours {
        self.for_weekday(date.weekday())
    }

    fn days(&self) -> [(&'static str, &DayHours); 7] {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ]
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// The singleton configuration governing slot generation. Exactly one row
/// exists; it is created lazily with these defaults on first read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSettings {
    pub business_hours: BusinessHours,
    pub default_duration: i64,
    pub buffer_time: i64,
    pub max_advance_days: i64,
    pub allowed_services: Vec<String>,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            business_hours: BusinessHours::default(),
            default_duration: 60,
            buffer_time: 15,
            max_advance_days: 30,
            allowed_services: Vec::new(),
        }
    }
}

/// Partial settings update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub business_hours: Option<BusinessHours>,
    pub default_duration: Option<i64>,
    pub buffer_time: Option<i64>,
    pub max_advance_days: Option<i64>,
    pub allowed_services: Option<Vec<String>>,
}

impl ReservationSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(hours) = patch.business_hours {
            self.business_hours = hours;
        }
        if let Some(duration) = patch.default_duration {
            self.default_duration = duration;
        }
        if let Some(buffer) = patch.buffer_time {
            self.buffer_time = buffer;
        }
        if let Some(days) = patch.max_advance_days {
            self.max_advance_days = days;
        }
        if let Some(services) = patch.allowed_services {
            self.allowed_services = services;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.default_duration < 1 {
            return Err("defaultDuration must be at least 1 minute".to_string());
        }
        if self.buffer_time < 0 {
            return Err("bufferTime must not be negative".to_string());
        }
        if self.max_advance_days < 1 {
            return Err("maxAdvanceDays must be at least 1".to_string());
        }
        for (day, hours) in self.business_hours.days() {
            let open = parse_minutes(&hours.open)
                .ok_or_else(|| format!("invalid open time for {day}: {}", hours.open))?;
            let close = parse_minutes(&hours.close)
                .ok_or_else(|| format!("invalid close time for {day}: {}", hours.close))?;
            if hours.enabled && open >= close {
                return Err(format!("{day} must open before it closes"));
            }
        }
        Ok(())
    }
}

/// Parses "HH:MM" into minutes since midnight.
pub fn parse_minutes(s: &str) -> Option<i64> {
    let (hour, minute) = s.split_once(':')?;
    if hour.len() != 2 || minute.len() != 2 {
        return None;
    }
    let hour: i64 = hour.parse().ok()?;
    let minute: i64 = minute.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(hour * 60 + minute)
}

pub fn format_minutes(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hours_weekdays_open_weekends_closed() {
        let hours = BusinessHours::default();
        assert!(hours.monday.enabled);
        assert!(hours.friday.enabled);
        assert!(!hours.saturday.enabled);
        assert!(!hours.sunday.enabled);
        assert_eq!(hours.monday.open, "09:00");
        assert_eq!(hours.monday.close, "17:00");
    }

    #[test]
    fn test_for_date_maps_calendar_weekday() {
        let hours = BusinessHours::default();
        // 2025-06-16 is a Monday, 2025-06-15 a Sunday
        let monday = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert!(hours.for_date(monday).enabled);
        assert!(!hours.for_date(sunday).enabled);
    }

    #[test]
    fn test_weekday_name_full_lowercase() {
        assert_eq!(weekday_name(Weekday::Mon), "monday");
        assert_eq!(weekday_name(Weekday::Sun), "sunday");
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("09:00"), Some(540));
        assert_eq!(parse_minutes("23:59"), Some(1439));
        assert_eq!(parse_minutes("24:00"), None);
        assert_eq!(parse_minutes("9:00"), None);
        assert_eq!(parse_minutes("0900"), None);
    }

    #[test]
    fn test_format_minutes_zero_pads() {
        assert_eq!(format_minutes(540), "09:00");
        assert_eq!(format_minutes(615), "10:15");
        assert_eq!(format_minutes(0), "00:00");
    }

    #[test]
    fn test_patch_merges_over_current() {
        let mut settings = ReservationSettings::default();
        settings.apply(SettingsPatch {
            buffer_time: Some(30),
            ..SettingsPatch::default()
        });
        assert_eq!(settings.buffer_time, 30);
        assert_eq!(settings.default_duration, 60);
        assert_eq!(settings.max_advance_days, 30);
    }

    #[test]
    fn test_validate_rejects_inverted_hours() {
        let mut settings = ReservationSettings::default();
        settings.business_hours.monday.open = "18:00".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_ignores_hours_on_disabled_day() {
        let mut settings = ReservationSettings::default();
        settings.business_hours.saturday.open = "18:00".to_string();
        settings.business_hours.saturday.close = "09:00".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let settings = ReservationSettings {
            default_duration: 0,
            ..ReservationSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
