use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::settings::{format_minutes, parse_minutes};
use crate::models::ReservationSettings;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OpenClose {
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub available_slots: Vec<String>,
    pub business_hours: Option<OpenClose>,
}

impl DayAvailability {
    fn closed() -> Self {
        Self {
            available_slots: Vec::new(),
            business_hours: None,
        }
    }
}

/// Generates candidate slot start times between `open` and `close`.
///
/// The cursor starts at `open` and advances by `step_minutes` until it
/// reaches `close`. A slot is emitted whenever its start precedes `close`;
/// whether the appointment itself fits before closing is deliberately not
/// checked.
pub fn generate_slots(open: &str, close: &str, step_minutes: i64) -> Vec<String> {
    let (Some(open), Some(close)) = (parse_minutes(open), parse_minutes(close)) else {
        return Vec::new();
    };
    if step_minutes < 1 {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut cursor = open;
    while cursor < close {
        slots.push(format_minutes(cursor));
        cursor += step_minutes;
    }
    slots
}

/// Resolves the free slots for `date`: business-hours lookup by the date's
/// own weekday, generation, then removal of already-booked slots. A
/// disabled day short-circuits to no slots and no hours, independent of
/// the booked set.
pub fn day_availability(
    settings: &ReservationSettings,
    date: NaiveDate,
    booked: &HashSet<String>,
) -> DayAvailability {
    let hours = settings.business_hours.for_date(date);
    if !hours.enabled {
        return DayAvailability::closed();
    }

    let step = settings.default_duration + settings.buffer_time;
    let available_slots = generate_slots(&hours.open, &hours.close, step)
        .into_iter()
        .filter(|slot| !booked.contains(slot))
        .collect();

    DayAvailability {
        available_slots,
        business_hours: Some(OpenClose {
            open: hours.open.clone(),
            close: hours.close.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(duration: i64, buffer: i64) -> ReservationSettings {
        ReservationSettings {
            default_duration: duration,
            buffer_time: buffer,
            ..ReservationSettings::default()
        }
    }

    // 2025-06-16 is a Monday, 2025-06-15 a Sunday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
    }

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_slot_generation_cursor_arithmetic() {
        // 60 min appointments + 15 min buffer between 09:00 and 12:00:
        // 09:00, 10:15, 11:30; 12:45 would be past close.
        assert_eq!(
            generate_slots("09:00", "12:00", 75),
            vec!["09:00", "10:15", "11:30"]
        );
    }

    #[test]
    fn test_last_slot_start_may_precede_close() {
        // 11:30 + 75 min runs past 12:00; only the start is gated.
        let slots = generate_slots("09:00", "12:00", 75);
        assert_eq!(slots.last().map(String::as_str), Some("11:30"));
    }

    #[test]
    fn test_slot_at_close_excluded() {
        assert_eq!(generate_slots("09:00", "10:00", 30), vec!["09:00", "09:30"]);
    }

    #[test]
    fn test_unparseable_hours_yield_no_slots() {
        assert!(generate_slots("late", "17:00", 60).is_empty());
        assert!(generate_slots("09:00", "17:00", 0).is_empty());
    }

    #[test]
    fn test_enabled_day_no_bookings() {
        let mut s = settings(60, 15);
        s.business_hours.monday.close = "12:00".to_string();

        let result = day_availability(&s, monday(), &HashSet::new());
        assert_eq!(result.available_slots, vec!["09:00", "10:15", "11:30"]);
        assert_eq!(
            result.business_hours,
            Some(OpenClose {
                open: "09:00".to_string(),
                close: "12:00".to_string(),
            })
        );
    }

    #[test]
    fn test_disabled_day_is_fully_closed() {
        let s = settings(60, 15);
        let booked: HashSet<String> = ["09:00".to_string()].into_iter().collect();

        let result = day_availability(&s, sunday(), &booked);
        assert!(result.available_slots.is_empty());
        assert!(result.business_hours.is_none());
    }

    #[test]
    fn test_booked_slots_excluded_in_order() {
        let mut s = settings(60, 15);
        s.business_hours.monday.close = "12:00".to_string();
        let booked: HashSet<String> = ["10:15".to_string()].into_iter().collect();

        let result = day_availability(&s, monday(), &booked);
        assert_eq!(result.available_slots, vec!["09:00", "11:30"]);
    }

    #[test]
    fn test_all_slots_booked_leaves_hours_visible() {
        let mut s = settings(60, 15);
        s.business_hours.monday.close = "10:00".to_string();
        let booked: HashSet<String> = ["09:00".to_string()].into_iter().collect();

        let result = day_availability(&s, monday(), &booked);
        assert!(result.available_slots.is_empty());
        assert!(result.business_hours.is_some());
    }
}
