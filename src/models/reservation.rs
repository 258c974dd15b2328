use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub date: NaiveDate,
    pub time_slot: String,
    pub notes: Option<String>,
    pub status: ReservationStatus,
    #[serde(rename = "duration")]
    pub duration_minutes: i64,
    pub user_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => ReservationStatus::Confirmed,
            "completed" => ReservationStatus::Completed,
            "cancelled" => ReservationStatus::Cancelled,
            _ => ReservationStatus::Pending,
        }
    }

    /// Whether a reservation in this status holds its slot. Only a
    /// cancelled reservation frees the slot for someone else.
    pub fn blocks_slot(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Completed,
            ReservationStatus::Cancelled,
        ] {
            assert_eq!(ReservationStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn test_unknown_status_defaults_to_pending() {
        assert_eq!(
            ReservationStatus::parse("garbage"),
            ReservationStatus::Pending
        );
    }

    #[test]
    fn test_only_cancelled_frees_slot() {
        assert!(ReservationStatus::Pending.blocks_slot());
        assert!(ReservationStatus::Confirmed.blocks_slot());
        assert!(ReservationStatus::Completed.blocks_slot());
        assert!(!ReservationStatus::Cancelled.blocks_slot());
    }
}
