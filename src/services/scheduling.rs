use chrono::{Datelike, Duration, NaiveDate, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::settings::weekday_name;
use crate::models::{Reservation, ReservationStatus};
use crate::services::availability::generate_slots;

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("reservations are not configured yet")]
    NotConfigured,

    #[error("we are closed on {day}s")]
    DayClosed { day: String },

    #[error("the {slot} slot is already booked, please pick a different time")]
    SlotConflict { slot: String },

    #[error("{slot} is not a bookable time slot on that day")]
    InvalidSlot { slot: String },

    #[error("we do not offer \"{service}\"")]
    UnknownService { service: String },

    #[error("reservations can be made at most {max_days} days in advance")]
    TooFarAhead { max_days: i64 },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub date: NaiveDate,
    pub time_slot: String,
    pub notes: Option<String>,
    pub user_id: Option<String>,
}

/// Creates a reservation after the full precondition chain: settings must
/// exist (no lazy defaulting here), the weekday must be enabled, the slot
/// must be one the current settings generate, the service must be offered,
/// the date must be within the advance window, and the slot must be free.
///
/// The free-slot read is not atomic with the insert; the unique index on
/// active (date, time_slot) pairs is what actually guarantees the
/// invariant, and a constraint violation surfaces as `SlotConflict`.
pub fn create_reservation(
    conn: &Connection,
    input: NewReservation,
) -> Result<Reservation, SchedulingError> {
    let settings = queries::get_settings(conn)?.ok_or(SchedulingError::NotConfigured)?;

    let hours = settings.business_hours.for_date(input.date);
    if !hours.enabled {
        return Err(SchedulingError::DayClosed {
            day: weekday_name(input.date.weekday()).to_string(),
        });
    }

    let step = settings.default_duration + settings.buffer_time;
    let candidates = generate_slots(&hours.open, &hours.close, step);
    if !candidates.contains(&input.time_slot) {
        return Err(SchedulingError::InvalidSlot {
            slot: input.time_slot,
        });
    }

    if let Some(service) = &input.service {
        if !settings.allowed_services.is_empty() && !settings.allowed_services.contains(service) {
            return Err(SchedulingError::UnknownService {
                service: service.clone(),
            });
        }
    }

    let today = Utc::now().date_naive();
    if input.date > today + Duration::days(settings.max_advance_days) {
        return Err(SchedulingError::TooFarAhead {
            max_days: settings.max_advance_days,
        });
    }

    let booked = queries::booked_slots(conn, input.date)?;
    if booked.contains(&input.time_slot) {
        return Err(SchedulingError::SlotConflict {
            slot: input.time_slot,
        });
    }

    let now = queries::now_secs();
    let reservation = Reservation {
        id: uuid::Uuid::new_v4().to_string(),
        name: input.name,
        email: input.email,
        phone: input.phone,
        service: input.service,
        date: input.date,
        time_slot: input.time_slot,
        notes: input.notes,
        status: ReservationStatus::Pending,
        duration_minutes: settings.default_duration,
        user_id: input.user_id,
        created_at: now,
        updated_at: now,
    };

    match queries::insert_reservation(conn, &reservation) {
        Ok(()) => Ok(reservation),
        Err(e) if queries::is_unique_violation(&e) => Err(SchedulingError::SlotConflict {
            slot: reservation.time_slot,
        }),
        Err(e) => Err(SchedulingError::Storage(e.into())),
    }
}
