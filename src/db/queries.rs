use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use rusqlite::{params, Connection};

use crate::models::{Reservation, ReservationSettings, ReservationStatus};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Wall-clock now truncated to whole seconds; stored timestamps carry no
/// subsecond precision, so a row must read back equal to what was written.
pub fn now_secs() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

// ── Settings ──

/// Reads the singleton settings row without creating it.
pub fn get_settings(conn: &Connection) -> anyhow::Result<Option<ReservationSettings>> {
    let result = conn.query_row(
        "SELECT business_hours, default_duration, buffer_time, max_advance_days, allowed_services
         FROM reservation_settings WHERE id = 1",
        [],
        |row| {
            let business_hours_json: String = row.get(0)?;
            let default_duration: i64 = row.get(1)?;
            let buffer_time: i64 = row.get(2)?;
            let max_advance_days: i64 = row.get(3)?;
            let allowed_services_json: String = row.get(4)?;
            Ok((
                business_hours_json,
                default_duration,
                buffer_time,
                max_advance_days,
                allowed_services_json,
            ))
        },
    );

    match result {
        Ok((hours_json, default_duration, buffer_time, max_advance_days, services_json)) => {
            Ok(Some(ReservationSettings {
                business_hours: serde_json::from_str(&hours_json)?,
                default_duration,
                buffer_time,
                max_advance_days,
                allowed_services: serde_json::from_str(&services_json)?,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Returns the settings row, inserting the defaults first if none exists.
/// The pinned primary key makes the insert idempotent, so concurrent first
/// reads cannot produce duplicate default rows.
pub fn get_or_create_settings(conn: &Connection) -> anyhow::Result<ReservationSettings> {
    let defaults = ReservationSettings::default();
    conn.execute(
        "INSERT OR IGNORE INTO reservation_settings
             (id, business_hours, default_duration, buffer_time, max_advance_days, allowed_services)
         VALUES (1, ?1, ?2, ?3, ?4, ?5)",
        params![
            serde_json::to_string(&defaults.business_hours)?,
            defaults.default_duration,
            defaults.buffer_time,
            defaults.max_advance_days,
            serde_json::to_string(&defaults.allowed_services)?,
        ],
    )?;

    get_settings(conn)?.ok_or_else(|| anyhow::anyhow!("settings row missing after insert"))
}

pub fn save_settings(conn: &Connection, settings: &ReservationSettings) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO reservation_settings
             (id, business_hours, default_duration, buffer_time, max_advance_days, allowed_services)
         VALUES (1, ?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
           business_hours = excluded.business_hours,
           default_duration = excluded.default_duration,
           buffer_time = excluded.buffer_time,
           max_advance_days = excluded.max_advance_days,
           allowed_services = excluded.allowed_services,
           updated_at = datetime('now')",
        params![
            serde_json::to_string(&settings.business_hours)?,
            settings.default_duration,
            settings.buffer_time,
            settings.max_advance_days,
            serde_json::to_string(&settings.allowed_services)?,
        ],
    )?;
    Ok(())
}

// ── Reservations ──

/// True when an insert/update tripped the unique index on active
/// (date, time_slot) pairs, i.e. the slot is taken.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Plain rusqlite error so callers can distinguish the unique-index
/// violation on an active (date, time_slot) pair.
pub fn insert_reservation(
    conn: &Connection,
    reservation: &Reservation,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO reservations
             (id, name, email, phone, service, date, time_slot, notes, status, duration_minutes, user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            reservation.id,
            reservation.name,
            reservation.email,
            reservation.phone,
            reservation.service,
            reservation.date.format(DATE_FMT).to_string(),
            reservation.time_slot,
            reservation.notes,
            reservation.status.as_str(),
            reservation.duration_minutes,
            reservation.user_id,
            reservation.created_at.format(DATETIME_FMT).to_string(),
            reservation.updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_for_date(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<Reservation>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, service, date, time_slot, notes, status, duration_minutes, user_id, created_at, updated_at
         FROM reservations WHERE date = ?1 ORDER BY time_slot ASC",
    )?;

    let rows = stmt.query_map(params![date.format(DATE_FMT).to_string()], |row| {
        Ok(parse_reservation_row(row))
    })?;

    let mut reservations = vec![];
    for row in rows {
        reservations.push(row??);
    }
    Ok(reservations)
}

/// Slots held by reservations that still block their slot: everything
/// except cancelled. The same scope backs the unique index.
pub fn booked_slots(conn: &Connection, date: NaiveDate) -> anyhow::Result<HashSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT time_slot FROM reservations WHERE date = ?1 AND status != 'cancelled'",
    )?;

    let rows = stmt.query_map(params![date.format(DATE_FMT).to_string()], |row| {
        row.get::<_, String>(0)
    })?;

    let mut slots = HashSet::new();
    for row in rows {
        slots.insert(row?);
    }
    Ok(slots)
}

pub fn get_all_reservations(
    conn: &Connection,
    status_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Reservation>> {
    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match status_filter {
        Some(status) => (
            "SELECT id, name, email, phone, service, date, time_slot, notes, status, duration_minutes, user_id, created_at, updated_at \
             FROM reservations WHERE status = ?1 ORDER BY date DESC, time_slot DESC LIMIT ?2"
                .to_string(),
            vec![
                Box::new(status.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(limit),
            ],
        ),
        None => (
            "SELECT id, name, email, phone, service, date, time_slot, notes, status, duration_minutes, user_id, created_at, updated_at \
             FROM reservations ORDER BY date DESC, time_slot DESC LIMIT ?1"
                .to_string(),
            vec![Box::new(limit) as Box<dyn rusqlite::types::ToSql>],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_reservation_row(row)))?;

    let mut reservations = vec![];
    for row in rows {
        reservations.push(row??);
    }
    Ok(reservations)
}

pub fn get_reservation_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Reservation>> {
    let result = conn.query_row(
        "SELECT id, name, email, phone, service, date, time_slot, notes, status, duration_minutes, user_id, created_at, updated_at \
         FROM reservations WHERE id = ?1",
        params![id],
        |row| Ok(parse_reservation_row(row)),
    );

    match result {
        Ok(reservation) => Ok(Some(reservation?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Allow-listed partial update. Fields outside this struct never reach the
/// row; in particular id, duration, user link and timestamps are immutable
/// through this path.
#[derive(Debug, Clone, Default)]
pub struct ReservationPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub date: Option<NaiveDate>,
    pub time_slot: Option<String>,
    pub status: Option<ReservationStatus>,
    pub notes: Option<String>,
}

pub fn update_reservation(
    conn: &Connection,
    id: &str,
    patch: ReservationPatch,
) -> anyhow::Result<Option<Reservation>> {
    let Some(mut reservation) = get_reservation_by_id(conn, id)? else {
        return Ok(None);
    };

    if let Some(name) = patch.name {
        reservation.name = name;
    }
    if let Some(email) = patch.email {
        reservation.email = email;
    }
    if let Some(phone) = patch.phone {
        reservation.phone = Some(phone);
    }
    if let Some(service) = patch.service {
        reservation.service = Some(service);
    }
    if let Some(date) = patch.date {
        reservation.date = date;
    }
    if let Some(time_slot) = patch.time_slot {
        reservation.time_slot = time_slot;
    }
    if let Some(status) = patch.status {
        reservation.status = status;
    }
    if let Some(notes) = patch.notes {
        reservation.notes = Some(notes);
    }
    reservation.updated_at = now_secs();

    conn.execute(
        "UPDATE reservations SET
             name = ?1, email = ?2, phone = ?3, service = ?4, date = ?5,
             time_slot = ?6, status = ?7, notes = ?8, updated_at = ?9
         WHERE id = ?10",
        params![
            reservation.name,
            reservation.email,
            reservation.phone,
            reservation.service,
            reservation.date.format(DATE_FMT).to_string(),
            reservation.time_slot,
            reservation.status.as_str(),
            reservation.notes,
            reservation.updated_at.format(DATETIME_FMT).to_string(),
            id,
        ],
    )?;

    Ok(Some(reservation))
}

pub fn delete_reservation(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM reservations WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_reservation_row(row: &rusqlite::Row) -> anyhow::Result<Reservation> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let phone: Option<String> = row.get(3)?;
    let service: Option<String> = row.get(4)?;
    let date_str: String = row.get(5)?;
    let time_slot: String = row.get(6)?;
    let notes: Option<String> = row.get(7)?;
    let status_str: String = row.get(8)?;
    let duration_minutes: i64 = row.get(9)?;
    let user_id: Option<String> = row.get(10)?;
    let created_at_str: String = row.get(11)?;
    let updated_at_str: String = row.get(12)?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FMT)
        .unwrap_or_else(|_| Utc::now().date_naive());
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, DATETIME_FMT)
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, DATETIME_FMT)
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Reservation {
        id,
        name,
        email,
        phone,
        service,
        date,
        time_slot,
        notes,
        status: ReservationStatus::parse(&status_str),
        duration_minutes,
        user_id,
        created_at,
        updated_at,
    })
}
