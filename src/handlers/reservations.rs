use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::{require_role, Role};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::settings::parse_minutes;
use crate::models::{Reservation, ReservationStatus};
use crate::services::availability::{day_availability, DayAvailability};
use crate::services::scheduling::{self, NewReservation};
use crate::state::AppState;

fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {s}, expected YYYY-MM-DD")))
}

// GET /api/reservations/available-slots/:date
pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<DayAvailability>, AppError> {
    let date = parse_date(&date)?;

    let availability = {
        let db = state.db.lock().unwrap();
        let settings = queries::get_or_create_settings(&db)?;
        let booked = queries::booked_slots(&db, date)?;
        day_availability(&settings, date, &booked)
    };

    Ok(Json(availability))
}

// POST /api/reservations
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub date: String,
    pub time_slot: String,
    pub notes: Option<String>,
}

pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if body.email.trim().is_empty() || !body.email.contains('@') {
        return Err(AppError::Validation("a valid email is required".to_string()));
    }
    let date = parse_date(&body.date)?;

    let reservation = {
        let db = state.db.lock().unwrap();
        scheduling::create_reservation(
            &db,
            NewReservation {
                name: body.name,
                email: body.email,
                phone: body.phone,
                service: body.service,
                date,
                time_slot: body.time_slot,
                notes: body.notes,
                user_id: None,
            },
        )?
    };

    tracing::info!(
        id = %reservation.id,
        date = %reservation.date,
        slot = %reservation.time_slot,
        "reservation created"
    );
    notify_new_reservation(&state, &reservation).await;

    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Best-effort notifications; a mail failure never fails the booking.
async fn notify_new_reservation(state: &AppState, reservation: &Reservation) {
    let when = format!("{} at {}", reservation.date, reservation.time_slot);

    if !state.config.notify_email.is_empty() {
        let body = format!(
            "New reservation from {} ({}) for {}.",
            reservation.name, reservation.email, when
        );
        if let Err(e) = state
            .email
            .send(&state.config.notify_email, "New reservation", &body)
            .await
        {
            tracing::warn!(error = %e, "failed to send owner notification");
        }
    }

    let body = format!(
        "Hi {}, we received your reservation request for {}. We'll be in touch to confirm.",
        reservation.name, when
    );
    if let Err(e) = state
        .email
        .send(&reservation.email, "Reservation received", &body)
        .await
    {
        tracing::warn!(error = %e, "failed to send customer acknowledgment");
    }
}

// GET /api/reservations
#[derive(Deserialize)]
pub struct ReservationsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ReservationsQuery>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    require_role(&headers, state.tokens.as_ref(), Role::Staff)?;

    let limit = query.limit.unwrap_or(100);
    let reservations = {
        let db = state.db.lock().unwrap();
        queries::get_all_reservations(&db, query.status.as_deref(), limit)?
    };

    Ok(Json(reservations))
}

// PUT /api/reservations/:id
//
// Only the allow-listed fields below are applied; anything else in the
// body (id, timestamps, duration, userId, ...) is dropped silently.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
    pub status: Option<ReservationStatus>,
    pub notes: Option<String>,
}

pub async fn update_reservation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateReservationRequest>,
) -> Result<Json<Reservation>, AppError> {
    require_role(&headers, state.tokens.as_ref(), Role::Staff)?;

    let date = body.date.as_deref().map(parse_date).transpose()?;
    if let Some(slot) = &body.time_slot {
        if parse_minutes(slot).is_none() {
            return Err(AppError::Validation(format!(
                "invalid time slot: {slot}, expected HH:MM"
            )));
        }
    }

    let patch = queries::ReservationPatch {
        name: body.name,
        email: body.email,
        phone: body.phone,
        service: body.service,
        date,
        time_slot: body.time_slot,
        status: body.status,
        notes: body.notes,
    };

    let result = {
        let db = state.db.lock().unwrap();
        queries::update_reservation(&db, &id, patch)
    };

    match result {
        Ok(Some(reservation)) => Ok(Json(reservation)),
        Ok(None) => Err(AppError::NotFound(format!("reservation {id}"))),
        Err(e) => match e.downcast_ref::<rusqlite::Error>() {
            Some(db_err) if queries::is_unique_violation(db_err) => Err(AppError::SlotConflict(
                "that time slot is already booked".to_string(),
            )),
            _ => Err(AppError::Internal(e)),
        },
    }
}

// DELETE /api/reservations/:id
pub async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_role(&headers, state.tokens.as_ref(), Role::Admin)?;

    let removed = {
        let db = state.db.lock().unwrap();
        queries::delete_reservation(&db, &id)?
    };

    if removed {
        Ok(Json(serde_json::json!({ "ok": true })))
    } else {
        Err(AppError::NotFound(format!("reservation {id}")))
    }
}
