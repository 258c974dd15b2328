use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::auth::{require_role, Role};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{ReservationSettings, SettingsPatch};
use crate::state::AppState;

// GET /api/reservation-settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReservationSettings>, AppError> {
    let settings = {
        let db = state.db.lock().unwrap();
        queries::get_or_create_settings(&db)?
    };
    Ok(Json(settings))
}

// PUT /api/reservation-settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<ReservationSettings>, AppError> {
    require_role(&headers, state.tokens.as_ref(), Role::Staff)?;

    let settings = {
        let db = state.db.lock().unwrap();
        let mut settings = queries::get_or_create_settings(&db)?;
        settings.apply(patch);
        settings.validate().map_err(AppError::Validation)?;
        queries::save_settings(&db, &settings)?;
        settings
    };

    tracing::info!("reservation settings updated");
    Ok(Json(settings))
}
