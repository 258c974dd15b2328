use std::sync::{Arc, Mutex};

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bookdesk::auth::StaticTokenStore;
use bookdesk::config::AppConfig;
use bookdesk::db;
use bookdesk::handlers;
use bookdesk::services::email::resend::ResendProvider;
use bookdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.resend_api_key.is_empty() {
        tracing::warn!("RESEND_API_KEY not set, booking notifications will fail silently");
    }
    let email = ResendProvider::new(config.resend_api_key.clone(), config.email_from.clone());
    let tokens = StaticTokenStore::from_config(&config);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        email: Box::new(email),
        tokens: Box::new(tokens),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/reservation-settings",
            get(handlers::settings::get_settings),
        )
        .route(
            "/api/reservation-settings",
            put(handlers::settings::update_settings),
        )
        .route(
            "/api/reservations/available-slots/:date",
            get(handlers::reservations::available_slots),
        )
        .route(
            "/api/reservations",
            post(handlers::reservations::create_reservation),
        )
        .route(
            "/api/reservations",
            get(handlers::reservations::list_reservations),
        )
        .route(
            "/api/reservations/:id",
            put(handlers::reservations::update_reservation),
        )
        .route(
            "/api/reservations/:id",
            delete(handlers::reservations::delete_reservation),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
