use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub staff_token: String,
    pub admin_token: String,
    pub superuser_token: String,
    pub resend_api_key: String,
    pub email_from: String,
    pub notify_email: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "bookdesk.db".to_string()),
            staff_token: env::var("STAFF_TOKEN").unwrap_or_default(),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            superuser_token: env::var("SUPERUSER_TOKEN").unwrap_or_default(),
            resend_api_key: env::var("RESEND_API_KEY").unwrap_or_default(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "bookings@example.com".to_string()),
            notify_email: env::var("NOTIFY_EMAIL").unwrap_or_default(),
        }
    }
}
