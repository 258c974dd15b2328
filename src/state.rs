use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::auth::TokenStore;
use crate::config::AppConfig;
use crate::services::email::EmailProvider;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub email: Box<dyn EmailProvider>,
    pub tokens: Box<dyn TokenStore>,
}
