use std::collections::HashMap;

use axum::http::HeaderMap;

use crate::config::AppConfig;
use crate::errors::AppError;

/// Staff can manage reservations and settings, admins can additionally
/// delete, superusers can do everything an admin can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Staff,
    Admin,
    Superuser,
}

/// Token resolution is injected so deployments can swap the static table
/// for a session service without touching the handlers.
pub trait TokenStore: Send + Sync {
    fn role_for(&self, token: &str) -> Option<Role>;
}

pub struct StaticTokenStore {
    tokens: HashMap<String, Role>,
}

impl StaticTokenStore {
    pub fn from_config(config: &AppConfig) -> Self {
        let mut tokens = HashMap::new();
        for (token, role) in [
            (&config.staff_token, Role::Staff),
            (&config.admin_token, Role::Admin),
            (&config.superuser_token, Role::Superuser),
        ] {
            if !token.is_empty() {
                tokens.insert(token.clone(), role);
            }
        }
        Self { tokens }
    }
}

impl TokenStore for StaticTokenStore {
    fn role_for(&self, token: &str) -> Option<Role> {
        self.tokens.get(token).copied()
    }
}

pub fn require_role(
    headers: &HeaderMap,
    tokens: &dyn TokenStore,
    minimum: Role,
) -> Result<Role, AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");

    match tokens.role_for(token) {
        None => Err(AppError::Unauthorized),
        Some(role) if role >= minimum => Ok(role),
        Some(_) => Err(AppError::Forbidden),
    }
}
