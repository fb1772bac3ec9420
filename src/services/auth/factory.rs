/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::AuthService;

pub fn build_auth_service(config: &Config) -> Arc<AuthService> {
    let auth = AuthService::new(&config.auth);

    if !auth.is_configured() {
        // Protected routes answer 500 until JWT_SECRET is provided.
        tracing::warn!("JWT_SECRET is not set; protected routes will fail closed");
    }

    Arc::new(auth)
}
