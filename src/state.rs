/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: AuthService (validator / issuer / pipeline)
 *   - store: ResourceStore (workflow / template)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::ResourceStore;
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub store: Arc<dyn ResourceStore>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, store: Arc<dyn ResourceStore>) -> Self {
        Self { auth, store }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.auth)
            .field("store", &self.store.backend_name())
            .finish()
    }
}
