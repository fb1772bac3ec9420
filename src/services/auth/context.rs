/*
 * Responsibility
 * - 1 request 専用のコンテキスト (token エラー文字列 / claims / 導出した identity)
 * - middleware が作って request extensions に入れ、handler は読むだけ
 * - request をまたいで共有・再利用しない
 */
use crate::services::auth::claims::Identity;
use crate::services::auth::token::{Claims, TokenOutcome};

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    jwt_error: String,
    claims: Option<Claims>,
    user_id: Option<String>,
    roles: Option<Vec<String>>,
    email: Option<String>,
}

impl RequestContext {
    /// A context with nothing recorded (public routes).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outcome(outcome: TokenOutcome) -> Self {
        let jwt_error = outcome.error_text().to_string();
        let claims = match outcome {
            TokenOutcome::Valid { claims } => Some(claims),
            TokenOutcome::Missing | TokenOutcome::Invalid { .. } => None,
        };

        Self {
            jwt_error,
            claims,
            ..Self::default()
        }
    }

    /// Context as if the token layer had recorded `jwt_error` without claims.
    #[cfg(test)]
    pub fn with_error(jwt_error: impl Into<String>) -> Self {
        Self {
            jwt_error: jwt_error.into(),
            ..Self::default()
        }
    }

    pub fn jwt_error(&self) -> &str {
        &self.jwt_error
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    #[cfg(test)]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    #[cfg(test)]
    pub fn roles(&self) -> Option<&[String]> {
        self.roles.as_deref()
    }

    #[cfg(test)]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub(crate) fn set_user_id(&mut self, user_id: String) {
        self.user_id = Some(user_id);
    }

    pub(crate) fn set_roles(&mut self, roles: Vec<String>) {
        self.roles = Some(roles);
    }

    pub(crate) fn set_email(&mut self, email: String) {
        self.email = Some(email);
    }

    pub(crate) fn clear_identity(&mut self) {
        self.user_id = None;
        self.roles = None;
        self.email = None;
    }

    /// Identity view for downstream handlers.
    pub fn identity(&self) -> Identity {
        Identity {
            subject: self.user_id.clone(),
            roles: self.roles.clone().unwrap_or_default(),
            email: self.email.clone(),
        }
    }
}
