use axum::http::HeaderMap;

use crate::config::AuthConfig;
use crate::services::auth::context::RequestContext;
use crate::services::auth::credentials;
use crate::services::auth::error::AuthError;
use crate::services::auth::issuer::TokenIssuer;
use crate::services::auth::pipeline::AuthPipeline;
use crate::services::auth::routes::RoutePolicy;
use crate::services::auth::token::{TokenOutcome, TokenValidator};

/// Process-wide authentication service, built once from `AuthConfig`.
///
/// Without a signing secret the validator and issuer are absent and every
/// operation that needs them fails closed with `AuthError::NotConfigured`.
#[derive(Debug, Clone)]
pub struct AuthService {
    validator: Option<TokenValidator>,
    issuer: Option<TokenIssuer>,
    pipeline: AuthPipeline,
    default_limit_workflows: u32,
    default_limit_nodes: u32,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_deref().filter(|s| !s.is_empty());

        Self {
            validator: secret.map(|s| TokenValidator::new(s, config.leeway_seconds)),
            issuer: secret.map(|s| TokenIssuer::new(s, config.token_ttl_seconds)),
            pipeline: AuthPipeline::new(RoutePolicy::new(config.public_routes.iter().cloned())),
            default_limit_workflows: config.default_limit_workflows,
            default_limit_nodes: config.default_limit_nodes,
            secure_cookies: config.secure_cookies,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.validator.is_some()
    }

    pub fn validator(&self) -> Result<&TokenValidator, AuthError> {
        self.validator.as_ref().ok_or(AuthError::NotConfigured)
    }

    pub fn issuer(&self) -> Result<&TokenIssuer, AuthError> {
        self.issuer.as_ref().ok_or(AuthError::NotConfigured)
    }

    pub fn default_limits(&self) -> (u32, u32) {
        (self.default_limit_workflows, self.default_limit_nodes)
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Locate + validate the credential carried by `headers`.
    pub fn capture(&self, headers: &HeaderMap) -> Result<TokenOutcome, AuthError> {
        let validator = self.validator()?;
        Ok(validator.validate(&credentials::locate(headers)))
    }

    /// Full per-request pipeline: public skip, capture, classify, extract.
    pub fn authenticate(&self, path: &str, headers: &HeaderMap) -> Result<RequestContext, AuthError> {
        self.pipeline.authorize(path, || self.capture(headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::issuer::TokenSubject;
    use axum::http::{HeaderValue, header};

    fn config(secret: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.map(str::to_string),
            leeway_seconds: 0,
            token_ttl_seconds: 600,
            public_routes: vec!["/auth/signup".into(), "/health".into()],
            default_limit_workflows: 10,
            default_limit_nodes: 50,
            secure_cookies: false,
        }
    }

    #[test]
    fn unconfigured_secret_fails_closed_on_protected_routes() {
        let auth = AuthService::new(&config(None));
        assert!(!auth.is_configured());
        assert!(matches!(
            auth.authenticate("/api/v2/workflow", &HeaderMap::new()),
            Err(AuthError::NotConfigured)
        ));
        assert!(matches!(auth.issuer(), Err(AuthError::NotConfigured)));
    }

    #[test]
    fn unconfigured_secret_still_serves_public_routes() {
        let auth = AuthService::new(&config(Some("")));
        assert!(auth.authenticate("/api/v2/health", &HeaderMap::new()).is_ok());
    }

    #[test]
    fn bearer_token_is_authenticated_end_to_end() {
        let auth = AuthService::new(&config(Some("secret")));
        let token = auth
            .issuer()
            .unwrap()
            .issue(&TokenSubject {
                sub: "u1".into(),
                roles: vec!["admin".into(), "subscriber".into()],
                email: Some("u1@example.com".into()),
                limit_workflows: 1,
                limit_nodes: 1,
            })
            .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );

        let ctx = auth.authenticate("/api/v2/workflow", &headers).unwrap();
        assert_eq!(ctx.user_id(), Some("u1"));
        assert_eq!(ctx.email(), Some("u1@example.com"));
        assert!(ctx.identity().has_role("subscriber"));
    }
}
