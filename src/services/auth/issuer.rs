use jsonwebtoken::{EncodingKey, Header};
use serde::Serialize;
use tracing::error;

use crate::services::auth::error::AuthError;
use crate::services::auth::token::SIGNING_ALGORITHM;

#[derive(Debug, Serialize)]
struct AccessTokenClaims<'a> {
    sub: &'a str,
    roles: &'a [String],
    #[serde(rename = "limitWorkflows")]
    limit_workflows: u32,
    #[serde(rename = "limitNodes")]
    limit_nodes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    exp: i64,
    iat: i64,
}

/// What a freshly issued token should say about its subject.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub sub: String,
    pub roles: Vec<String>,
    pub email: Option<String>,
    pub limit_workflows: u32,
    pub limit_nodes: u32,
}

/// Signs access tokens with the shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue(&self, subject: &TokenSubject) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| {
                error!(ttl_seconds = self.ttl_seconds, "token lifetime overflows exp");
                AuthError::TokenLifetime
            })?;

        let claims = AccessTokenClaims {
            sub: &subject.sub,
            roles: &subject.roles,
            limit_workflows: subject.limit_workflows,
            limit_nodes: subject.limit_nodes,
            email: subject.email.as_deref(),
            exp,
            iat: now,
        };

        let mut header = Header::new(SIGNING_ALGORITHM);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign access token");
            AuthError::from(e)
        })
    }
}
