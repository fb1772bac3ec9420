use thiserror::Error;

/// Errors produced by the authentication layer.
///
/// Kept independent of `AppError` so the HTTP mapping stays in one place.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication required")]
    AuthenticationRequired,

    #[error("token signing secret is not configured")]
    NotConfigured,

    #[error("token lifetime out of range")]
    TokenLifetime,

    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
