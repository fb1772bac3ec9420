use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::middleware::auth::ResourceGrant;
use crate::services::auth::{Identity, RequestContext};

use super::{Authenticated, Caller, Grant};

/// Handler で RequestContext を受け取るための extractor
/// access middleware が request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（ミドルウェア未設定）
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(Caller)
            .ok_or(AppError::AuthenticationRequired)
    }
}

/// optional auth の route でも、この extractor を使う handler は identity 必須
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Caller(ctx) = Caller::from_request_parts(parts, state).await?;
        let identity: Identity = ctx.identity();

        if identity.is_anonymous() {
            return Err(AppError::AuthenticationRequired);
        }
        Ok(Authenticated(identity))
    }
}

/// resource middleware が入れた ResourceGrant。無い場合は配線ミスなので 500
impl<S> FromRequestParts<S> for Grant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResourceGrant>()
            .cloned()
            .map(Grant)
            .ok_or_else(|| {
                tracing::error!("ResourceGrant missing; resource middleware not applied");
                AppError::Internal
            })
    }
}
