//! Resource loading + access resolution for `/{kind}/{id}` routes.
//!
//! Runs after `access` (identity is already in `RequestContext`):
//! - load the workflow/template (404 before any access check)
//! - resolve `ResourceAccess` for the caller and current method
//! - hand `ResourceGrant` to the handler via extensions

use axum::{
    Extension, Router,
    body::Body,
    extract::{Path, State},
    http::{Method, Request},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::repos::{ResourceKind, ResourceRecord};
use crate::services::auth::RequestContext;
use crate::services::sharing::{self, ResourceAccess};
use crate::state::AppState;

/// The loaded resource and the caller's grant on it.
#[derive(Debug, Clone)]
pub struct ResourceGrant {
    pub resource: ResourceRecord,
    pub access: ResourceAccess,
}

/// Routes must carry an `{id}` path parameter and an `Extension<ResourceKind>`.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, resource_middleware))
}

async fn resource_middleware(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<String>,
    method: Method,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req
        .extensions()
        .get::<RequestContext>()
        .map(RequestContext::identity)
        .unwrap_or_default();

    let resource = state
        .store
        .find(kind, &id)
        .await?
        .ok_or(AppError::not_found(kind.label()))?;

    let access = sharing::resolve(&identity, &resource.owner_id, &resource.share, &method)
        .map_err(|err| {
            tracing::info!(
                resource = kind.label(),
                id = %id,
                user_id = identity.subject().unwrap_or("-"),
                error = %err,
                "resource access denied"
            );
            AppError::from(err)
        })?;

    tracing::debug!(
        resource = kind.label(),
        id = %id,
        owner = access.is_owner(),
        writeable = access.is_writeable(),
        "resource access granted"
    );

    req.extensions_mut()
        .insert(ResourceGrant { resource, access });

    Ok(next.run(req).await)
}
