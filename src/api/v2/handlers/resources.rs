/*
 * Responsibility
 * - /workflow, /template 共通の CRUD + share handler
 * - 単体 resource のロードと access 判定は resource middleware 済み (Grant)
 * - handler は操作ごとの要求 (writeable / owner) だけを確認する
 */
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{Method, StatusCode},
};
use uuid::Uuid;

use crate::{
    api::v2::{
        dto::resources::{
            CreateResourceRequest, ListQuery, ResourceResponse, UpdateResourceRequest,
            validate_share,
        },
        extractors::{Authenticated, Caller, Grant},
    },
    error::AppError,
    repos::{NewResource, ResourceChanges, ResourceKind},
    services::sharing::{self, ResourceAccess, SharePolicy},
    state::AppState,
};

/// Resources the caller may read, newest first, one page at a time.
pub async fn list_resources(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Caller(ctx): Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ResourceResponse>>, AppError> {
    let page = query
        .page()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let identity = ctx.identity();
    let rows = state.store.list(kind, &identity, page).await?;

    // the store narrows rows coarsely; the resolver decides
    let res = rows
        .into_iter()
        .filter_map(|row| {
            sharing::resolve(&identity, &row.owner_id, &row.share, &Method::GET)
                .ok()
                .map(|access| ResourceResponse::new(row, access))
        })
        .collect();

    Ok(Json(res))
}

pub async fn create_resource(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Authenticated(identity): Authenticated,
    Json(req): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ResourceResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let owner_id = identity.subject().unwrap_or_default().to_string();
    let row = state
        .store
        .insert(
            kind,
            NewResource {
                id: Uuid::new_v4().to_string(),
                owner_id,
                name: req.name.trim().to_string(),
                body: req.body,
                share: req.share.unwrap_or_default(),
            },
        )
        .await?;

    tracing::info!(resource = kind.label(), id = %row.id, owner = %row.owner_id, "created");

    let access = ResourceAccess::from_grants(true, true, true);
    Ok((StatusCode::CREATED, Json(ResourceResponse::new(row, access))))
}

pub async fn get_resource(Grant(grant): Grant) -> Json<ResourceResponse> {
    Json(ResourceResponse::new(grant.resource, grant.access))
}

pub async fn update_resource(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Grant(grant): Grant,
    Json(req): Json<UpdateResourceRequest>,
) -> Result<Json<ResourceResponse>, AppError> {
    if !grant.access.is_writeable() {
        return Err(AppError::AccessDenied);
    }
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let row = state
        .store
        .update(
            kind,
            &grant.resource.id,
            ResourceChanges {
                name: req.name.map(|n| n.trim().to_string()),
                body: req.body,
            },
        )
        .await?
        .ok_or(AppError::not_found(kind.label()))?;

    Ok(Json(ResourceResponse::new(row, grant.access)))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Grant(grant): Grant,
) -> Result<StatusCode, AppError> {
    if !grant.access.is_owner() {
        return Err(AppError::AccessDenied);
    }

    if state.store.delete(kind, &grant.resource.id).await? {
        tracing::info!(resource = kind.label(), id = %grant.resource.id, "deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(kind.label()))
    }
}

/// Replaces the sharing policy. Owner only.
pub async fn update_share(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Grant(grant): Grant,
    Json(share): Json<SharePolicy>,
) -> Result<Json<ResourceResponse>, AppError> {
    if !grant.access.is_owner() {
        return Err(AppError::AccessDenied);
    }
    validate_share(&share).map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let row = state
        .store
        .set_share(kind, &grant.resource.id, share)
        .await?
        .ok_or(AppError::not_found(kind.label()))?;

    Ok(Json(ResourceResponse::new(row, grant.access)))
}
