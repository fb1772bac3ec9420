/*
 * Responsibility
 * - v2 の URL 構造を定義
 * - /health, /auth/{signup,logout}, /me, /workflow, /template を nest/merge
 * - 単体 resource の route にだけ resource middleware を route_layer で適用する
 *   (access middleware は app 側で v2 全体に layer する)
 */
use axum::{
    Extension, Router,
    routing::{get, post, put},
};

use crate::{
    api::v2::handlers::{
        auth::{logout, signup},
        health::health,
        me::me,
        resources::{
            create_resource, delete_resource, get_resource, list_resources, update_resource,
            update_share,
        },
    },
    middleware::auth::resource,
    repos::ResourceKind,
    state::AppState,
};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout))
        .route("/me", get(me))
        .nest(
            "/workflow",
            resource_routes(state.clone(), ResourceKind::Workflow),
        )
        .nest("/template", resource_routes(state, ResourceKind::Template))
}

fn resource_routes(state: AppState, kind: ResourceKind) -> Router<AppState> {
    let item = Router::new()
        .route(
            "/{id}",
            get(get_resource).put(update_resource).delete(delete_resource),
        )
        .route("/{id}/share", put(update_share));

    Router::new()
        .route("/", get(list_resources).post(create_resource))
        .merge(resource::apply(item, state))
        .layer(Extension(kind))
}
