use axum::Json;

use crate::api::v2::{dto::auth::MeResponse, extractors::Authenticated};

pub async fn me(Authenticated(identity): Authenticated) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: identity.subject.unwrap_or_default(),
        roles: identity.roles,
        email: identity.email,
    })
}
