/*
 * Responsibility
 * - POST /auth/signup: 匿名ユーザーを作成して access token を発行 (cookie + body)
 * - POST /auth/logout: auth cookie を消す
 *
 * Notes
 * - どちらも public route。古い/壊れた cookie が付いていても通る
 */
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    api::v2::dto::auth::{SignupRequest, SignupResponse},
    error::AppError,
    services::auth::{credentials::AUTH_COOKIE_NAME, issuer::TokenSubject},
    state::AppState,
};

const DEFAULT_ROLE: &str = "subscriber";

pub async fn signup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    // body は省略可 ({} と同じ扱い)
    let req: SignupRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SignupRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::bad_request("INVALID_BODY", e.to_string()))?
    };
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let issuer = state.auth.issuer()?;
    let (limit_workflows, limit_nodes) = state.auth.default_limits();

    let user_id = Uuid::new_v4().to_string();
    let token = issuer.issue(&TokenSubject {
        sub: user_id.clone(),
        roles: vec![DEFAULT_ROLE.to_string()],
        email: req.email,
        limit_workflows,
        limit_nodes,
    })?;

    let cookie = auth_cookie(&token, issuer.ttl_seconds(), state.auth.secure_cookies())?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie);

    tracing::info!(user_id = %user_id, "signup");

    Ok((
        StatusCode::CREATED,
        headers,
        Json(SignupResponse {
            user_id,
            access_token: token,
            token_type: "Bearer",
            expires_in: issuer.ttl_seconds(),
        }),
    ))
}

pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cookie = auth_cookie("", 0, state.auth.secure_cookies())?;
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

fn auth_cookie(value: &str, max_age: u64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie =
        format!("{AUTH_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|_| AppError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        let v = auth_cookie("abc", 60, false).unwrap();
        assert_eq!(
            v.to_str().unwrap(),
            "auth=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );

        let v = auth_cookie("", 0, true).unwrap();
        assert!(v.to_str().unwrap().ends_with("Max-Age=0; Secure"));
    }
}
