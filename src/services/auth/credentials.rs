/*
 * Responsibility
 * - request から raw token を取り出す (cookie `auth` → `Authorization: Bearer <token>`)
 * - 形式が違うものは「token なし」として扱う (エラーにはしない)
 */
use axum::http::{HeaderMap, header};

/// Cookie that carries the access token for browser clients.
pub const AUTH_COOKIE_NAME: &str = "auth";

/// Locate the raw access token for this request.
///
/// Returns an empty string when no usable credential is present.
pub fn locate(headers: &HeaderMap) -> String {
    if let Some(token) = from_cookie(headers) {
        return token;
    }

    from_bearer(headers).unwrap_or_default()
}

fn from_cookie(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(cookie_str) = value.to_str() else {
            continue;
        };

        for pair in cookie_str.split(';') {
            if let Some((name, token)) = pair.trim().split_once('=')
                && name == AUTH_COOKIE_NAME
                && !token.is_empty()
            {
                return Some(token.to_string());
            }
        }
    }

    None
}

fn from_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    // exactly `<scheme> <token>`
    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("bearer") || parts[1].is_empty() {
        return None;
    }

    Some(parts[1].to_string())
}
