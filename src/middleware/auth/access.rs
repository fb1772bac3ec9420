//! access token 検証 → RequestContext を extensions に入れる
//!
//! - public route: credential は見ない (壊れた cookie が signup 等を壊さないように)
//! - それ以外: cookie `auth` / `Authorization: Bearer` を検証し、
//!   エラーを分類してから identity を RequestContext に書く
//! - token なしは通す (optional auth)。拒否は resource 側 / handler 側で行う

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// `/api/v2/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let v2 = api::v2::routes(state.clone());
/// let v2 = middleware::auth::access::apply(v2, state.clone());
/// app = app.nest(API_PREFIX, v2);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // nest で prefix が剥がされる前の path で判定する (suffix match)
    let path = original_uri.path();

    let ctx = state
        .auth
        .authenticate(path, req.headers())
        .map_err(|err| {
            tracing::debug!(path, error = %err, "request rejected by auth pipeline");
            AppError::from(err)
        })?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
