/*
 * Responsibility
 * - Handler から見える「呼び出し元」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - token の検証・分類・claims 抽出は middleware/services 側の責務
 * - handler は identity を自分で再導出しない
 */
use crate::middleware::auth::ResourceGrant;
use crate::services::auth::{Identity, RequestContext};

/// Per-request context (may be anonymous on optional-auth routes).
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

/// Caller with a non-empty subject; anonymous requests are rejected with 401.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

/// Resource loaded for this request together with the caller's access.
#[derive(Debug, Clone)]
pub struct Grant(pub ResourceGrant);
