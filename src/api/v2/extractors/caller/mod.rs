/*!
 * Caller context extractors
 *
 * Responsibility:
 * - 認証パイプラインの結果 (RequestContext / ResourceGrant) を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - Caller
 * - Authenticated
 * - Grant
 */

mod core;
mod types;

pub use types::{Authenticated, Caller, Grant};
