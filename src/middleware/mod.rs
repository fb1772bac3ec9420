/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (access token / resource grant), cors, http (request-id, trace, limits, security headers)
 */
pub mod auth;
pub mod cors;
pub mod http;
