// [apps/broker/src/middleware.rs]
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::identity::resolve;

/// Resolves the caller's identity once and stashes it as a request
/// extension so handlers never re-parse headers. Never rejects a
/// request — anonymous access is allowed by design; authorization
/// decisions (credits, admin endpoints) happen in the handlers.
pub async fn auth_guard(mut request: Request, next: Next) -> Response {
    let identity = resolve(request.headers());
    request.extensions_mut().insert(identity);
    next.run(request).await
}
