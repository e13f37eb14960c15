//! Identity layer of the authorization guard.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use rolegate_auth::TokenCodec;

use crate::app::errors;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenCodec>,
}

/// Verify the bearer token and attach the decoded identity to the request.
///
/// Missing credentials and invalid/expired credentials are both 401; the
/// message distinguishes them, the status does not.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())?;

    let claims = state.tokens.decode(token, Utc::now()).map_err(|_| {
        errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "invalid token")
    })?;

    req.extensions_mut()
        .insert(CurrentUser::new(claims.identity));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, Response> {
    let unauthenticated =
        || errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "no token provided");

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(unauthenticated)?;

    let header = header.to_str().map_err(|_| unauthenticated())?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(unauthenticated)?
        .trim();

    if token.is_empty() {
        return Err(unauthenticated());
    }

    Ok(token)
}
