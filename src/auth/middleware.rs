use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::SignedCookieJar;
use std::sync::Arc;

use super::cookie;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Extract session ID from the signed cookie or a Bearer token
pub fn extract_session_id(jar: &SignedCookieJar, headers: &HeaderMap) -> Option<String> {
    // First try cookie
    if let Some(id) = cookie::session_id(jar) {
        return Some(id);
    }

    // Then try Authorization header (Bearer token)
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Require a live session; stores the `Session` and its `User` in request extensions
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let jar = SignedCookieJar::from_headers(request.headers(), state.cookie_key.clone());
    let session_id = extract_session_id(&jar, request.headers()).ok_or(AppError::Unauthorized)?;

    let session = state
        .sessions
        .get(&session_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let user = state
        .users
        .get(session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    tracing::trace!(user_id = user.id, "Session verified");
    request.extensions_mut().insert(session);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
