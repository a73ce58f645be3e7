use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{cookie, AuthMode, AuthOutcome, Credentials, FieldErrors, User};
use crate::error::Result;
use crate::state::AppState;
use crate::training::Training;

/// Where the browser lands after a successful signup or login
pub const POST_AUTH_PATH: &str = "/training";

// ============================================================================
// Health
// ============================================================================

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Authentication
// ============================================================================

#[derive(Deserialize)]
pub struct AuthQuery {
    #[serde(default)]
    pub mode: AuthMode,
}

/// Field errors returned to the form
#[derive(Serialize)]
pub struct AuthErrorResponse {
    pub success: bool,
    pub errors: FieldErrors,
}

/// `POST /auth?mode=login|signup`
pub async fn auth(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
    Form(form): Form<Credentials>,
) -> Result<Response> {
    submit(&state, query.mode, &headers, &form).await
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<Credentials>,
) -> Result<Response> {
    submit(&state, AuthMode::Login, &headers, &form).await
}

/// `POST /auth/signup`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<Credentials>,
) -> Result<Response> {
    submit(&state, AuthMode::Signup, &headers, &form).await
}

async fn submit(
    state: &AppState,
    mode: AuthMode,
    headers: &HeaderMap,
    form: &Credentials,
) -> Result<Response> {
    match state.auth.dispatch(mode, form).await? {
        AuthOutcome::Authenticated(session) => {
            let jar = SignedCookieJar::from_headers(headers, state.cookie_key.clone());
            let jar = cookie::issue(jar, &session, state.sessions.ttl().num_seconds());
            Ok((jar, Redirect::to(POST_AUTH_PATH)).into_response())
        }
        AuthOutcome::Rejected(errors) => Ok(Json(AuthErrorResponse {
            success: false,
            errors,
        })
        .into_response()),
    }
}

#[derive(Serialize)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    pub user: String,
}

pub async fn auth_check(Extension(user): Extension<User>) -> Json<AuthCheckResponse> {
    Json(AuthCheckResponse {
        authenticated: true,
        user: user.email,
    })
}

// ============================================================================
// Trainings
// ============================================================================

pub async fn list_trainings(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Training>>> {
    Ok(Json(state.trainings.list().await?))
}
