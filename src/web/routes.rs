use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::auth::require_session;
use crate::state::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth", post(handlers::auth))
        .route("/auth/login", post(handlers::login))
        .route("/auth/signup", post(handlers::signup));

    // Session-backed routes
    let user_routes = Router::new()
        .route("/auth/check", get(handlers::auth_check))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let api_routes = Router::new().merge(public_routes).merge(user_routes);

    let training_routes = Router::new()
        .route(handlers::POST_AUTH_PATH, get(handlers::list_trainings))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .nest("/api", api_routes)
        .merge(training_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::db::Database;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum_extra::extract::cookie::Key;
    use serde_json::Value;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    async fn app() -> (TempDir, Arc<AppState>, Router) {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).await.unwrap();
        let config = ConfigStore::new(&db).await.unwrap();
        let state = AppState::new(db, &config, Key::generate()).unwrap();
        state.trainings.seed_defaults().await.unwrap();
        let router = create_router(state.clone());
        (dir, state, router)
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// `name=value` part of the single Set-Cookie header
    fn session_cookie(response: &Response) -> String {
        let cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);
        let raw = cookies[0].to_str().unwrap();
        assert!(raw.starts_with("passgate_session="));
        assert!(raw.contains("HttpOnly"));
        raw.split(';').next().unwrap().to_string()
    }

    async fn session_count(state: &AppState) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(state.db.pool())
            .await
            .unwrap();
        n
    }

    #[tokio::test]
    async fn test_signup_redirects_with_cookie() {
        let (_dir, _state, router) = app().await;

        let response = router
            .clone()
            .oneshot(form(
                "/api/auth?mode=signup",
                "email=ada%40example.com&password=long+enough",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/training");
        let cookie = session_cookie(&response);

        let response = router
            .clone()
            .oneshot(get_with_cookie("/training", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 7);

        let response = router
            .oneshot(get_with_cookie("/api/auth/check", Some(&cookie)))
            .await
            .unwrap();
        let body = json(response).await;
        assert_eq!(body["user"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_signup_validation_errors() {
        let (_dir, state, router) = app().await;

        let response = router
            .oneshot(form("/api/auth/signup", "email=nope&password=short"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["errors"]["email"].is_string());
        assert!(body["errors"]["password"].is_string());
        assert_eq!(session_count(&state).await, 0);
    }

    #[tokio::test]
    async fn test_login_creates_one_session() {
        let (_dir, state, router) = app().await;
        let creds = "email=ada%40example.com&password=long+enough";

        router
            .clone()
            .oneshot(form("/api/auth/signup", creds))
            .await
            .unwrap();
        let before = session_count(&state).await;

        let response = router
            .oneshot(form("/api/auth?mode=login", creds))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response);
        assert_eq!(session_count(&state).await, before + 1);
    }

    #[tokio::test]
    async fn test_login_failures_look_the_same() {
        let (_dir, _state, router) = app().await;

        router
            .clone()
            .oneshot(form(
                "/api/auth/signup",
                "email=ada%40example.com&password=long+enough",
            ))
            .await
            .unwrap();

        let unknown = router
            .clone()
            .oneshot(form(
                "/api/auth/login",
                "email=bob%40example.com&password=long+enough",
            ))
            .await
            .unwrap();
        let wrong = router
            .oneshot(form(
                "/api/auth/login",
                "email=ada%40example.com&password=not+the+one",
            ))
            .await
            .unwrap();

        assert_eq!(unknown.status(), wrong.status());
        assert_eq!(json(unknown).await, json(wrong).await);
    }

    #[tokio::test]
    async fn test_protected_routes_need_session() {
        let (_dir, _state, router) = app().await;

        let response = router
            .clone()
            .oneshot(get_with_cookie("/training", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not authenticated");

        let response = router
            .clone()
            .oneshot(get_with_cookie("/training", Some("passgate_session=forged")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(get_with_cookie("/api/auth/check", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, _state, router) = app().await;

        let response = router
            .oneshot(get_with_cookie("/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["status"], "ok");
    }
}
