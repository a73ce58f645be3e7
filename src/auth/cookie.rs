//! Signed session cookie

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

use super::Session;
use crate::config::ConfigStore;
use crate::error::{AppError, Result};

/// Session cookie name
pub const SESSION_COOKIE: &str = "passgate_session";

/// Signing key length in bytes (minimum accepted by `Key::try_from`)
const COOKIE_KEY_LEN: usize = 64;

/// Load the cookie signing key, generating and persisting one on first start
pub async fn signing_key(config: &ConfigStore) -> Result<Key> {
    let secret = match config.get().auth.cookie_secret.clone() {
        Some(secret) => secret,
        None => {
            let mut bytes = [0u8; COOKIE_KEY_LEN];
            rand::rngs::OsRng.fill_bytes(&mut bytes);
            let secret = STANDARD.encode(bytes);
            config
                .update(|c| c.auth.cookie_secret = Some(secret.clone()))
                .await?;
            tracing::info!("Generated new cookie signing key");
            secret
        }
    };

    let bytes = STANDARD
        .decode(secret.trim())
        .map_err(|e| AppError::Config(format!("Invalid cookie secret: {}", e)))?;
    Key::try_from(bytes.as_slice())
        .map_err(|e| AppError::Config(format!("Invalid cookie secret: {}", e)))
}

/// Add the signed session cookie for `session` to `jar`
pub fn issue(jar: SignedCookieJar, session: &Session, max_age_secs: i64) -> SignedCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, session.id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build();

    jar.add(cookie)
}

/// Session id carried by a correctly signed cookie, if any
pub fn session_id(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}
