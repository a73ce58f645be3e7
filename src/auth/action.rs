//! Form-driven signup and login
//!
//! A submitted form plus a mode flag goes in; either a fresh session or a
//! set of field errors comes out. User-facing errors are deliberately vague:
//! neither path reveals whether an email is registered.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::password::{hash_password, verify_password};
use super::{Session, SessionStore, UserStore};
use crate::error::{AppError, Result};

/// Minimum password length after trimming
pub const MIN_PASSWORD_LEN: usize = 8;

const INVALID_EMAIL: &str = "Please enter a valid email";
const PASSWORD_TOO_SHORT: &str = "password needs to be at least 8 characters";
const CONFLICT_MESSAGE: &str = "invalid login details";
const AUTH_FAILED_MESSAGE: &str = "could not authenticate user, please check your credentials";

/// Verified against when the email is unknown, so both login failures cost one Argon2 run
const DUMMY_PASSWORD: &str = "passgate-unknown-account";

/// Which action a submitted form asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    Login,
    #[default]
    Signup,
}

impl AuthMode {
    /// Anything other than `login` is a signup
    pub fn parse(value: &str) -> Self {
        if value == "login" {
            AuthMode::Login
        } else {
            AuthMode::Signup
        }
    }
}

impl<'de> Deserialize<'de> for AuthMode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(AuthMode::parse(&value))
    }
}

/// Submitted form fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Errors keyed by form field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn single(field: &'static str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }
}

/// Result of a dispatched auth form
#[derive(Debug)]
pub enum AuthOutcome {
    /// A session was created; the caller issues the cookie and redirects
    Authenticated(Session),
    /// Nothing was persisted; show these errors next to the form
    Rejected(FieldErrors),
}

/// Check signup input. Every rule runs so all violations are reported at once.
pub fn validate_signup(credentials: &Credentials) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if !credentials.email.contains('@') {
        errors.insert("email", INVALID_EMAIL);
    }
    if credentials.password.trim().chars().count() < MIN_PASSWORD_LEN {
        errors.insert("password", PASSWORD_TOO_SHORT);
    }

    errors
}

/// Signup and login over the credential and session stores
#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    sessions: SessionStore,
    /// Stand-in digest verified when no user matches the submitted email
    dummy_hash: Arc<str>,
}

impl AuthService {
    pub fn new(users: UserStore, sessions: SessionStore) -> Result<Self> {
        let dummy_hash = hash_password(DUMMY_PASSWORD)?;
        Ok(Self::with_dummy_hash(users, sessions, dummy_hash))
    }

    fn with_dummy_hash(users: UserStore, sessions: SessionStore, dummy_hash: String) -> Self {
        Self {
            users,
            sessions,
            dummy_hash: dummy_hash.into(),
        }
    }

    /// Route a submitted form to signup or login
    pub async fn dispatch(&self, mode: AuthMode, credentials: &Credentials) -> Result<AuthOutcome> {
        match mode {
            AuthMode::Login => self.login(credentials).await,
            AuthMode::Signup => self.signup(credentials).await,
        }
    }

    /// Register a new user and start a session
    ///
    /// A duplicate email is reported with the same vague message as any
    /// other bad signup; store faults other than that propagate.
    pub async fn signup(&self, credentials: &Credentials) -> Result<AuthOutcome> {
        let errors = validate_signup(credentials);
        if !errors.is_empty() {
            tracing::debug!(fields = errors.len(), "Signup rejected by validation");
            return Ok(AuthOutcome::Rejected(errors));
        }

        let password_hash = hash_blocking(credentials.password.clone()).await?;
        let user = match self.users.create(&credentials.email, &password_hash).await {
            Ok(user) => user,
            Err(AppError::CredentialConflict) => {
                tracing::info!("Signup rejected: credential conflict");
                return Ok(AuthOutcome::Rejected(FieldErrors::single(
                    "email",
                    CONFLICT_MESSAGE,
                )));
            }
            Err(e) => return Err(e),
        };

        let session = self.sessions.create(user.id).await?;
        tracing::info!(user_id = user.id, "User signed up");
        Ok(AuthOutcome::Authenticated(session))
    }

    /// Verify credentials and start a session
    ///
    /// Unknown email and wrong password produce identical errors.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthOutcome> {
        match self.authenticate(credentials).await {
            Ok(user_id) => {
                let session = self.sessions.create(user_id).await?;
                tracing::info!(user_id, "User logged in");
                Ok(AuthOutcome::Authenticated(session))
            }
            Err(AppError::AuthenticationFailed) => {
                tracing::info!("Login rejected: bad credentials");
                Ok(AuthOutcome::Rejected(FieldErrors::single(
                    "email",
                    AUTH_FAILED_MESSAGE,
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Unknown emails are verified against the dummy digest so both
    /// failure paths do the same Argon2 work.
    async fn authenticate(&self, credentials: &Credentials) -> Result<i64> {
        let user = self.users.get_by_email(&credentials.email).await?;
        let digest = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };

        let valid = verify_blocking(credentials.password.clone(), digest).await?;
        match user {
            Some(user) if valid => Ok(user.id),
            _ => Err(AppError::AuthenticationFailed),
        }
    }
}

/// Argon2 hashing off the async workers
async fn hash_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
}

async fn verify_blocking(password: String, digest: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &digest))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
}
