use axum_extra::extract::cookie::Key;
use std::sync::Arc;

use crate::auth::{AuthService, SessionStore, UserStore};
use crate::config::ConfigStore;
use crate::db::Database;
use crate::error::Result;
use crate::training::TrainingStore;

/// Application-wide state shared across handlers
///
/// Every store holds a clone of the same pool; the `Database` handle is
/// kept here so shutdown can close it.
pub struct AppState {
    /// Database handle
    pub db: Database,
    /// Credential store
    pub users: UserStore,
    /// Session store
    pub sessions: SessionStore,
    /// Signup/login dispatcher
    pub auth: AuthService,
    /// Training catalog
    pub trainings: TrainingStore,
    /// Session cookie signing key
    pub cookie_key: Key,
}

impl AppState {
    /// Build the stores over `db`, taking session lifetime from `config`
    pub fn new(db: Database, config: &ConfigStore, cookie_key: Key) -> Result<Arc<Self>> {
        let users = UserStore::new(&db);
        let sessions = SessionStore::new(&db, config.get().auth.session_timeout_secs as i64);
        let auth = AuthService::new(users.clone(), sessions.clone())?;
        let trainings = TrainingStore::new(&db);

        Ok(Arc::new(Self {
            db,
            users,
            sessions,
            auth,
            trainings,
            cookie_key,
        }))
    }
}
