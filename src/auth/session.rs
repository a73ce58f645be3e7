use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use sqlx::{Pool, Sqlite};

use crate::db::Database;
use crate::error::Result;

/// Session id length in bytes before hex encoding (32 bytes = 64 hex chars)
const SESSION_ID_BYTES: usize = 32;

/// Session data
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Session store backed by SQLite
#[derive(Clone)]
pub struct SessionStore {
    pool: Pool<Sqlite>,
    default_ttl: Duration,
}

impl SessionStore {
    /// Create a new session store
    pub fn new(db: &Database, ttl_secs: i64) -> Self {
        Self {
            pool: db.pool().clone(),
            default_ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Session lifetime applied to new sessions
    pub fn ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Create a new session for `user_id`
    pub async fn create(&self, user_id: i64) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            id: generate_session_id(),
            user_id,
            created_at: now,
            expires_at: now + self.default_ttl,
        };

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.created_at.to_rfc3339())
        .bind(session.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(session)
    }

    /// Get a live session by ID
    ///
    /// Expired sessions are reported as absent; the row itself is left alone.
    pub async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let row: Option<(String, i64, String, String)> = sqlx::query_as(
            "SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = ?1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, user_id, created_at, expires_at)) = row else {
            return Ok(None);
        };

        let session = Session {
            id,
            user_id,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            // An unreadable expiry counts as already expired
            expires_at: DateTime::parse_from_rfc3339(&expires_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        };

        if session.is_expired() {
            Ok(None)
        } else {
            Ok(Some(session))
        }
    }
}

/// Generate a random session id (hex-encoded)
fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
