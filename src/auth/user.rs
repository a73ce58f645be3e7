use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Pool, Sqlite};

use crate::db::Database;
use crate::error::{AppError, Result};

/// User row type from database
type UserRow = (i64, String, String, String);

/// Registered user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Convert from database row to User
    fn from_row(row: UserRow) -> Self {
        let (id, email, password_hash, created_at) = row;
        Self {
            id,
            email,
            password_hash,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }
    }
}

/// Credential store backed by SQLite
#[derive(Clone)]
pub struct UserStore {
    pool: Pool<Sqlite>,
}

impl UserStore {
    /// Create a new user store
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Insert a user with an already hashed password
    ///
    /// The `UNIQUE` constraint on `email` is the only duplicate check; a
    /// violation comes back as [`AppError::CredentialConflict`].
    pub async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::CredentialConflict
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    /// Get user by ID
    pub async fn get(&self, user_id: i64) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from_row))
    }

    /// Get user by email
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from_row))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    async fn store() -> (TempDir, UserStore) {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).await.unwrap();
        (dir, UserStore::new(&db))
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let (_dir, users) = store().await;

        let user = users.create("ada@example.com", "hash").await.unwrap();
        assert!(user.id > 0);

        let by_email = users.get_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.password_hash, "hash");

        let by_id = users.get(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");

        assert!(users.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let (_dir, users) = store().await;

        users.create("ada@example.com", "hash").await.unwrap();
        let err = users.create("ada@example.com", "other").await.unwrap_err();
        assert!(matches!(err, AppError::CredentialConflict));
    }

    #[tokio::test]
    async fn test_password_hash_not_serialized() {
        let (_dir, users) = store().await;

        let user = users.create("ada@example.com", "secret-hash").await.unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_is_unique_violation_ignores_other_errors() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
