use arc_swap::ArcSwap;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;

use super::AppConfig;
use crate::db::Database;
use crate::error::{AppError, Result};

/// Configuration store backed by SQLite
///
/// Uses `ArcSwap` for lock-free reads; writes go to the database first
/// and then replace the cached snapshot.
#[derive(Clone)]
pub struct ConfigStore {
    pool: Pool<Sqlite>,
    /// Lock-free cache using ArcSwap for zero-cost reads
    cache: Arc<ArcSwap<AppConfig>>,
}

impl ConfigStore {
    /// Load the configuration from `db`, creating the default row if absent
    pub async fn new(db: &Database) -> Result<Self> {
        let pool = db.pool().clone();
        let config = Self::load_config(&pool).await?;

        Ok(Self {
            pool,
            cache: Arc::new(ArcSwap::from_pointee(config)),
        })
    }

    /// Load configuration from database
    async fn load_config(pool: &Pool<Sqlite>) -> Result<AppConfig> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM config WHERE key = 'app_config'")
                .fetch_optional(pool)
                .await?;

        match row {
            Some((json,)) => {
                serde_json::from_str(&json).map_err(|e| AppError::Config(e.to_string()))
            }
            None => {
                let config = AppConfig::default();
                Self::save_config_to_db(pool, &config).await?;
                Ok(config)
            }
        }
    }

    /// Save configuration to database
    async fn save_config_to_db(pool: &Pool<Sqlite>, config: &AppConfig) -> Result<()> {
        let json = serde_json::to_string(config)?;

        sqlx::query(
            r#"
            INSERT INTO config (key, value, updated_at)
            VALUES ('app_config', ?1, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = ?1, updated_at = datetime('now')
            "#,
        )
        .bind(&json)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get current configuration (lock-free)
    pub fn get(&self) -> Arc<AppConfig> {
        self.cache.load_full()
    }

    /// Update configuration with a closure
    ///
    /// Read-modify-write; concurrent updates are last-write-wins.
    pub async fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let current = self.cache.load();
        let mut config = (**current).clone();
        f(&mut config);

        Self::save_config_to_db(&self.pool, &config).await?;
        self.cache.store(Arc::new(config));

        Ok(())
    }
}
