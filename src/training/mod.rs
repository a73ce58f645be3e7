//! Training catalog shown to signed-in users

use serde::Serialize;
use sqlx::{Pool, Sqlite};

use crate::db::Database;
use crate::error::Result;

/// Catalog seeded into an empty database: (title, image, description)
const DEFAULT_TRAININGS: &[(&str, &str, &str)] = &[
    ("Yoga", "/training/yoga.jpg", "A gentle way to improve flexibility and balance."),
    ("Boxing", "/training/boxing.jpg", "A high-energy workout that improves strength and speed."),
    ("Running", "/training/running.jpg", "A great way to improve cardiovascular health and endurance."),
    ("Weightlifting", "/training/weightlifting.jpg", "A strength-building workout that helps tone muscles."),
    ("Cycling", "/training/cycling.jpg", "A low-impact workout that improves cardiovascular health and endurance."),
    ("Gaming", "/training/gaming.jpg", "A fun way to improve hand-eye coordination and reflexes."),
    ("Sailing", "/training/sailing.jpg", "A relaxing way to enjoy the outdoors and improve balance."),
];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Training {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub description: String,
}

#[derive(Clone)]
pub struct TrainingStore {
    pool: Pool<Sqlite>,
}

impl TrainingStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Insert the default catalog if the table is empty. Returns rows inserted.
    pub async fn seed_defaults(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trainings")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for (title, image, description) in DEFAULT_TRAININGS {
            sqlx::query("INSERT INTO trainings (title, image, description) VALUES (?1, ?2, ?3)")
                .bind(title)
                .bind(image)
                .bind(description)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(DEFAULT_TRAININGS.len() as u64)
    }

    pub async fn list(&self) -> Result<Vec<Training>> {
        let rows = sqlx::query_as::<_, Training>(
            "SELECT id, title, image, description FROM trainings ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
