//! User profile lookups

use anyhow::Result;
use rides::ProfileSnapshot;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::ProfileStore;

/// Profile repository backed by PostgreSQL
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new profile repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProfileStore for ProfileRepository {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<ProfileSnapshot>> {
        let row = sqlx::query(
            r#"
            SELECT name, gender, age, phone, photo_url
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        // Blank columns fall back to the placeholder snapshot values
        let defaults = ProfileSnapshot::default();
        let text = |column: &str, fallback: String| -> Result<String> {
            let value: Option<String> = row.try_get(column)?;
            Ok(value.filter(|v| !v.trim().is_empty()).unwrap_or(fallback))
        };

        Ok(Some(ProfileSnapshot {
            name: text("name", defaults.name)?,
            gender: text("gender", defaults.gender)?,
            age: row.try_get("age")?,
            phone: text("phone", defaults.phone)?,
            photo_url: row.try_get("photo_url")?,
        }))
    }
}
