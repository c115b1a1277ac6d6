use super::SettingsStore;
use crate::error::RepositoryError;
use crate::models::event_settings::DEFAULT_ANNOUNCEMENT;
use crate::models::{EventSettings, SettingsUpdate};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

/// Repository for the singleton event settings row
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    /// Create a new SettingsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn load(&self) -> Result<EventSettings, RepositoryError> {
        // Seed the row on first read; concurrent seeders collapse on the key
        sqlx::query(
            r#"
            INSERT INTO event_settings (id, is_open, announcement, updated_at)
            VALUES (1, TRUE, $1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(DEFAULT_ANNOUNCEMENT)
        .bind(chrono::Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        let settings = sqlx::query_as::<_, EventSettings>(
            r#"
            SELECT is_open, open_date, close_date, announcement, updated_at
            FROM event_settings
            WHERE id = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }

    async fn save(
        &self,
        update: &SettingsUpdate,
        now: NaiveDateTime,
    ) -> Result<EventSettings, RepositoryError> {
        let settings = sqlx::query_as::<_, EventSettings>(
            r#"
            INSERT INTO event_settings (id, is_open, open_date, close_date, announcement, updated_at)
            VALUES (1, $1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET is_open = EXCLUDED.is_open,
                open_date = EXCLUDED.open_date,
                close_date = EXCLUDED.close_date,
                announcement = EXCLUDED.announcement,
                updated_at = EXCLUDED.updated_at
            RETURNING is_open, open_date, close_date, announcement, updated_at
            "#,
        )
        .bind(update.is_open)
        .bind(update.open_date)
        .bind(update.close_date)
        .bind(&update.announcement)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }
}
