use super::SessionStore;
use crate::error::RepositoryError;
use crate::models::AdminSession;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

/// Repository for admin session data access
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new SessionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn insert(&self, session: &AdminSession) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO admin_sessions (id, session_token, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session.id)
        .bind(&session.session_token)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_active(
        &self,
        token: &str,
        now: NaiveDateTime,
    ) -> Result<Option<AdminSession>, RepositoryError> {
        let session = sqlx::query_as::<_, AdminSession>(
            r#"
            SELECT id, session_token, expires_at, created_at
            FROM admin_sessions
            WHERE session_token = $1 AND expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn delete(&self, token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE session_token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, now: NaiveDateTime) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
