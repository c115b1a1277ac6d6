use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored admin login session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AdminSession {
    pub id: Uuid,
    pub session_token: String,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl AdminSession {
    pub fn new(session_token: String, expires_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_token,
            expires_at,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        self.expires_at <= now
    }
}
