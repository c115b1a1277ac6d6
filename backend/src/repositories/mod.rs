//! Storage seams for registrations, admin sessions and event settings.
//!
//! Each trait has a Postgres implementation used by the service and an
//! in-memory one for tests and local runs. Every mutating method is a single
//! atomic write: a failed call leaves nothing behind.

pub mod memory;
pub mod registration_repository;
pub mod session_repository;
pub mod settings_repository;

// Re-export all repositories for convenient access
pub use memory::{InMemoryRegistrationStore, InMemorySessionStore, InMemorySettingsStore};
pub use registration_repository::RegistrationRepository;
pub use session_repository::SessionRepository;
pub use settings_repository::SettingsRepository;

use crate::error::RepositoryError;
use crate::models::{
    AdminSession, EventSettings, NewRegistration, Registration, RegistrationFilter,
    RegistrationStats, SettingsUpdate, StatusChange,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Persist `new` under the next value of the store-owned registration
    /// number sequence. Number allocation and the row write commit together.
    async fn insert(&self, new: NewRegistration) -> Result<Registration, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Registration>, RepositoryError>;

    async fn find_by_number(
        &self,
        registration_number: i64,
    ) -> Result<Option<Registration>, RepositoryError>;

    async fn find_by_slip_id(&self, slip_id: &str)
        -> Result<Option<Registration>, RepositoryError>;

    /// Matching registrations, newest first
    async fn list(&self, filter: &RegistrationFilter)
        -> Result<Vec<Registration>, RepositoryError>;

    /// Write only the fields present in `change` plus `updated_at`, in one
    /// statement. `None` when no such registration exists.
    async fn apply_change(
        &self,
        id: Uuid,
        change: &StatusChange,
        now: NaiveDateTime,
    ) -> Result<Option<Registration>, RepositoryError>;

    /// Hard delete; `false` when nothing matched
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;

    async fn count_by_status(&self) -> Result<RegistrationStats, RepositoryError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &AdminSession) -> Result<(), RepositoryError>;

    /// The session for `token` if it has not expired at `now`
    async fn find_active(
        &self,
        token: &str,
        now: NaiveDateTime,
    ) -> Result<Option<AdminSession>, RepositoryError>;

    async fn delete(&self, token: &str) -> Result<bool, RepositoryError>;

    /// Drop sessions expired at `now`, returning how many went
    async fn purge_expired(&self, now: NaiveDateTime) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current settings, created with defaults on first read
    async fn load(&self) -> Result<EventSettings, RepositoryError>;

    async fn save(
        &self,
        update: &SettingsUpdate,
        now: NaiveDateTime,
    ) -> Result<EventSettings, RepositoryError>;
}
