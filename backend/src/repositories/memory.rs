//! In-process stores with the same contracts as the Postgres repositories.
//!
//! Used by the test suite and for running the service without a database.
//! A store can be switched offline to exercise storage failure paths.

use super::{RegistrationStore, SessionStore, SettingsStore};
use crate::error::RepositoryError;
use crate::models::{
    AdminSession, EventSettings, NewRegistration, Registration, RegistrationFilter,
    RegistrationStats, SettingsUpdate, StatusChange,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug)]
struct Availability(AtomicBool);

impl Default for Availability {
    fn default() -> Self {
        Self(AtomicBool::new(true))
    }
}

impl Availability {
    fn set(&self, available: bool) {
        self.0.store(available, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.0.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::Unavailable("store is offline".to_string()))
        }
    }
}

/// Registrations keyed by id, numbered from an atomic counter
#[derive(Debug, Default)]
pub struct InMemoryRegistrationStore {
    records: RwLock<HashMap<Uuid, Registration>>,
    sequence: AtomicI64,
    availability: Availability,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backing store going away (`false`) or coming back
    pub fn set_available(&self, available: bool) {
        self.availability.set(available);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn insert(&self, new: NewRegistration) -> Result<Registration, RepositoryError> {
        self.availability.check()?;
        let mut records = self.records.write().await;

        if records.contains_key(&new.id) {
            return Err(RepositoryError::Duplicate(format!("id {}", new.id)));
        }
        if records.values().any(|r| r.slip_id == new.slip_id) {
            return Err(RepositoryError::Duplicate(format!("slip_id {}", new.slip_id)));
        }

        let number = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let registration = new.into_registration(number);
        records.insert(registration.id, registration.clone());

        Ok(registration)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Registration>, RepositoryError> {
        self.availability.check()?;
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_number(
        &self,
        registration_number: i64,
    ) -> Result<Option<Registration>, RepositoryError> {
        self.availability.check()?;
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.registration_number == registration_number)
            .cloned())
    }

    async fn find_by_slip_id(
        &self,
        slip_id: &str,
    ) -> Result<Option<Registration>, RepositoryError> {
        self.availability.check()?;
        let records = self.records.read().await;
        Ok(records.values().find(|r| r.slip_id == slip_id).cloned())
    }

    async fn list(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<Registration>, RepositoryError> {
        self.availability.check()?;
        let records = self.records.read().await;
        let mut matching: Vec<Registration> =
            records.values().filter(|r| filter.matches(r)).cloned().collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.registration_number.cmp(&a.registration_number))
        });
        Ok(matching)
    }

    async fn apply_change(
        &self,
        id: Uuid,
        change: &StatusChange,
        now: NaiveDateTime,
    ) -> Result<Option<Registration>, RepositoryError> {
        self.availability.check()?;
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|registration| {
            change.apply_to(registration, now);
            registration.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.availability.check()?;
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn count_by_status(&self) -> Result<RegistrationStats, RepositoryError> {
        self.availability.check()?;
        let records = self.records.read().await;
        Ok(records.values().map(|r| r.status).collect())
    }
}

/// Admin sessions keyed by token
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, AdminSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: &AdminSession) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.session_token) {
            return Err(RepositoryError::Duplicate("session token".to_string()));
        }
        sessions.insert(session.session_token.clone(), session.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        token: &str,
        now: NaiveDateTime,
    ) -> Result<Option<AdminSession>, RepositoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(token)
            .filter(|s| !s.is_expired_at(now))
            .cloned())
    }

    async fn delete(&self, token: &str) -> Result<bool, RepositoryError> {
        Ok(self.sessions.write().await.remove(token).is_some())
    }

    async fn purge_expired(&self, now: NaiveDateTime) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }
}

/// Settings singleton, seeded with defaults on first read
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    settings: RwLock<Option<EventSettings>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<EventSettings, RepositoryError> {
        let mut settings = self.settings.write().await;
        Ok(settings.get_or_insert_with(EventSettings::default).clone())
    }

    async fn save(
        &self,
        update: &SettingsUpdate,
        now: NaiveDateTime,
    ) -> Result<EventSettings, RepositoryError> {
        let saved = EventSettings {
            is_open: update.is_open,
            open_date: update.open_date,
            close_date: update.close_date,
            announcement: update.announcement.clone(),
            updated_at: now,
        };
        *self.settings.write().await = Some(saved.clone());
        Ok(saved)
    }
}
