use crate::auth::AdminCredential;
use crate::error::{option_to_result, AppError, AppResult};
use crate::models::{Registration, RegistrationFilter};
use crate::repositories::RegistrationStore;
use crate::services::AuditTrailService;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Reads and hard deletes of registrations
pub struct RegistrationDirectory {
    store: Arc<dyn RegistrationStore>,
    audit: Arc<AuditTrailService>,
}

impl RegistrationDirectory {
    pub fn new(store: Arc<dyn RegistrationStore>, audit: Arc<AuditTrailService>) -> Self {
        Self { store, audit }
    }

    /// Single record by internal id, for the applicant's confirmation screen
    pub async fn get(&self, id: Uuid) -> AppResult<Registration> {
        option_to_result(self.store.find_by_id(id).await?, "Registration not found")
    }

    /// Newest first
    pub async fn list(
        &self,
        credential: &AdminCredential,
        filter: &RegistrationFilter,
    ) -> AppResult<Vec<Registration>> {
        credential.ensure_active(chrono::Utc::now().naive_utc())?;
        Ok(self.store.list(filter).await?)
    }

    /// Irreversible; nothing else references a registration
    pub async fn delete(&self, credential: &AdminCredential, id: Uuid) -> AppResult<()> {
        credential.ensure_active(chrono::Utc::now().naive_utc())?;

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Registration not found".to_string()));
        }

        info!("Registration {} deleted", id);
        self.audit
            .log_registration_deleted(id, credential.session_id())
            .await;
        Ok(())
    }
}
