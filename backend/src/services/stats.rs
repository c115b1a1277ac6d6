use crate::auth::AdminCredential;
use crate::error::AppResult;
use crate::models::RegistrationStats;
use crate::repositories::RegistrationStore;
use std::sync::Arc;

/// Status counts for the dashboard. Always read from the store, never cached.
pub struct StatsAggregator {
    store: Arc<dyn RegistrationStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    pub async fn stats(&self, credential: &AdminCredential) -> AppResult<RegistrationStats> {
        credential.ensure_active(chrono::Utc::now().naive_utc())?;
        Ok(self.store.count_by_status().await?)
    }
}
