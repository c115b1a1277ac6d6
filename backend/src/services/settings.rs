use crate::auth::AdminCredential;
use crate::error::{AppError, AppResult};
use crate::models::{EventSettings, SettingsUpdate};
use crate::repositories::SettingsStore;
use crate::services::AuditTrailService;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{info, warn};

/// Registration window and announcement
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
    audit: Arc<AuditTrailService>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>, audit: Arc<AuditTrailService>) -> Self {
        Self { store, audit }
    }

    pub async fn get(&self) -> AppResult<EventSettings> {
        Ok(self.store.load().await?)
    }

    pub async fn update(
        &self,
        credential: &AdminCredential,
        update: SettingsUpdate,
    ) -> AppResult<EventSettings> {
        let now = chrono::Utc::now().naive_utc();
        credential.ensure_active(now)?;

        if let (Some(open), Some(close)) = (update.open_date, update.close_date) {
            if close < open {
                return Err(AppError::invalid(
                    "closeDate",
                    "Close date must not be before the open date",
                ));
            }
        }

        let update = SettingsUpdate {
            announcement: update
                .announcement
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            ..update
        };

        let settings = self.store.save(&update, now).await?;
        info!(
            "Event settings updated: open={} window={:?}..{:?}",
            settings.is_open, settings.open_date, settings.close_date
        );
        self.audit
            .log_settings_updated(&settings, credential.session_id())
            .await;

        Ok(settings)
    }

    /// Fails with a `registration` field error while submissions are closed
    pub async fn ensure_open(&self, now: NaiveDateTime) -> AppResult<()> {
        let settings = self.store.load().await?;
        match settings.closed_reason(now) {
            Some(reason) => {
                warn!("Submission refused: {}", reason);
                Err(AppError::invalid("registration", reason))
            }
            None => Ok(()),
        }
    }
}
