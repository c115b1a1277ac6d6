use crate::error::{AppError, AppResult};
use crate::models::{EventSettings, Registration};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub timestamp: i64,
    pub event_type: String, // "registration_submitted", "status_updated", "cash_approved", etc.
    pub registration_id: Option<Uuid>,
    pub actor: Option<Uuid>,
    pub details: serde_json::Value,
}

/// Append-only JSON-lines trail of registration lifecycle events
pub struct AuditTrailService {
    log_file: Option<PathBuf>,
    file_handle: Option<Arc<Mutex<std::fs::File>>>,
}

impl AuditTrailService {
    /// Create a new audit trail service writing under `log_directory`
    pub fn new(log_directory: &Path) -> AppResult<Self> {
        std::fs::create_dir_all(log_directory)
            .map_err(|e| AppError::Message(format!("Failed to create log directory: {}", e)))?;

        let date = chrono::Utc::now().format("%Y-%m-%d");
        let log_file = log_directory.join(format!("audit_{}.log", date));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| AppError::Message(format!("Failed to open audit log file: {}", e)))?;

        info!("Audit trail initialized: {:?}", log_file);

        Ok(Self {
            log_file: Some(log_file),
            file_handle: Some(Arc::new(Mutex::new(file))),
        })
    }

    /// A trail that drops every entry
    pub fn disabled() -> Self {
        Self {
            log_file: None,
            file_handle: None,
        }
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Log an audit entry
    pub async fn log(&self, entry: AuditLogEntry) -> AppResult<()> {
        let Some(handle) = &self.file_handle else {
            return Ok(());
        };

        let json = serde_json::to_string(&entry)?;

        let mut file = handle.lock().await;
        writeln!(file, "{}", json)
            .map_err(|e| AppError::Message(format!("Failed to write audit log: {}", e)))?;

        file.flush()
            .map_err(|e| AppError::Message(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Entries are written after the store commit; failures are only logged
    async fn record(&self, entry: AuditLogEntry) {
        let event_type = entry.event_type.clone();
        if let Err(e) = self.log(entry).await {
            warn!("Dropped {} audit entry: {}", event_type, e);
        }
    }

    pub async fn log_registration_submitted(&self, registration: &Registration) {
        self.record(AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "registration_submitted".to_string(),
            registration_id: Some(registration.id),
            actor: None,
            details: serde_json::json!({
                "registration_number": registration.registration_number,
                "slip_id": registration.slip_id,
                "payment_method": registration.payment_method,
                "total_amount": registration.total_amount.to_string(),
            }),
        })
        .await
    }

    pub async fn log_status_updated(&self, registration: &Registration, actor: Uuid) {
        self.record(AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "status_updated".to_string(),
            registration_id: Some(registration.id),
            actor: Some(actor),
            details: serde_json::json!({
                "status": registration.status,
                "discount": registration.discount.map(|d| d.to_string()),
            }),
        })
        .await
    }

    pub async fn log_cash_approved(&self, registration: &Registration, actor: Uuid) {
        self.record(AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "cash_approved".to_string(),
            registration_id: Some(registration.id),
            actor: Some(actor),
            details: serde_json::json!({
                "registration_number": registration.registration_number,
                "discount": registration.discount.map(|d| d.to_string()),
                "final_amount": registration.final_amount().to_string(),
            }),
        })
        .await
    }

    pub async fn log_registration_deleted(&self, registration_id: Uuid, actor: Uuid) {
        self.record(AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "registration_deleted".to_string(),
            registration_id: Some(registration_id),
            actor: Some(actor),
            details: serde_json::Value::Null,
        })
        .await
    }

    pub async fn log_settings_updated(&self, settings: &EventSettings, actor: Uuid) {
        self.record(AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "settings_updated".to_string(),
            registration_id: None,
            actor: Some(actor),
            details: serde_json::json!({
                "is_open": settings.is_open,
                "open_date": settings.open_date,
                "close_date": settings.close_date,
            }),
        })
        .await
    }
}
