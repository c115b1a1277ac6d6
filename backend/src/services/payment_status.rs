use crate::auth::AdminCredential;
use crate::error::{AppError, AppResult, ValidationErrors};
use crate::models::{check_discount, Registration, RegistrationStatus, StatusChange};
use crate::repositories::RegistrationStore;
use crate::services::AuditTrailService;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Keeps an explicit `null` apart from an absent field
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Admin edit as received at the boundary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub discount: Option<Value>,
}

impl StatusUpdateRequest {
    /// Convert into a change touching only the supplied fields
    pub fn into_change(self) -> AppResult<StatusChange> {
        let mut errors = ValidationErrors::new();
        let mut change = StatusChange::default();

        if let Some(status) = self.status {
            match parse_status(&status) {
                Ok(status) => change.status = Some(status),
                Err(e) => errors.push("status", e),
            }
        }
        if let Some(discount) = self.discount {
            match parse_discount(&discount) {
                Ok(discount) => change.discount = Some(discount),
                Err(e) => errors.push("discount", e),
            }
        }

        errors.into_result()?;
        Ok(change)
    }
}

/// A supplied status must be one of the four names; `null` is not a status
fn parse_status(value: &Value) -> Result<RegistrationStatus, String> {
    match value {
        Value::String(s) => RegistrationStatus::from_str(s.trim()),
        Value::Null => Err("Status must not be null".to_string()),
        other => Err(format!("Invalid status: {}", other)),
    }
}

/// `null` or a blank string clears the discount; numbers and numeric strings
/// must pass [`check_discount`].
pub fn parse_discount(value: &Value) -> Result<Option<Decimal>, String> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };

    let discount = parsed.ok_or_else(|| "Discount must be a number".to_string())?;
    check_discount(discount)?;
    Ok(Some(discount))
}

/// Status and discount mutations.
///
/// Any status may follow any other. Concurrent edits to the same field are
/// last-writer-wins; edits to different fields never overwrite each other
/// because only supplied fields are written.
pub struct PaymentStatusMachine {
    store: Arc<dyn RegistrationStore>,
    audit: Arc<AuditTrailService>,
}

impl PaymentStatusMachine {
    pub fn new(store: Arc<dyn RegistrationStore>, audit: Arc<AuditTrailService>) -> Self {
        Self { store, audit }
    }

    /// Apply `change` in one write and return the full updated record
    pub async fn update_status(
        &self,
        credential: &AdminCredential,
        id: Uuid,
        change: StatusChange,
    ) -> AppResult<Registration> {
        let now = chrono::Utc::now().naive_utc();
        credential.ensure_active(now)?;

        if change.is_empty() {
            return Err(AppError::invalid(
                "status",
                "Provide a status, a discount or both",
            ));
        }
        if let Some(Some(discount)) = change.discount {
            check_discount(discount).map_err(|e| AppError::invalid("discount", e))?;
        }

        let registration = self
            .store
            .apply_change(id, &change, now)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        info!(
            "Registration #{} updated: status={} discount={:?}",
            registration.registration_number, registration.status, registration.discount
        );
        self.audit
            .log_status_updated(&registration, credential.session_id())
            .await;

        Ok(registration)
    }

    /// Parse a boundary request and apply it
    pub async fn update_from_request(
        &self,
        credential: &AdminCredential,
        id: Uuid,
        request: StatusUpdateRequest,
    ) -> AppResult<Registration> {
        let change = request.into_change()?;
        self.update_status(credential, id, change).await
    }
}
