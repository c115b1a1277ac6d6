use crate::auth::AdminCredential;
use crate::error::{AppError, AppResult};
use crate::models::{check_discount, Registration, RegistrationStatus, StatusChange};
use crate::repositories::RegistrationStore;
use crate::services::AuditTrailService;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// What a desk scan or confirmation screen resolves a registration by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Number(i64),
    Slip(String),
}

impl LookupKey {
    /// Build from the `regNum` / `slipId` query pair; the number wins when both are given
    pub fn from_query(reg_num: Option<&str>, slip_id: Option<&str>) -> AppResult<Self> {
        let reg_num = reg_num.map(str::trim).filter(|s| !s.is_empty());
        let slip_id = slip_id.map(str::trim).filter(|s| !s.is_empty());

        match (reg_num, slip_id) {
            (Some(number), _) => number
                .parse::<i64>()
                .map(LookupKey::Number)
                .map_err(|_| AppError::invalid("regNum", "Registration number must be an integer")),
            (None, Some(slip)) => Ok(LookupKey::Slip(slip.to_string())),
            (None, None) => Err(AppError::invalid(
                "regNum",
                "Provide a registration number or a slip id",
            )),
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Number(n) => write!(f, "registration #{}", n),
            LookupKey::Slip(s) => write!(f, "slip {}", s),
        }
    }
}

/// Desk-side lookup and cash approval
pub struct VerificationGateway {
    store: Arc<dyn RegistrationStore>,
    audit: Arc<AuditTrailService>,
}

impl VerificationGateway {
    pub fn new(store: Arc<dyn RegistrationStore>, audit: Arc<AuditTrailService>) -> Self {
        Self { store, audit }
    }

    pub async fn lookup(
        &self,
        credential: &AdminCredential,
        key: &LookupKey,
    ) -> AppResult<Registration> {
        credential.ensure_active(chrono::Utc::now().naive_utc())?;

        let found = match key {
            LookupKey::Number(number) => self.store.find_by_number(*number).await?,
            LookupKey::Slip(slip) => self.store.find_by_slip_id(slip).await?,
        };

        found.ok_or_else(|| {
            warn!("Lookup miss for {}", key);
            AppError::NotFound(format!("No registration for {}", key))
        })
    }

    /// Mark a cash registration paid and set its discount in a single write.
    ///
    /// The record is expected to be `pending_cash`, but any status is accepted.
    pub async fn approve_cash(
        &self,
        credential: &AdminCredential,
        id: Uuid,
        discount: Decimal,
    ) -> AppResult<Registration> {
        let now = chrono::Utc::now().naive_utc();
        credential.ensure_active(now)?;

        check_discount(discount).map_err(|e| AppError::invalid("discount", e))?;

        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;
        if current.status != RegistrationStatus::PendingCash {
            warn!(
                "Approving cash for registration #{} in status {}",
                current.registration_number, current.status
            );
        }

        let change = StatusChange::status(RegistrationStatus::Paid).with_discount(discount);
        let registration = self
            .store
            .apply_change(id, &change, now)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        info!(
            "Cash approved for registration #{}: final amount {}",
            registration.registration_number,
            registration.final_amount()
        );
        self.audit
            .log_cash_approved(&registration, credential.session_id())
            .await;

        Ok(registration)
    }
}
