use crate::catalog::{PricingCatalog, TeamCompositionValidator};
use crate::error::{AppError, AppResult, ValidationErrors};
use crate::models::{
    is_well_formed_contact, limits, Gender, NewRegistration, PaymentMethod, Registration,
    RegistrationStatus, SelectedGames, TeamRoster,
};
use crate::repositories::RegistrationStore;
use crate::services::{AuditTrailService, SettingsService};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Applicant form as received at the boundary.
///
/// Enumerated fields stay raw strings here so that every problem can be
/// reported together; a client-computed total is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRegistration {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub alternative_contact_number: Option<String>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub selected_games: SelectedGames,
    #[serde(default)]
    pub team_members: TeamRoster,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Reference to the uploaded payment screenshot
    #[serde(default, alias = "screenshotUrl")]
    pub payment_proof: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

/// Generate a slip id such as `WLG25-CASH-3F9A0C71BE`
pub fn generate_slip_id(prefix: &str, method: PaymentMethod) -> String {
    let tag = match method {
        PaymentMethod::Cash => "CASH",
        PaymentMethod::Online => "ONL",
    };
    let entropy = Uuid::new_v4();
    format!("{}-{}-{}", prefix, tag, hex::encode_upper(&entropy.as_bytes()[..5]))
}

/// Validates submissions, prices them and persists the initial record
pub struct RegistrationIntake {
    store: Arc<dyn RegistrationStore>,
    settings: Arc<SettingsService>,
    audit: Arc<AuditTrailService>,
    catalog: PricingCatalog,
    validator: TeamCompositionValidator,
    slip_prefix: String,
}

impl RegistrationIntake {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        settings: Arc<SettingsService>,
        audit: Arc<AuditTrailService>,
        slip_prefix: impl Into<String>,
    ) -> Self {
        let catalog = PricingCatalog::default();
        Self {
            store,
            settings,
            audit,
            catalog,
            validator: TeamCompositionValidator::new(catalog),
            slip_prefix: slip_prefix.into(),
        }
    }

    /// Accept a submission and store it with a fresh registration number.
    ///
    /// Every check runs before anything is written. A storage failure means
    /// nothing was persisted and the same submission may be sent again.
    pub async fn submit(&self, form: SubmitRegistration) -> AppResult<Registration> {
        let now = chrono::Utc::now().naive_utc();
        self.settings.ensure_open(now).await?;

        let new = self.validate(form, now).map_err(|errors| {
            warn!("Rejected registration: {}", errors);
            AppError::Validation(errors)
        })?;

        let registration = self.store.insert(new).await.map_err(|e| {
            error!("Failed to store registration: {}", e);
            AppError::from(e)
        })?;

        info!(
            "Registration #{} accepted: slip={} method={} total={}",
            registration.registration_number,
            registration.slip_id,
            registration.payment_method,
            registration.total_amount
        );
        self.audit.log_registration_submitted(&registration).await;

        Ok(registration)
    }

    /// Run the submission checks in order and build the record to insert
    fn validate(
        &self,
        form: SubmitRegistration,
        now: chrono::NaiveDateTime,
    ) -> Result<NewRegistration, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        // Identity
        let email = form.email.trim().to_string();
        let name = form.name.trim().to_string();
        let roll_number = form.roll_number.trim().to_string();
        let contact_number = form.contact_number.trim().to_string();
        let alternative_contact_number = non_blank(form.alternative_contact_number.as_deref());

        if email.is_empty() {
            errors.push("email", "Email is required");
        } else if too_long(&email, limits::EMAIL_MAX) {
            errors.push("email", format!("Email must be at most {} characters", limits::EMAIL_MAX));
        } else if !email.contains('@') {
            errors.push("email", "Email is not valid");
        }
        if name.is_empty() {
            errors.push("name", "Name is required");
        } else if too_long(&name, limits::NAME_MAX) {
            errors.push("name", format!("Name must be at most {} characters", limits::NAME_MAX));
        }
        if roll_number.is_empty() {
            errors.push("rollNumber", "Roll number is required");
        } else if too_long(&roll_number, limits::ROLL_NUMBER_MAX) {
            errors.push(
                "rollNumber",
                format!("Roll number must be at most {} characters", limits::ROLL_NUMBER_MAX),
            );
        }
        if contact_number.is_empty() {
            errors.push("contactNumber", "Contact number is required");
        } else if !is_well_formed_contact(&contact_number) {
            errors.push(
                "contactNumber",
                "Contact number must look like 03XX-XXXXXXX",
            );
        }
        if let Some(alternative) = &alternative_contact_number {
            if !is_well_formed_contact(alternative) {
                errors.push(
                    "alternativeContactNumber",
                    "Contact number must look like 03XX-XXXXXXX",
                );
            }
        }

        let gender = match form.gender.parse::<Gender>() {
            Ok(gender) => Some(gender),
            Err(_) => {
                errors.push("gender", "Gender must be boys or girls");
                None
            }
        };

        // Games and teams; both need a known gender
        let mut team_members = TeamRoster::new();
        if form.selected_games.is_empty() {
            errors.push("selectedGames", "Select at least one game");
        } else if let Some(gender) = gender {
            match self
                .validator
                .validate(&form.selected_games, gender, &form.team_members)
            {
                Ok(accepted) => team_members = accepted,
                Err(team_errors) => {
                    for e in team_errors.errors() {
                        errors.push(e.field.clone(), e.message.clone());
                    }
                }
            }
        }

        // Payment
        let payment_method = match form.payment_method.parse::<PaymentMethod>() {
            Ok(method) => Some(method),
            Err(_) => {
                errors.push("paymentMethod", "Payment method must be cash or online");
                None
            }
        };
        let (transaction_id, payment_proof) = match payment_method {
            Some(PaymentMethod::Online) => {
                let transaction_id = non_blank(form.transaction_id.as_deref());
                let payment_proof = non_blank(form.payment_proof.as_deref());
                match &transaction_id {
                    None => errors.push(
                        "transactionId",
                        "Transaction ID is required for online payment",
                    ),
                    Some(id) if too_long(id, limits::TRANSACTION_ID_MAX) => errors.push(
                        "transactionId",
                        format!(
                            "Transaction ID must be at most {} characters",
                            limits::TRANSACTION_ID_MAX
                        ),
                    ),
                    Some(_) => {}
                }
                if payment_proof.is_none() {
                    errors.push(
                        "paymentProof",
                        "Payment screenshot is required for online payment",
                    );
                }
                (transaction_id, payment_proof)
            }
            _ => (None, None),
        };

        let (Some(gender), Some(payment_method)) = (gender, payment_method) else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let total_amount = self
            .catalog
            .total_for(form.selected_games.iter(), gender)
            .map_err(|game| {
                ValidationErrors::single(
                    "selectedGames",
                    format!("{} is not available for {}", game, gender),
                )
            })?;

        Ok(NewRegistration {
            id: Uuid::new_v4(),
            email,
            name,
            roll_number,
            contact_number,
            alternative_contact_number,
            gender,
            selected_games: form.selected_games,
            team_members,
            total_amount,
            payment_method,
            transaction_id,
            payment_proof,
            slip_id: generate_slip_id(&self.slip_prefix, payment_method),
            status: RegistrationStatus::initial_for(payment_method),
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slip_id_format() {
        let cash = generate_slip_id("WLG25", PaymentMethod::Cash);
        let online = generate_slip_id("WLG25", PaymentMethod::Online);

        assert!(cash.starts_with("WLG25-CASH-"));
        assert!(online.starts_with("WLG25-ONL-"));

        let suffix = cash.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 10);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        assert_ne!(cash, generate_slip_id("WLG25", PaymentMethod::Cash));
    }

    #[test]
    fn test_form_accepts_screenshot_alias_and_ignores_total() {
        let form: SubmitRegistration = serde_json::from_value(serde_json::json!({
            "email": "a@b.c",
            "gender": "boys",
            "selectedGames": "[\"Chess\"]",
            "paymentMethod": "online",
            "screenshotUrl": "https://img/1.png",
            "totalAmount": 1
        }))
        .unwrap();
        assert_eq!(form.payment_proof.as_deref(), Some("https://img/1.png"));
        assert!(form.selected_games.contains("Chess"));
    }
}
