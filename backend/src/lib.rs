//! League Backend Library
//!
//! Registration intake, pricing/team validation and the payment-status
//! lifecycle for the sports league, exposed for the binary and the tests.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod qr;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use auth::AdminAuthenticator;
use catalog::PricingCatalog;
use database::Database;
use repositories::*;
use services::*;
use std::sync::Arc;

/// Application state shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` when running on in-memory stores
    pub database: Option<Database>,
    pub catalog: PricingCatalog,
    pub authenticator: Arc<AdminAuthenticator>,
    pub intake: Arc<RegistrationIntake>,
    pub payments: Arc<PaymentStatusMachine>,
    pub verification: Arc<VerificationGateway>,
    pub directory: Arc<RegistrationDirectory>,
    pub stats: Arc<StatsAggregator>,
    pub export: Arc<ExportService>,
    pub settings: Arc<SettingsService>,
}

impl AppState {
    /// Wire every service over the given stores
    pub fn from_stores(
        config: AppConfig,
        registrations: Arc<dyn RegistrationStore>,
        sessions: Arc<dyn SessionStore>,
        settings_store: Arc<dyn SettingsStore>,
        audit: Arc<AuditTrailService>,
        database: Option<Database>,
    ) -> Self {
        let settings = Arc::new(SettingsService::new(settings_store, audit.clone()));

        Self {
            authenticator: Arc::new(AdminAuthenticator::from_config(sessions, &config.admin)),
            intake: Arc::new(RegistrationIntake::new(
                registrations.clone(),
                settings.clone(),
                audit.clone(),
                config.slip_prefix.clone(),
            )),
            payments: Arc::new(PaymentStatusMachine::new(registrations.clone(), audit.clone())),
            verification: Arc::new(VerificationGateway::new(
                registrations.clone(),
                audit.clone(),
            )),
            directory: Arc::new(RegistrationDirectory::new(registrations.clone(), audit)),
            stats: Arc::new(StatsAggregator::new(registrations.clone())),
            export: Arc::new(ExportService::new(registrations)),
            settings,
            catalog: PricingCatalog::default(),
            database,
            config: Arc::new(config),
        }
    }

    /// Create a new AppState backed by Postgres
    pub fn postgres(pool: sqlx::PgPool, config: AppConfig, audit: AuditTrailService) -> Self {
        Self::from_stores(
            config,
            Arc::new(RegistrationRepository::new(pool.clone())),
            Arc::new(SessionRepository::new(pool.clone())),
            Arc::new(SettingsRepository::new(pool.clone())),
            Arc::new(audit),
            Some(Database::new(pool)),
        )
    }

    /// State over fresh in-memory stores with the audit trail disabled
    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_stores(
            config,
            Arc::new(InMemoryRegistrationStore::new()),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemorySettingsStore::new()),
            Arc::new(AuditTrailService::disabled()),
            None,
        )
    }
}
