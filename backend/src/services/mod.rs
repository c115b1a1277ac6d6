pub mod audit;
pub mod directory;
pub mod export;
pub mod intake;
pub mod payment_status;
pub mod settings;
pub mod stats;
pub mod verification;

pub use audit::AuditTrailService;
pub use directory::RegistrationDirectory;
pub use export::{CsvExport, ExportService};
pub use intake::{RegistrationIntake, SubmitRegistration};
pub use payment_status::{PaymentStatusMachine, StatusUpdateRequest};
pub use settings::SettingsService;
pub use stats::StatsAggregator;
pub use verification::{LookupKey, VerificationGateway};
