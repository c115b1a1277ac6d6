//! Domain models for the league backend.
//!
//! Registrations are the only core entity; admin sessions and event settings
//! back the authentication and registration-window collaborators.

pub mod admin_session;
pub mod event_settings;
pub mod registration;
pub mod stats;

// Re-export all models for convenient access
pub use admin_session::AdminSession;
pub use event_settings::{EventSettings, SettingsUpdate};
pub use registration::{
    check_discount, is_well_formed_contact, limits, Gender, NewRegistration, PaymentMethod,
    Registration, RegistrationFilter, RegistrationStatus, SelectedGames, StatusChange, TeamMember,
    TeamRoster,
};
pub use stats::RegistrationStats;
