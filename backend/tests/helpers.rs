#![allow(dead_code)]

use league_backend::auth::AdminCredential;
use league_backend::config::AppConfig;
use league_backend::models::*;
use league_backend::repositories::*;
use league_backend::services::{AuditTrailService, SubmitRegistration};
use league_backend::AppState;
use std::sync::Arc;

/// Application wired over in-memory stores, with handles to the stores
pub struct TestApp {
    pub state: AppState,
    pub registrations: Arc<InMemoryRegistrationStore>,
    pub sessions: Arc<InMemorySessionStore>,
    pub settings: Arc<InMemorySettingsStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let registrations = Arc::new(InMemoryRegistrationStore::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let settings = Arc::new(InMemorySettingsStore::new());

        let state = AppState::from_stores(
            AppConfig::default(),
            registrations.clone(),
            sessions.clone(),
            settings.clone(),
            Arc::new(AuditTrailService::disabled()),
            None,
        );

        Self {
            state,
            registrations,
            sessions,
            settings,
        }
    }

    /// Log in with the default admin credentials and return the session token
    pub async fn admin_token(&self) -> String {
        self.state
            .authenticator
            .login("admin", "admin")
            .await
            .expect("admin login")
            .session_token
    }

    pub async fn admin(&self) -> AdminCredential {
        let token = self.admin_token().await;
        self.state
            .authenticator
            .verify(Some(&token))
            .await
            .expect("fresh session verifies")
    }

    /// Submit a valid cash registration for `games` (team games get full rosters)
    pub async fn register_cash(&self, gender: Gender, games: &[&str]) -> Registration {
        self.state
            .intake
            .submit(form(gender, games, "cash"))
            .await
            .expect("valid submission")
    }
}

pub fn member(i: usize) -> TeamMember {
    TeamMember {
        name: format!("Player {}", i),
        roll_number: format!("BSCS22M{:03}", i),
        contact_number: String::new(),
    }
}

pub fn members(count: usize) -> Vec<TeamMember> {
    (1..=count).map(member).collect()
}

/// A complete submission; rosters are filled to the exact size each team game needs
pub fn form(gender: Gender, games: &[&str], payment_method: &str) -> SubmitRegistration {
    let catalog = league_backend::catalog::PricingCatalog::default();
    let mut team_members = TeamRoster::new();
    for game in games {
        if let Some(size) = catalog.team_size_of(game, gender) {
            if size > 1 {
                team_members.insert(game.to_string(), members(size as usize - 1));
            }
        }
    }

    SubmitRegistration {
        email: "hamza@example.com".to_string(),
        name: "Hamza Tariq".to_string(),
        roll_number: "BSCS22M100".to_string(),
        contact_number: "0312-3456789".to_string(),
        alternative_contact_number: None,
        gender: gender.to_string(),
        selected_games: games.iter().collect(),
        team_members,
        payment_method: payment_method.to_string(),
        transaction_id: None,
        payment_proof: None,
    }
}

pub fn online_form(gender: Gender, games: &[&str]) -> SubmitRegistration {
    SubmitRegistration {
        transaction_id: Some("EP-99812345".to_string()),
        payment_proof: Some("https://uploads.example/proof.png".to_string()),
        ..form(gender, games, "online")
    }
}
