use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::models::AdminSession;
use crate::repositories::SessionStore;
use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Proof that the caller holds a live admin session.
///
/// Only [`AdminAuthenticator::verify`] creates one; every admin operation
/// takes it as an explicit argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredential {
    session_id: Uuid,
    expires_at: NaiveDateTime,
}

impl AdminCredential {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn expires_at(&self) -> NaiveDateTime {
        self.expires_at
    }

    /// A credential can outlive its session while a request is in flight
    pub fn ensure_active(&self, now: NaiveDateTime) -> AppResult<()> {
        if self.expires_at <= now {
            return Err(AppError::Unauthorized("Admin session expired".to_string()));
        }
        Ok(())
    }
}

/// Token handed back by a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session_token: String,
    pub expires_at: NaiveDateTime,
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Issues, verifies and revokes admin sessions
pub struct AdminAuthenticator {
    sessions: Arc<dyn SessionStore>,
    username_digest: [u8; 32],
    password_digest: [u8; 32],
    session_ttl: chrono::Duration,
}

impl AdminAuthenticator {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        username: &str,
        password: &str,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            sessions,
            username_digest: digest(username),
            password_digest: digest(password),
            session_ttl,
        }
    }

    pub fn from_config(sessions: Arc<dyn SessionStore>, config: &AdminConfig) -> Self {
        Self::new(
            sessions,
            &config.username,
            &config.password,
            config.session_ttl(),
        )
    }

    /// Check the configured admin credentials and open a session
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        // Compare fixed-size digests so input length does not matter
        let username_ok = digest(username) == self.username_digest;
        let password_ok = digest(password) == self.password_digest;
        if !(username_ok && password_ok) {
            warn!("Rejected admin login for {:?}", username);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let now = chrono::Utc::now().naive_utc();
        let session = AdminSession::new(Uuid::new_v4().to_string(), now + self.session_ttl);
        self.sessions.insert(&session).await?;

        info!("Admin session {} opened, expires {}", session.id, session.expires_at);
        Ok(LoginOutcome {
            session_token: session.session_token,
            expires_at: session.expires_at,
        })
    }

    /// Resolve a session token into a credential
    pub async fn verify(&self, token: Option<&str>) -> AppResult<AdminCredential> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized("Admin authentication required".to_string())
            })?;

        let now = chrono::Utc::now().naive_utc();
        let session = self
            .sessions
            .find_active(token, now)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired session".to_string()))?;

        Ok(AdminCredential {
            session_id: session.id,
            expires_at: session.expires_at,
        })
    }

    /// Revoke a session; unknown tokens are not an error
    pub async fn logout(&self, token: &str) -> AppResult<bool> {
        let removed = self.sessions.delete(token).await?;
        if removed {
            info!("Admin session closed");
        }
        Ok(removed)
    }

    /// Remove sessions that have already expired
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let purged = self
            .sessions
            .purge_expired(chrono::Utc::now().naive_utc())
            .await?;
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemorySessionStore;

    fn authenticator(ttl: chrono::Duration) -> AdminAuthenticator {
        AdminAuthenticator::new(Arc::new(InMemorySessionStore::new()), "admin", "secret", ttl)
    }

    #[tokio::test]
    async fn test_login_verify_logout() {
        let auth = authenticator(chrono::Duration::hours(24));
        let outcome = auth.login("admin", "secret").await.unwrap();

        let credential = auth.verify(Some(&outcome.session_token)).await.unwrap();
        assert_eq!(credential.expires_at(), outcome.expires_at);

        assert!(auth.logout(&outcome.session_token).await.unwrap());
        let err = auth.verify(Some(&outcome.session_token)).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let auth = authenticator(chrono::Duration::hours(24));
        let err = auth.login("admin", "guess").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let auth = authenticator(chrono::Duration::hours(24));
        assert!(auth.verify(None).await.unwrap_err().is_unauthorized());
        assert!(auth.verify(Some("  ")).await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let auth = authenticator(chrono::Duration::seconds(-1));
        let outcome = auth.login("admin", "secret").await.unwrap();
        let err = auth.verify(Some(&outcome.session_token)).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(auth.purge_expired().await.unwrap(), 1);
    }

    #[test]
    fn test_credential_expiry_check() {
        let now = chrono::Utc::now().naive_utc();
        let credential = AdminCredential {
            session_id: Uuid::new_v4(),
            expires_at: now,
        };
        assert!(credential.ensure_active(now).is_err());
        assert!(credential
            .ensure_active(now - chrono::Duration::seconds(1))
            .is_ok());
    }
}
