use crate::models::limits;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment; production switches on JSON logs and a mandatory admin password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: development, staging, production",
                other
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        })
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Admin login and session settings
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub session_ttl_hours: i64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub log_level: String,
    pub http_port: u16,
    pub environment: Environment,
    /// Base of the cash-desk verification URL embedded in QR payloads
    pub public_base_url: String,
    pub slip_prefix: String,
    pub audit_log_dir: PathBuf,
}

/// Reads raw variables; `from_env` plugs in the process environment, tests a map
struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Unset falls back to `default`; set but unparseable is an error
    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, String> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| format!("Invalid {}: {:?}", key, raw)),
        }
    }

    fn positive_or<T>(&self, key: &str, default: T) -> Result<T, String>
    where
        T: FromStr + PartialOrd + Default,
    {
        let value = self.parse_or(key, default)?;
        if value <= T::default() {
            return Err(format!("{} must be greater than 0", key));
        }
        Ok(value)
    }
}

impl DatabaseConfig {
    fn from_vars<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, String> {
        let url = vars
            .get("DATABASE_URL")
            .ok_or("DATABASE_URL environment variable is required")?;

        Ok(Self {
            url,
            max_connections: vars.positive_or("DATABASE_MAX_CONNECTIONS", 10)?,
            acquire_timeout_secs: vars.positive_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 30)?,
            idle_timeout_secs: vars.parse_or("DATABASE_IDLE_TIMEOUT_SECS", 600)?,
            max_lifetime_secs: vars.parse_or("DATABASE_MAX_LIFETIME_SECS", 1800)?,
            test_before_acquire: vars.parse_or("DATABASE_TEST_BEFORE_ACQUIRE", true)?,
        })
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/league".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl AdminConfig {
    fn from_vars<F: Fn(&str) -> Option<String>>(
        vars: &Vars<F>,
        environment: Environment,
    ) -> Result<Self, String> {
        let password = match vars.get("ADMIN_PASSWORD") {
            Some(p) => p,
            None if environment == Environment::Production => {
                return Err("ADMIN_PASSWORD must be set in production".to_string());
            }
            None => "admin".to_string(),
        };

        Ok(Self {
            username: vars.string_or("ADMIN_USERNAME", "admin"),
            password,
            session_ttl_hours: vars.positive_or("ADMIN_SESSION_TTL_HOURS", 24)?,
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
            session_ttl_hours: 24,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; every invalid value is an error
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, String> {
        let vars = Vars(lookup);

        let log_level = vars.string_or("LOG_LEVEL", "info").to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&log_level.as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: trace, debug, info, warn, error",
                log_level
            ));
        }

        let environment: Environment = vars.string_or("ENVIRONMENT", "development").parse()?;
        let http_port = vars.positive_or("HTTP_PORT", 8080u16)?;

        let public_base_url = vars
            .string_or("PUBLIC_BASE_URL", &format!("http://localhost:{}", http_port))
            .trim_end_matches('/')
            .to_string();
        if !public_base_url.starts_with("http://") && !public_base_url.starts_with("https://") {
            return Err(format!(
                "Invalid PUBLIC_BASE_URL: {}. Must start with http:// or https://",
                public_base_url
            ));
        }

        let slip_prefix = vars.string_or("SLIP_PREFIX", "WLG25");
        if !slip_prefix.chars().all(|c| c.is_ascii_alphanumeric())
            || slip_prefix.len() > limits::SLIP_PREFIX_MAX
        {
            return Err(format!(
                "Invalid SLIP_PREFIX: {:?}. Must be alphanumeric and at most {} characters",
                slip_prefix,
                limits::SLIP_PREFIX_MAX
            ));
        }

        Ok(Self {
            database: DatabaseConfig::from_vars(&vars)?,
            admin: AdminConfig::from_vars(&vars, environment)?,
            log_level,
            http_port,
            environment,
            public_base_url,
            slip_prefix: slip_prefix.to_uppercase(),
            audit_log_dir: PathBuf::from(vars.string_or("AUDIT_LOG_DIR", "./logs")),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            admin: AdminConfig::default(),
            log_level: "info".to_string(),
            http_port: 8080,
            environment: Environment::Development,
            public_base_url: "http://localhost:8080".to_string(),
            slip_prefix: "WLG25".to_string(),
            audit_log_dir: PathBuf::from("./logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let config = config_from(&[("DATABASE_URL", "postgres://db/league")]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.slip_prefix, "WLG25");
        assert_eq!(config.public_base_url, "http://localhost:8080");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.admin.session_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(config_from(&[]).unwrap_err().contains("DATABASE_URL"));
    }

    #[test]
    fn test_unparseable_values_are_errors() {
        let err = config_from(&[("DATABASE_URL", "postgres://db"), ("HTTP_PORT", "eighty")])
            .unwrap_err();
        assert!(err.contains("HTTP_PORT"));

        let err = config_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("ADMIN_SESSION_TTL_HOURS", "0"),
        ])
        .unwrap_err();
        assert!(err.contains("ADMIN_SESSION_TTL_HOURS"));

        let err = config_from(&[("DATABASE_URL", "postgres://db"), ("LOG_LEVEL", "loud")])
            .unwrap_err();
        assert!(err.contains("LOG_LEVEL"));
    }

    #[test]
    fn test_production_requires_admin_password() {
        let err = config_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("ENVIRONMENT", "Production"),
        ])
        .unwrap_err();
        assert!(err.contains("ADMIN_PASSWORD"));

        let config = config_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("ENVIRONMENT", "production"),
            ("ADMIN_PASSWORD", "s3cret"),
        ])
        .unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_slip_prefix_must_fit_slip_column() {
        let longest = "W".repeat(limits::SLIP_PREFIX_MAX);
        let config =
            config_from(&[("DATABASE_URL", "postgres://db"), ("SLIP_PREFIX", longest.as_str())]).unwrap();
        assert_eq!(config.slip_prefix, longest);

        let too_long = "W".repeat(limits::SLIP_PREFIX_MAX + 1);
        let err = config_from(&[("DATABASE_URL", "postgres://db"), ("SLIP_PREFIX", too_long.as_str())])
            .unwrap_err();
        assert!(err.contains("SLIP_PREFIX"));
    }

    #[test]
    fn test_base_url_and_prefix_are_normalized() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("PUBLIC_BASE_URL", "https://league.example/"),
            ("SLIP_PREFIX", "wlg26"),
        ])
        .unwrap();
        assert_eq!(config.public_base_url, "https://league.example");
        assert_eq!(config.slip_prefix, "WLG26");
    }
}
