use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_ANNOUNCEMENT: &str = "Registrations are open.";

/// Event-wide registration window and announcement (singleton)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventSettings {
    pub is_open: bool,
    pub open_date: Option<NaiveDateTime>,
    pub close_date: Option<NaiveDateTime>,
    pub announcement: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            is_open: true,
            open_date: None,
            close_date: None,
            announcement: Some(DEFAULT_ANNOUNCEMENT.to_string()),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl EventSettings {
    /// Why submissions are refused at `now`, if they are
    pub fn closed_reason(&self, now: NaiveDateTime) -> Option<&'static str> {
        if !self.is_open {
            return Some("Registration is closed");
        }
        if self.open_date.is_some_and(|open| now < open) {
            return Some("Registration has not opened yet");
        }
        if self.close_date.is_some_and(|close| now > close) {
            return Some("Registration deadline has passed");
        }
        None
    }
}

/// Replacement values for the settings row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default = "default_open")]
    pub is_open: bool,
    #[serde(default)]
    pub open_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub close_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub announcement: Option<String>,
}

fn default_open() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_default_settings_are_open() {
        let settings = EventSettings::default();
        assert!(settings.closed_reason(chrono::Utc::now().naive_utc()).is_none());
    }

    #[test]
    fn test_closed_reasons() {
        let now = chrono::Utc::now().naive_utc();
        let closed = EventSettings {
            is_open: false,
            ..Default::default()
        };
        assert_eq!(closed.closed_reason(now), Some("Registration is closed"));

        let not_yet = EventSettings {
            open_date: Some(now + Duration::hours(1)),
            ..Default::default()
        };
        assert!(not_yet.closed_reason(now).is_some());

        let past = EventSettings {
            close_date: Some(now - Duration::hours(1)),
            ..Default::default()
        };
        assert!(past.closed_reason(now).is_some());
    }

    #[test]
    fn test_update_defaults_to_open() {
        let update: SettingsUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_open);
        assert!(update.announcement.is_none());
    }
}
