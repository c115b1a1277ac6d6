use super::RegistrationStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registration counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStats {
    pub total: i64,
    pub paid: i64,
    pub pending_online: i64,
    pub pending_cash: i64,
    pub rejected: i64,
}

impl RegistrationStats {
    pub fn record(&mut self, status: RegistrationStatus) {
        self.total += 1;
        match status {
            RegistrationStatus::Paid => self.paid += 1,
            RegistrationStatus::PendingOnline => self.pending_online += 1,
            RegistrationStatus::PendingCash => self.pending_cash += 1,
            RegistrationStatus::Rejected => self.rejected += 1,
        }
    }
}

impl FromIterator<RegistrationStatus> for RegistrationStats {
    fn from_iter<I: IntoIterator<Item = RegistrationStatus>>(iter: I) -> Self {
        let mut stats = Self::default();
        for status in iter {
            stats.record(status);
        }
        stats
    }
}
