use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

/// `03XX-XXXXXXX`, with or without the dash
static CONTACT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-?[0-9]{7}$").expect("valid contact regex"));

pub fn is_well_formed_contact(number: &str) -> bool {
    CONTACT_NUMBER.is_match(number.trim())
}

/// Column sizes of the `registrations` table, in characters
pub mod limits {
    use rust_decimal::Decimal;

    pub const EMAIL_MAX: usize = 255;
    pub const NAME_MAX: usize = 255;
    pub const ROLL_NUMBER_MAX: usize = 50;
    pub const CONTACT_NUMBER_MAX: usize = 20;
    pub const TRANSACTION_ID_MAX: usize = 255;
    pub const SLIP_ID_MAX: usize = 50;

    /// Longest prefix that keeps `{prefix}-CASH-{10 hex}` within `SLIP_ID_MAX`
    pub const SLIP_PREFIX_MAX: usize = SLIP_ID_MAX - "-CASH-".len() - 10;

    /// `discount NUMERIC(10, 2)`
    pub const DISCOUNT_SCALE: u32 = 2;
    pub const DISCOUNT_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);
}

/// A discount the `NUMERIC(10, 2)` column stores exactly
pub fn check_discount(discount: Decimal) -> Result<(), String> {
    if discount < Decimal::ZERO {
        return Err("Discount must not be negative".to_string());
    }
    if discount >= limits::DISCOUNT_LIMIT {
        return Err(format!("Discount must be below {}", limits::DISCOUNT_LIMIT));
    }
    if discount.normalize().scale() > limits::DISCOUNT_SCALE {
        return Err(format!(
            "Discount may have at most {} decimal places",
            limits::DISCOUNT_SCALE
        ));
    }
    Ok(())
}

/// Registrant category; prices and team sizes differ per gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boys,
    Girls,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Boys, Gender::Girls];

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Boys => "boys",
            Gender::Girls => "girls",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "boys" => Ok(Gender::Boys),
            "girls" => Ok(Gender::Girls),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Online,
}

impl PaymentMethod {
    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Online => "online",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "online" => Ok(PaymentMethod::Online),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment verification status.
///
/// Any status may be set from any other by an admin; there is no enforced
/// forward-only workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    PendingCash,
    PendingOnline,
    Paid,
    Rejected,
}

impl RegistrationStatus {
    pub const ALL: [RegistrationStatus; 4] = [
        RegistrationStatus::PendingCash,
        RegistrationStatus::PendingOnline,
        RegistrationStatus::Paid,
        RegistrationStatus::Rejected,
    ];

    /// Status a fresh submission starts in
    pub fn initial_for(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => RegistrationStatus::PendingCash,
            PaymentMethod::Online => RegistrationStatus::PendingOnline,
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::PendingCash => "pending_cash",
            RegistrationStatus::PendingOnline => "pending_online",
            RegistrationStatus::Paid => "paid",
            RegistrationStatus::Rejected => "rejected",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::PendingCash | RegistrationStatus::PendingOnline
        )
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_cash" => Ok(RegistrationStatus::PendingCash),
            "pending_online" => Ok(RegistrationStatus::PendingOnline),
            "paid" => Ok(RegistrationStatus::Paid),
            "rejected" => Ok(RegistrationStatus::Rejected),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Additional player on a team game; the registrant is the implicit first player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub contact_number: String,
}

/// Game name -> additional players, only for games with more than one player
pub type TeamRoster = BTreeMap<String, Vec<TeamMember>>;

/// Distinct game names a registrant signed up for.
///
/// Accepts either a JSON list or a JSON-encoded string holding a list;
/// names are trimmed, blanks dropped and duplicates collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectedGames(BTreeSet<String>);

impl SelectedGames {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, game: &str) -> bool {
        self.0.contains(game)
    }

    /// Names joined with `sep`, in sorted order
    pub fn join(&self, sep: &str) -> String {
        self.iter().collect::<Vec<_>>().join(sep)
    }
}

impl<S: AsRef<str>> FromIterator<S> for SelectedGames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|g| g.as_ref().trim().to_string())
                .filter(|g| !g.is_empty())
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for SelectedGames {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Encoded(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::List(games) => Ok(games.into_iter().collect()),
            Raw::Encoded(encoded) => serde_json::from_str::<Vec<String>>(&encoded)
                .map(|games| games.into_iter().collect())
                .map_err(|e| D::Error::custom(format!("selectedGames is not a list: {}", e))),
        }
    }
}

/// A persisted registration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub id: Uuid,
    pub registration_number: i64,
    pub email: String,
    pub name: String,
    pub roll_number: String,
    pub contact_number: String,
    pub alternative_contact_number: Option<String>,
    pub gender: Gender,
    pub selected_games: SelectedGames,
    pub team_members: TeamRoster,
    /// Fixed at submission; never recomputed
    pub total_amount: Decimal,
    pub discount: Option<Decimal>,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub payment_proof: Option<String>,
    pub slip_id: String,
    pub status: RegistrationStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Registration {
    /// A missing discount counts as zero
    pub fn discount_or_zero(&self) -> Decimal {
        self.discount.unwrap_or(Decimal::ZERO)
    }

    /// `total_amount - discount`; may go negative since discounts are uncapped
    pub fn final_amount(&self) -> Decimal {
        self.total_amount - self.discount_or_zero()
    }

    pub fn is_paid(&self) -> bool {
        self.status == RegistrationStatus::Paid
    }
}

/// A validated submission waiting for its registration number
#[derive(Debug, Clone, PartialEq)]
pub struct NewRegistration {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roll_number: String,
    pub contact_number: String,
    pub alternative_contact_number: Option<String>,
    pub gender: Gender,
    pub selected_games: SelectedGames,
    pub team_members: TeamRoster,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub payment_proof: Option<String>,
    pub slip_id: String,
    pub status: RegistrationStatus,
    pub created_at: NaiveDateTime,
}

impl NewRegistration {
    /// Attach the number handed out by the store's sequence
    pub fn into_registration(self, registration_number: i64) -> Registration {
        Registration {
            id: self.id,
            registration_number,
            email: self.email,
            name: self.name,
            roll_number: self.roll_number,
            contact_number: self.contact_number,
            alternative_contact_number: self.alternative_contact_number,
            gender: self.gender,
            selected_games: self.selected_games,
            team_members: self.team_members,
            total_amount: self.total_amount,
            discount: Some(Decimal::ZERO),
            payment_method: self.payment_method,
            transaction_id: self.transaction_id,
            payment_proof: self.payment_proof,
            slip_id: self.slip_id,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Fields an admin mutation touches. `None` leaves the stored value as is;
/// `discount: Some(None)` clears the discount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusChange {
    pub status: Option<RegistrationStatus>,
    pub discount: Option<Option<Decimal>>,
}

impl StatusChange {
    pub fn status(status: RegistrationStatus) -> Self {
        Self {
            status: Some(status),
            discount: None,
        }
    }

    pub fn discount(discount: Decimal) -> Self {
        Self {
            status: None,
            discount: Some(Some(discount)),
        }
    }

    pub fn with_status(mut self, status: RegistrationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = Some(Some(discount));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.discount.is_none()
    }

    /// Apply only the supplied fields and refresh `updated_at`
    pub fn apply_to(&self, registration: &mut Registration, now: NaiveDateTime) {
        if let Some(status) = self.status {
            registration.status = status;
        }
        if let Some(discount) = self.discount {
            registration.discount = discount;
        }
        registration.updated_at = now;
    }
}

/// Admin listing/export filter; every field is optional and they combine with AND
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationFilter {
    pub status: Option<RegistrationStatus>,
    pub gender: Option<Gender>,
    pub game: Option<String>,
    /// Inclusive, on the creation date
    pub start_date: Option<NaiveDate>,
    /// Inclusive, on the creation date
    pub end_date: Option<NaiveDate>,
}

impl RegistrationFilter {
    pub fn matches(&self, registration: &Registration) -> bool {
        let created = registration.created_at.date();
        self.status.map_or(true, |s| registration.status == s)
            && self.gender.map_or(true, |g| registration.gender == g)
            && self
                .game
                .as_deref()
                .map_or(true, |g| registration.selected_games.contains(g))
            && self.start_date.map_or(true, |d| created >= d)
            && self.end_date.map_or(true, |d| created <= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: RegistrationStatus) -> Registration {
        let now = chrono::Utc::now().naive_utc();
        NewRegistration {
            id: Uuid::new_v4(),
            email: "ali@example.com".into(),
            name: "Ali".into(),
            roll_number: "BCSF22M001".into(),
            contact_number: "0300-1234567".into(),
            alternative_contact_number: None,
            gender: Gender::Boys,
            selected_games: ["Chess", "Uno"].into_iter().collect(),
            team_members: TeamRoster::new(),
            total_amount: Decimal::new(250, 0),
            payment_method: PaymentMethod::Cash,
            transaction_id: None,
            payment_proof: None,
            slip_id: "WLG25-CASH-ABCDEF1234".into(),
            status,
            created_at: now,
        }
        .into_registration(1)
    }

    #[test]
    fn test_contact_number_format() {
        assert!(is_well_formed_contact("0300-1234567"));
        assert!(is_well_formed_contact("03001234567"));
        assert!(!is_well_formed_contact("0300-123456"));
        assert!(!is_well_formed_contact("phone"));
        assert!(!is_well_formed_contact(""));
        assert!(!is_well_formed_contact(&"0".repeat(limits::CONTACT_NUMBER_MAX + 1)));
    }

    #[test]
    fn test_discount_must_fit_the_column() {
        assert!(check_discount(Decimal::ZERO).is_ok());
        assert!(check_discount(Decimal::new(9_999_999_999, 2)).is_ok());
        assert!(check_discount(Decimal::new(1050, 2)).is_ok());
        assert!(check_discount(Decimal::new(10_500, 3)).is_ok());

        assert!(check_discount(Decimal::new(-1, 0)).is_err());
        assert!(check_discount(Decimal::new(100_000_000, 0)).is_err());
        assert!(check_discount(Decimal::new(10_005, 3)).is_err());
    }

    #[test]
    fn test_slip_prefix_limit_fits_slip_column() {
        let slip = format!("{}-CASH-{}", "W".repeat(limits::SLIP_PREFIX_MAX), "A".repeat(10));
        assert_eq!(slip.len(), limits::SLIP_ID_MAX);
    }

    #[test]
    fn test_selected_games_accepts_list_and_encoded_string() {
        let from_list: SelectedGames =
            serde_json::from_value(serde_json::json!(["Chess", " Uno ", "Chess"])).unwrap();
        let from_string: SelectedGames =
            serde_json::from_value(serde_json::json!("[\"Uno\",\"Chess\"]")).unwrap();

        assert_eq!(from_list, from_string);
        assert_eq!(from_list.len(), 2);
        assert_eq!(from_list.join("; "), "Chess; Uno");
    }

    #[test]
    fn test_selected_games_rejects_garbage_string() {
        let result: Result<SelectedGames, _> = serde_json::from_value(serde_json::json!("Chess"));
        assert!(result.is_err());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in RegistrationStatus::ALL {
            assert_eq!(status.as_str().parse::<RegistrationStatus>(), Ok(status));
        }
        assert!("approved".parse::<RegistrationStatus>().is_err());
    }

    #[test]
    fn test_initial_status_follows_payment_method() {
        assert_eq!(
            RegistrationStatus::initial_for(PaymentMethod::Cash),
            RegistrationStatus::PendingCash
        );
        assert_eq!(
            RegistrationStatus::initial_for(PaymentMethod::Online),
            RegistrationStatus::PendingOnline
        );
    }

    #[test]
    fn test_status_change_preserves_omitted_fields() {
        let mut reg = sample(RegistrationStatus::PendingCash);
        reg.discount = Some(Decimal::new(50, 0));
        let later = reg.updated_at + chrono::Duration::seconds(5);

        StatusChange::status(RegistrationStatus::Paid).apply_to(&mut reg, later);
        assert_eq!(reg.status, RegistrationStatus::Paid);
        assert_eq!(reg.discount, Some(Decimal::new(50, 0)));
        assert_eq!(reg.updated_at, later);

        StatusChange::discount(Decimal::new(20, 0)).apply_to(&mut reg, later);
        assert_eq!(reg.status, RegistrationStatus::Paid);
        assert_eq!(reg.final_amount(), Decimal::new(230, 0));
    }

    #[test]
    fn test_final_amount_can_go_negative() {
        let mut reg = sample(RegistrationStatus::Paid);
        reg.discount = Some(Decimal::new(300, 0));
        assert_eq!(reg.final_amount(), Decimal::new(-50, 0));

        reg.discount = None;
        assert_eq!(reg.final_amount(), reg.total_amount);
    }

    #[test]
    fn test_filter_matches() {
        let reg = sample(RegistrationStatus::PendingCash);
        let today = reg.created_at.date();

        assert!(RegistrationFilter::default().matches(&reg));
        assert!(RegistrationFilter {
            status: Some(RegistrationStatus::PendingCash),
            gender: Some(Gender::Boys),
            game: Some("Chess".into()),
            start_date: Some(today),
            end_date: Some(today),
        }
        .matches(&reg));
        assert!(!RegistrationFilter {
            game: Some("Cricket".into()),
            ..Default::default()
        }
        .matches(&reg));
        assert!(!RegistrationFilter {
            start_date: today.succ_opt(),
            ..Default::default()
        }
        .matches(&reg));
    }
}
