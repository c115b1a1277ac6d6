//! Content encoded into the confirmation QR code. Rendering the image is
//! left to the client.

use crate::models::{PaymentMethod, Registration};
use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Tag desk scanners look for in online payloads
pub const ONLINE_PAYLOAD_TYPE: &str = "FCIT_Sports_Registration";

/// JSON carried by the QR code of an online registration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlinePayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub registration_number: i64,
    pub slip_id: String,
    pub registration_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub timestamp: String,
}

/// What the QR code of a registration encodes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub method: PaymentMethod,
    /// Cash: the desk verification URL. Online: the serialized [`OnlinePayload`].
    pub content: String,
}

impl QrPayload {
    pub fn for_registration(
        registration: &Registration,
        public_base_url: &str,
    ) -> Result<Self, serde_json::Error> {
        let content = match registration.payment_method {
            PaymentMethod::Cash => cash_verification_url(public_base_url, registration),
            PaymentMethod::Online => serde_json::to_string(&OnlinePayload::from(registration))?,
        };

        Ok(Self {
            method: registration.payment_method,
            content,
        })
    }
}

/// `{base}/verify-cash?regNum=<n>&slipId=<slip>`
pub fn cash_verification_url(public_base_url: &str, registration: &Registration) -> String {
    format!(
        "{}/verify-cash?regNum={}&slipId={}",
        public_base_url.trim_end_matches('/'),
        registration.registration_number,
        registration.slip_id
    )
}

impl From<&Registration> for OnlinePayload {
    fn from(registration: &Registration) -> Self {
        Self {
            kind: ONLINE_PAYLOAD_TYPE,
            registration_number: registration.registration_number,
            slip_id: registration.slip_id.clone(),
            registration_id: registration.id,
            amount: registration.total_amount,
            method: registration.payment_method,
            transaction_id: registration.transaction_id.clone(),
            timestamp: registration
                .created_at
                .and_utc()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, NewRegistration, RegistrationStatus, TeamRoster};

    fn registration(method: PaymentMethod) -> Registration {
        NewRegistration {
            id: Uuid::new_v4(),
            email: "ali@example.com".into(),
            name: "Ali".into(),
            roll_number: "BSEF22M001".into(),
            contact_number: "0300-1234567".into(),
            alternative_contact_number: None,
            gender: Gender::Boys,
            selected_games: ["Tekken"].into_iter().collect(),
            team_members: TeamRoster::new(),
            total_amount: Decimal::new(300, 0),
            payment_method: method,
            transaction_id: (method == PaymentMethod::Online).then(|| "TX123".to_string()),
            payment_proof: None,
            slip_id: "WLG25-ONL-ABCDEF0123".into(),
            status: RegistrationStatus::initial_for(method),
            created_at: chrono::Utc::now().naive_utc(),
        }
        .into_registration(12)
    }

    #[test]
    fn test_cash_payload_is_verification_url() {
        let reg = registration(PaymentMethod::Cash);
        let qr = QrPayload::for_registration(&reg, "https://league.example/").unwrap();
        assert_eq!(
            qr.content,
            "https://league.example/verify-cash?regNum=12&slipId=WLG25-ONL-ABCDEF0123"
        );
    }

    #[test]
    fn test_online_payload_fields() {
        let reg = registration(PaymentMethod::Online);
        let qr = QrPayload::for_registration(&reg, "https://league.example").unwrap();
        let json: serde_json::Value = serde_json::from_str(&qr.content).unwrap();

        assert_eq!(json["type"], "FCIT_Sports_Registration");
        assert_eq!(json["registrationNumber"], 12);
        assert_eq!(json["registrationId"], reg.id.to_string());
        assert_eq!(json["amount"], 300.0);
        assert_eq!(json["method"], "online");
        assert_eq!(json["transactionId"], "TX123");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
