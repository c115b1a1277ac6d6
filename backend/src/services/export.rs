use crate::auth::AdminCredential;
use crate::error::AppResult;
use crate::models::{Registration, RegistrationFilter};
use crate::repositories::RegistrationStore;
use futures::stream::{self, Stream};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;

/// Export column order
pub const HEADERS: [&str; 18] = [
    "Registration Number",
    "ID",
    "Email",
    "Name",
    "Roll Number",
    "Contact",
    "Alternative Contact",
    "Gender",
    "Selected Games",
    "Team Members",
    "Original Amount",
    "Discount",
    "Final Amount",
    "Payment Method",
    "Slip ID",
    "Transaction ID",
    "Status",
    "Created At",
];

/// Quote a value containing a comma, quote or line break, doubling inner quotes
pub fn escape_csv_value(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn amount(value: Decimal) -> String {
    value.normalize().to_string()
}

fn team_members_cell(registration: &Registration) -> String {
    registration
        .team_members
        .iter()
        .flat_map(|(game, members)| {
            members
                .iter()
                .map(move |m| format!("{}: {} ({})", game, m.name, m.roll_number))
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// One CSV line, without the trailing newline
pub fn csv_row(registration: &Registration) -> String {
    let cells = [
        registration.registration_number.to_string(),
        registration.id.to_string(),
        registration.email.clone(),
        registration.name.clone(),
        registration.roll_number.clone(),
        registration.contact_number.clone(),
        registration
            .alternative_contact_number
            .clone()
            .unwrap_or_default(),
        registration.gender.to_string(),
        registration.selected_games.join("; "),
        team_members_cell(registration),
        amount(registration.total_amount),
        amount(registration.discount_or_zero()),
        amount(registration.final_amount()),
        registration.payment_method.to_string(),
        registration.slip_id.clone(),
        registration.transaction_id.clone().unwrap_or_default(),
        registration.status.to_string(),
        registration.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ];

    cells
        .iter()
        .map(|cell| escape_csv_value(cell))
        .collect::<Vec<_>>()
        .join(",")
}

/// Rows selected for one export request
#[derive(Debug, Clone)]
pub struct CsvExport {
    rows: Vec<Registration>,
}

impl CsvExport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `registrations_<date>.csv`
    pub fn file_name(&self) -> String {
        format!(
            "registrations_{}.csv",
            chrono::Utc::now().format("%Y-%m-%d")
        )
    }

    /// Header then one chunk per row, lines joined by `\n`
    pub fn into_stream(self) -> impl Stream<Item = Result<String, Infallible>> + Send + 'static {
        let header = stream::once(async { Ok::<_, Infallible>(HEADERS.join(",")) });
        let rows = stream::iter(
            self.rows
                .into_iter()
                .map(|registration| Ok::<_, Infallible>(format!("\n{}", csv_row(&registration)))),
        );
        futures::StreamExt::chain(header, rows)
    }

    pub fn to_csv_string(&self) -> String {
        std::iter::once(HEADERS.join(","))
            .chain(self.rows.iter().map(csv_row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Admin CSV export over the same filter as the listing
pub struct ExportService {
    store: Arc<dyn RegistrationStore>,
}

impl ExportService {
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    pub async fn export(
        &self,
        credential: &AdminCredential,
        filter: &RegistrationFilter,
    ) -> AppResult<CsvExport> {
        credential.ensure_active(chrono::Utc::now().naive_utc())?;
        let rows = self.store.list(filter).await?;
        info!("Exporting {} registrations", rows.len());
        Ok(CsvExport { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Gender, NewRegistration, PaymentMethod, RegistrationStatus, TeamMember, TeamRoster,
    };
    use futures::StreamExt;
    use uuid::Uuid;

    fn registration(name: &str) -> Registration {
        let mut team = TeamRoster::new();
        team.insert(
            "Double Wicket".into(),
            vec![TeamMember {
                name: "Bilal".into(),
                roll_number: "BSEF22M002".into(),
                contact_number: String::new(),
            }],
        );
        let created_at = chrono::NaiveDate::from_ymd_opt(2025, 11, 20)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mut registration = NewRegistration {
            id: Uuid::nil(),
            email: "ali@example.com".into(),
            name: name.into(),
            roll_number: "BSEF22M001".into(),
            contact_number: "0300-1234567".into(),
            alternative_contact_number: None,
            gender: Gender::Boys,
            selected_games: ["Double Wicket", "Chess"].into_iter().collect(),
            team_members: team,
            total_amount: Decimal::new(65000, 2),
            payment_method: PaymentMethod::Cash,
            transaction_id: None,
            payment_proof: None,
            slip_id: "WLG25-CASH-0A1B2C3D4E".into(),
            status: RegistrationStatus::PendingCash,
            created_at,
        }
        .into_registration(7);
        registration.discount = Some(Decimal::new(50, 0));
        registration
    }

    #[test]
    fn test_escape_rules() {
        assert_eq!(escape_csv_value("plain"), "plain");
        assert_eq!(escape_csv_value("Khan, Ali"), "\"Khan, Ali\"");
        assert_eq!(escape_csv_value("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_value("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_row_layout() {
        let row = csv_row(&registration("Ali"));
        assert_eq!(
            row,
            format!(
                "7,{},ali@example.com,Ali,BSEF22M001,0300-1234567,,boys,Chess; Double Wicket,\
                 Double Wicket: Bilal (BSEF22M002),650,50,600,cash,WLG25-CASH-0A1B2C3D4E,,\
                 pending_cash,2025-11-20 09:30:00",
                Uuid::nil()
            )
        );
    }

    #[test]
    fn test_name_with_comma_is_quoted() {
        let row = csv_row(&registration("Khan, Ali"));
        assert!(row.contains(",\"Khan, Ali\","));
    }

    #[tokio::test]
    async fn test_stream_matches_joined_string() {
        let export = CsvExport {
            rows: vec![registration("Ali"), registration("Sara")],
        };
        let expected = export.to_csv_string();
        let streamed: Vec<String> = export
            .into_stream()
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;
        assert_eq!(streamed.concat(), expected);
        assert_eq!(expected.lines().count(), 3);
        assert!(expected.starts_with("Registration Number,ID,Email"));
    }
}
