use super::RegistrationStore;
use crate::error::RepositoryError;
use crate::models::{
    NewRegistration, Registration, RegistrationFilter, RegistrationStats, StatusChange,
    TeamRoster,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

macro_rules! registration_columns {
    () => {
        r#"
            id,
            registration_number,
            email,
            name,
            roll_number,
            contact_number,
            alternative_contact_number,
            gender,
            selected_games,
            team_members,
            total_amount,
            discount,
            payment_method,
            transaction_id,
            payment_proof,
            slip_id,
            status,
            created_at,
            updated_at
        "#
    };
}

/// Raw `registrations` row; enums are TEXT and games/teams are JSONB
#[derive(Debug, FromRow)]
struct RegistrationRow {
    id: Uuid,
    registration_number: i64,
    email: String,
    name: String,
    roll_number: String,
    contact_number: String,
    alternative_contact_number: Option<String>,
    gender: String,
    selected_games: Json<Vec<String>>,
    team_members: Json<TeamRoster>,
    total_amount: Decimal,
    discount: Option<Decimal>,
    payment_method: String,
    transaction_id: Option<String>,
    payment_proof: Option<String>,
    slip_id: String,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = RepositoryError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        Ok(Registration {
            id: row.id,
            registration_number: row.registration_number,
            email: row.email,
            name: row.name,
            roll_number: row.roll_number,
            contact_number: row.contact_number,
            alternative_contact_number: row.alternative_contact_number,
            gender: row.gender.parse().map_err(RepositoryError::Corrupt)?,
            selected_games: row.selected_games.0.into_iter().collect(),
            team_members: row.team_members.0,
            total_amount: row.total_amount,
            discount: row.discount,
            payment_method: row.payment_method.parse().map_err(RepositoryError::Corrupt)?,
            transaction_id: row.transaction_id,
            payment_proof: row.payment_proof,
            slip_id: row.slip_id,
            status: row.status.parse().map_err(RepositoryError::Corrupt)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_registration(row: Option<RegistrationRow>) -> Result<Option<Registration>, RepositoryError> {
    row.map(Registration::try_from).transpose()
}

/// Repository for registration data access
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    /// Create a new RegistrationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationStore for RegistrationRepository {
    async fn insert(&self, new: NewRegistration) -> Result<Registration, RepositoryError> {
        // registration_number comes from the column default (nextval) so the
        // allocation and the row land in the same statement
        let row = sqlx::query_as::<_, RegistrationRow>(concat!(
            r#"
            INSERT INTO registrations (
                id, email, name, roll_number, contact_number, alternative_contact_number,
                gender, selected_games, team_members, total_amount, discount,
                payment_method, transaction_id, payment_proof, slip_id, status,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, $11, $12, $13, $14, $15, $16, $16)
            RETURNING "#,
            registration_columns!()
        ))
        .bind(new.id)
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.roll_number)
        .bind(&new.contact_number)
        .bind(&new.alternative_contact_number)
        .bind(new.gender.as_str())
        .bind(Json(&new.selected_games))
        .bind(Json(&new.team_members))
        .bind(new.total_amount)
        .bind(new.payment_method.as_str())
        .bind(&new.transaction_id)
        .bind(&new.payment_proof)
        .bind(&new.slip_id)
        .bind(new.status.as_str())
        .bind(new.created_at)
        .fetch_one(&self.pool)
        .await?;

        Registration::try_from(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Registration>, RepositoryError> {
        let row = sqlx::query_as::<_, RegistrationRow>(concat!(
            "SELECT ",
            registration_columns!(),
            " FROM registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        into_registration(row)
    }

    async fn find_by_number(
        &self,
        registration_number: i64,
    ) -> Result<Option<Registration>, RepositoryError> {
        let row = sqlx::query_as::<_, RegistrationRow>(concat!(
            "SELECT ",
            registration_columns!(),
            " FROM registrations WHERE registration_number = $1 LIMIT 1"
        ))
        .bind(registration_number)
        .fetch_optional(&self.pool)
        .await?;

        into_registration(row)
    }

    async fn find_by_slip_id(
        &self,
        slip_id: &str,
    ) -> Result<Option<Registration>, RepositoryError> {
        let row = sqlx::query_as::<_, RegistrationRow>(concat!(
            "SELECT ",
            registration_columns!(),
            " FROM registrations WHERE slip_id = $1 LIMIT 1"
        ))
        .bind(slip_id)
        .fetch_optional(&self.pool)
        .await?;

        into_registration(row)
    }

    async fn list(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<Registration>, RepositoryError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(concat!(
            "SELECT ",
            registration_columns!(),
            " FROM registrations WHERE TRUE"
        ));

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(gender) = filter.gender {
            query.push(" AND gender = ").push_bind(gender.as_str());
        }
        if let Some(game) = &filter.game {
            query
                .push(" AND selected_games @> jsonb_build_array(")
                .push_bind(game.clone())
                .push("::text)");
        }
        if let Some(start) = filter.start_date {
            query.push(" AND created_at::date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            query.push(" AND created_at::date <= ").push_bind(end);
        }
        query.push(" ORDER BY created_at DESC, registration_number DESC");

        let rows = query
            .build_query_as::<RegistrationRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Registration::try_from).collect()
    }

    async fn apply_change(
        &self,
        id: Uuid,
        change: &StatusChange,
        now: NaiveDateTime,
    ) -> Result<Option<Registration>, RepositoryError> {
        // Omitted fields keep their stored value; both columns move in one UPDATE
        let row = sqlx::query_as::<_, RegistrationRow>(concat!(
            r#"
            UPDATE registrations
            SET status = CASE WHEN $2 THEN $3 ELSE status END,
                discount = CASE WHEN $4 THEN $5 ELSE discount END,
                updated_at = $6
            WHERE id = $1
            RETURNING "#,
            registration_columns!()
        ))
        .bind(id)
        .bind(change.status.is_some())
        .bind(change.status.map(|s| s.as_str()))
        .bind(change.discount.is_some())
        .bind(change.discount.flatten())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        into_registration(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self) -> Result<RegistrationStats, RepositoryError> {
        let stats = sqlx::query_as::<_, RegistrationStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'paid') AS paid,
                COUNT(*) FILTER (WHERE status = 'pending_online') AS pending_online,
                COUNT(*) FILTER (WHERE status = 'pending_cash') AS pending_cash,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
            FROM registrations
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
