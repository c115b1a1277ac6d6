//! Registration endpoints.
//!
//! - `GET    /api/games?gender=`                     available games
//! - `POST   /api/registrations`                     submit
//! - `GET    /api/registrations`                     list (admin)
//! - `GET    /api/registrations/verify`              desk lookup (admin)
//! - `GET    /api/registrations/{id}`                confirmation
//! - `PATCH  /api/registrations/{id}`                status/discount (admin)
//! - `DELETE /api/registrations/{id}`                delete (admin)
//! - `POST   /api/registrations/{id}/approve-cash`   cash approval (admin)
//! - `GET    /api/registrations/{id}/qr`             QR payload

use super::{json_body, parse_id, query_params, ApiResponse};
use crate::auth::AdminCredential;
use crate::error::{AppError, AppResult};
use crate::models::{Gender, Registration, RegistrationFilter};
use crate::qr::QrPayload;
use crate::services::payment_status::parse_discount;
use crate::services::{LookupKey, StatusUpdateRequest, SubmitRegistration};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/games", get(list_games))
        .route(
            "/api/registrations",
            post(submit_registration).get(list_registrations),
        )
        .route("/api/registrations/verify", get(verify_registration))
        .route(
            "/api/registrations/{id}",
            get(get_registration)
                .patch(update_registration)
                .delete(delete_registration),
        )
        .route("/api/registrations/{id}/approve-cash", post(approve_cash))
        .route("/api/registrations/{id}/qr", get(registration_qr))
}

#[derive(Debug, Deserialize)]
struct GamesQuery {
    gender: Option<String>,
}

async fn list_games(
    State(state): State<AppState>,
    query: Result<Query<GamesQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let query = query_params(query)?;
    match query.gender.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
        Some(raw) => {
            let gender: Gender = raw
                .parse()
                .map_err(|e: String| AppError::invalid("gender", e))?;
            Ok(ApiResponse::ok(serde_json::json!(
                state.catalog.available_games(gender)
            )))
        }
        None => Ok(ApiResponse::ok(serde_json::json!({
            "boys": state.catalog.available_games(Gender::Boys),
            "girls": state.catalog.available_games(Gender::Girls),
        }))),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    success: bool,
    registration_id: Uuid,
    registration_number: i64,
    slip_id: String,
}

async fn submit_registration(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRegistration>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let form = json_body(payload)?;
    let registration = state.intake.submit(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            success: true,
            registration_id: registration.id,
            registration_number: registration.registration_number,
            slip_id: registration.slip_id,
        }),
    ))
}

async fn list_registrations(
    State(state): State<AppState>,
    credential: AdminCredential,
    filter: Result<Query<RegistrationFilter>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Vec<Registration>>>> {
    let filter = query_params(filter)?;
    let registrations = state.directory.list(&credential, &filter).await?;
    Ok(ApiResponse::ok(registrations))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyQuery {
    reg_num: Option<String>,
    slip_id: Option<String>,
}

async fn verify_registration(
    State(state): State<AppState>,
    credential: AdminCredential,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Registration>>> {
    let query = query_params(query)?;
    let key = LookupKey::from_query(query.reg_num.as_deref(), query.slip_id.as_deref())?;
    let registration = state.verification.lookup(&credential, &key).await?;
    Ok(ApiResponse::ok(registration))
}

async fn get_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Registration>>> {
    let registration = state.directory.get(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(registration))
}

async fn update_registration(
    State(state): State<AppState>,
    credential: AdminCredential,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Registration>>> {
    let id = parse_id(&id)?;
    let request = json_body(payload)?;
    let registration = state
        .payments
        .update_from_request(&credential, id, request)
        .await?;
    Ok(ApiResponse::ok(registration))
}

async fn delete_registration(
    State(state): State<AppState>,
    credential: AdminCredential,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.directory.delete(&credential, parse_id(&id)?).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Registration deleted",
    })))
}

#[derive(Debug, Default, Deserialize)]
struct ApproveCashRequest {
    #[serde(default)]
    discount: Option<Value>,
}

/// Body is optional; a missing or null discount approves at full price
async fn approve_cash(
    State(state): State<AppState>,
    credential: AdminCredential,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<Registration>>> {
    let id = parse_id(&id)?;
    let request: ApproveCashRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ApproveCashRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::invalid("body", e.to_string()))?
    };

    let discount = match request.discount {
        Some(value) => parse_discount(&value)
            .map_err(|e| AppError::invalid("discount", e))?
            .unwrap_or(Decimal::ZERO),
        None => Decimal::ZERO,
    };

    let registration = state
        .verification
        .approve_cash(&credential, id, discount)
        .await?;
    Ok(ApiResponse::ok(registration))
}

async fn registration_qr(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<QrPayload>>> {
    let registration = state.directory.get(parse_id(&id)?).await?;
    let payload = QrPayload::for_registration(&registration, &state.config.public_base_url)?;
    Ok(ApiResponse::ok(payload))
}
