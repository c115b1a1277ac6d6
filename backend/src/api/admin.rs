//! Admin session, dashboard and settings endpoints.

use super::extractors::bearer_token;
use super::{json_body, query_params, ApiResponse};
use crate::auth::AdminCredential;
use crate::error::AppResult;
use crate::models::{EventSettings, RegistrationFilter, SettingsUpdate};
use crate::AppState;
use axum::body::Body;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/verify", get(verify_session))
        .route("/api/stats", get(stats))
        .route("/api/export", get(export_csv))
        .route("/api/settings", get(get_settings).patch(update_settings))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    session_token: String,
    expires_at: NaiveDateTime,
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<SessionResponse>>> {
    let request = json_body(payload)?;
    let outcome = state
        .authenticator
        .login(request.username.trim(), &request.password)
        .await?;

    Ok(ApiResponse::ok(SessionResponse {
        session_token: outcome.session_token,
        expires_at: outcome.expires_at,
    }))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<impl IntoResponse> {
    if let Some(token) = bearer_token(&headers) {
        state.authenticator.logout(token).await?;
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn verify_session(credential: AdminCredential) -> impl IntoResponse {
    ApiResponse::ok(serde_json::json!({
        "authenticated": true,
        "expiresAt": credential.expires_at(),
    }))
}

async fn stats(
    State(state): State<AppState>,
    credential: AdminCredential,
) -> AppResult<impl IntoResponse> {
    let stats = state.stats.stats(&credential).await?;
    Ok((
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        ApiResponse::ok(stats),
    ))
}

async fn export_csv(
    State(state): State<AppState>,
    credential: AdminCredential,
    filter: Result<Query<RegistrationFilter>, QueryRejection>,
) -> AppResult<Response> {
    let filter = query_params(filter)?;
    let export = state.export.export(&credential, &filter).await?;

    let disposition = format!("attachment; filename=\"{}\"", export.file_name());
    let mut response = Body::from_stream(export.into_stream()).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

async fn get_settings(State(state): State<AppState>) -> AppResult<Json<ApiResponse<EventSettings>>> {
    Ok(ApiResponse::ok(state.settings.get().await?))
}

async fn update_settings(
    State(state): State<AppState>,
    credential: AdminCredential,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> AppResult<Json<ApiResponse<EventSettings>>> {
    let update = json_body(payload)?;
    let settings = state.settings.update(&credential, update).await?;
    Ok(ApiResponse::ok(settings))
}
