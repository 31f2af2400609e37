//! Account handlers.
//!
//! - `GET  /health`                  — liveness check.
//! - `GET  /users/{id}`              — profile with relationship lists.
//! - `PUT  /users/{id}`              — register an account (local mode only).
//! - `GET  /users/{id}/following`    — accounts `{id}` follows.
//! - `GET  /users/{id}/followers`    — accounts following `{id}`.
//! - `GET  /users/{id}/requests`     — pending requests addressed to `{id}`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use kinship_node_api::{Account, RegisterRequest, UserListResponse};

use crate::error::AppError;

use super::{require_username, AppState};

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /users/{id}`
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Account>, AppError> {
    Ok(Json(state.manager.profile(&id).await?))
}

/// `PUT /users/{id}`: Create the account with the requested privacy flag.
///
/// Returns 201 when the account was created and 200 with the stored account
/// (privacy unchanged) when it already existed. When the node defers to an
/// external account service, registration is refused with 403.
pub async fn register(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_username("username", &id)?;
    if state.config.account_service.is_some() {
        return Err(AppError::Forbidden(
            "accounts are managed by the external account service".into(),
        ));
    }

    let created = state.storage.put_account(&id, req.is_private).await?;
    let account = state
        .storage
        .get_account(&id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("account {id} vanished after registration")))?;

    let status = if created {
        tracing::info!("users: registered {id} (private: {})", req.is_private);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(account)))
}

/// `GET /users/{id}/following`
pub async fn list_following(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserListResponse>, AppError> {
    let items = state.manager.list_following(&id).await?;
    Ok(Json(UserListResponse { items }))
}

/// `GET /users/{id}/followers`
pub async fn list_followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserListResponse>, AppError> {
    let items = state.manager.list_followers(&id).await?;
    Ok(Json(UserListResponse { items }))
}

/// `GET /users/{id}/requests`
pub async fn list_requests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserListResponse>, AppError> {
    let items = state.manager.list_pending_requests(&id).await?;
    Ok(Json(UserListResponse { items }))
}
