//! Follow-graph handlers.
//!
//! - `POST /users/{id}/follow`                   — `{id}` follows (or requests) `username`.
//! - `POST /users/{id}/unfollow`                 — `{id}` stops following `username`.
//! - `POST /users/{id}/accept`                   — `{id}` accepts `username`'s request.
//! - `POST /users/{id}/reject`                   — `{id}` rejects `username`'s request.
//! - `GET  /users/{id}/relationship/{target}`    — state of the edge `{id} → {target}`.
//!
//! Every command answers with an [`EdgeResponse`] describing the pair after
//! the command. Repeating a follow or unfollow is not an error.

use axum::{
    extract::{Path, State},
    Json,
};
use kinship_node_api::{EdgeResponse, EdgeState, UsernameBody};

use crate::error::AppError;

use super::{require_username, AppState};

fn edge(follower: String, target: String, state: EdgeState) -> Json<EdgeResponse> {
    Json(EdgeResponse {
        follower,
        target,
        state,
    })
}

/// `POST /users/{id}/follow`: Returns `FOLLOWING` for public targets and
/// `PENDING` for private ones. 422 for a self-follow, 404 for unknown accounts.
pub async fn follow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UsernameBody>,
) -> Result<Json<EdgeResponse>, AppError> {
    require_username("username", &body.username)?;
    let s = state.manager.request_follow(&id, &body.username).await?;
    Ok(edge(id, body.username, s))
}

/// `POST /users/{id}/unfollow`: Always `NONE` on success.
pub async fn unfollow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UsernameBody>,
) -> Result<Json<EdgeResponse>, AppError> {
    require_username("username", &body.username)?;
    let s = state.manager.unfollow(&id, &body.username).await?;
    Ok(edge(id, body.username, s))
}

/// `POST /users/{id}/accept`: 409 `no_such_request` when `username` has no
/// pending request to `{id}`.
pub async fn accept(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UsernameBody>,
) -> Result<Json<EdgeResponse>, AppError> {
    require_username("username", &body.username)?;
    let s = state.manager.accept_request(&id, &body.username).await?;
    Ok(edge(body.username, id, s))
}

/// `POST /users/{id}/reject`: 409 `no_such_request` when there is nothing
/// to reject.
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UsernameBody>,
) -> Result<Json<EdgeResponse>, AppError> {
    require_username("username", &body.username)?;
    let s = state.manager.reject_request(&id, &body.username).await?;
    Ok(edge(body.username, id, s))
}

/// `GET /users/{id}/relationship/{target}`
pub async fn relationship(
    State(state): State<AppState>,
    Path((id, target)): Path<(String, String)>,
) -> Result<Json<EdgeResponse>, AppError> {
    let s = state.manager.edge_state(&id, &target).await?;
    Ok(edge(id, target, s))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
