//! Privacy handler.
//!
//! - `POST /users/{id}/privacy` — switch `{id}` between public and private.
//!
//! Going public accepts every pending request; the response lists which
//! requesters were accepted and which could not be (those stay pending and
//! are retried by the next `is_private: false` call).

use axum::{
    extract::{Path, State},
    Json,
};
use kinship_node_api::{PrivacyRequest, PrivacyResponse};

use crate::error::AppError;

use super::AppState;

/// `POST /users/{id}/privacy`
pub async fn set_privacy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PrivacyRequest>,
) -> Result<Json<PrivacyResponse>, AppError> {
    let resp = state.manager.set_privacy(&id, req.is_private).await?;
    Ok(Json(resp))
}
