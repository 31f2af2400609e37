//! Application-level error type returned by handlers.
//!
//! All variants serialise to the [`ErrorResponse`] JSON format and map to
//! the appropriate HTTP status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kinship_node_api::{error::codes, ErrorResponse};

use crate::relations::RelationError;
use crate::storage::StorageError;

/// An error that a handler can return; converts directly to an HTTP response.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Forbidden(String),
    NoSuchRequest(String),
    SelfFollow(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, codes::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, codes::INVALID_PARAMETER, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, codes::FORBIDDEN, msg),
            AppError::NoSuchRequest(msg) => (StatusCode::CONFLICT, codes::NO_SUCH_REQUEST, msg),
            AppError::SelfFollow(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, codes::SELF_FOLLOW, msg)
            }
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, codes::STORE_UNAVAILABLE, msg)
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR, msg)
            }
        };
        let body = ErrorResponse::new(code, message);
        (status, Json(body)).into_response()
    }
}

impl From<RelationError> for AppError {
    fn from(e: RelationError) -> Self {
        let msg = e.to_string();
        match e {
            RelationError::NotFound(_) => AppError::NotFound(msg),
            RelationError::SelfFollow(_) => AppError::SelfFollow(msg),
            RelationError::NoSuchRequest { .. } => AppError::NoSuchRequest(msg),
            RelationError::StoreUnavailable(_) => AppError::Unavailable(msg),
            RelationError::Internal(_) => AppError::Internal(msg),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => AppError::NotFound("not found".into()),
            StorageError::Unavailable(msg) => AppError::Unavailable(msg),
            StorageError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
