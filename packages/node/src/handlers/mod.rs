//! HTTP request handlers for all Kinship node endpoints.
//!
//! Each submodule covers a logical group of endpoints. Handlers are pure
//! async functions that receive Axum extractors and return
//! `Result<impl IntoResponse, AppError>`.
//!
//! Handlers validate input and translate between wire types and the
//! [`RelationshipManager`]; all follow/privacy rules live in the manager.

pub mod follows;
pub mod privacy;
pub mod users;

use std::sync::Arc;

use crate::{
    config::NodeConfig, error::AppError, relations::RelationshipManager, storage::Storage,
};

/// Shared application state threaded through all Axum handlers via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<RelationshipManager>,
    /// Direct storage access, used only for account registration.
    pub storage: Arc<dyn Storage>,
    pub config: NodeConfig,
}

/// Reject blank usernames before they reach the manager.
fn require_username(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, Response},
    };
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use crate::{
        config::NodeConfig,
        directory::LocalDirectory,
        router::build_router,
        storage::{memory::MemoryStorage, Storage},
    };

    /// Router over a fresh in-memory store seeded with `accounts`.
    pub async fn app_with(accounts: &[(&str, bool)]) -> (axum::Router, Arc<dyn Storage>) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        for (name, private) in accounts {
            storage.put_account(name, *private).await.unwrap();
        }
        let directory = Arc::new(LocalDirectory::new(Arc::clone(&storage)));
        let config = NodeConfig::ephemeral("127.0.0.1:3000".parse().unwrap());
        (build_router(Arc::clone(&storage), directory, config), storage)
    }

    pub async fn send(app: &axum::Router, req: Request<Body>) -> Response<Body> {
        app.clone().oneshot(req).await.unwrap()
    }

    pub fn post_json(path: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    pub async fn json<T: DeserializeOwned>(resp: Response<Body>) -> T {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}
