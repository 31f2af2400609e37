//! Assembles the Axum [`Router`] from all handler modules.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    config::NodeConfig,
    directory::AccountDirectory,
    handlers::{follows, privacy, users, AppState},
    relations::RelationshipManager,
    storage::Storage,
};

/// Build the complete application router with shared state.
///
/// `directory` decides which usernames exist; pass a
/// [`LocalDirectory`](crate::directory::LocalDirectory) over the same
/// `storage` for a self-contained node.
pub fn build_router(
    storage: Arc<dyn Storage>,
    directory: Arc<dyn AccountDirectory>,
    config: NodeConfig,
) -> Router {
    let manager = Arc::new(RelationshipManager::new(Arc::clone(&storage), directory));

    let state = AppState {
        manager,
        storage,
        config,
    };

    Router::new()
        .route("/health", get(users::health))
        // Accounts
        .route("/users/{id}", get(users::get_profile).put(users::register))
        .route("/users/{id}/privacy", post(privacy::set_privacy))
        // Follow lifecycle
        .route("/users/{id}/follow", post(follows::follow))
        .route("/users/{id}/unfollow", post(follows::unfollow))
        .route("/users/{id}/accept", post(follows::accept))
        .route("/users/{id}/reject", post(follows::reject))
        // Queries
        .route("/users/{id}/following", get(users::list_following))
        .route("/users/{id}/followers", get(users::list_followers))
        .route("/users/{id}/requests", get(users::list_requests))
        .route(
            "/users/{id}/relationship/{target}",
            get(follows::relationship),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
