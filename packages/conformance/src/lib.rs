//! Shared helpers for the Kinship conformance test suite.
//!
//! Provides [`spawn_node`], which binds a `TcpListener` on an ephemeral
//! port, wires up an in-process node backed by `MemoryStorage`, and returns
//! both the local URL and a reference to the underlying storage so tests can
//! seed accounts without going through the HTTP layer.
//!
//! [`spawn_user_service`] and [`spawn_node_with_account_service`] cover the
//! deployment where account existence is owned by a separate service.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use kinship_node::{
    build_router, config::NodeConfig, AccountDirectory, HttpDirectory, LocalDirectory,
    MemoryStorage, Storage,
};

async fn serve(router: Router) -> (String, std::net::SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance server error");
    });

    (format!("http://{addr}"), addr)
}

async fn spawn_with(
    directory: impl FnOnce(Arc<dyn Storage>) -> Arc<dyn AccountDirectory>,
    account_service: Option<String>,
) -> (String, Arc<MemoryStorage>) {
    let mem_storage = Arc::new(MemoryStorage::new());
    let storage: Arc<dyn Storage> = Arc::clone(&mem_storage) as Arc<dyn Storage>;
    let directory = directory(Arc::clone(&storage));

    let mut config = NodeConfig::ephemeral("127.0.0.1:0".parse().expect("literal addr"));
    config.account_service = account_service;
    let router = build_router(storage, directory, config);

    let (base_url, _) = serve(router).await;
    (base_url, mem_storage)
}

/// Start an ephemeral in-process node and return `(base_url, storage)`.
///
/// The node runs in a background `tokio` task and is bound to an OS-assigned
/// port on `127.0.0.1`. Accounts are registered on the node itself, either
/// with `PUT /users/{id}` or by calling `put_account` on the returned storage.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound or the node fails to start.
pub async fn spawn_node() -> (String, Arc<MemoryStorage>) {
    spawn_with(|storage| Arc::new(LocalDirectory::new(storage)), None).await
}

/// Start a node whose account existence checks go to `account_service`.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built or the listener cannot be bound.
pub async fn spawn_node_with_account_service(
    account_service: &str,
) -> (String, Arc<MemoryStorage>) {
    let directory = HttpDirectory::new(account_service, Duration::from_secs(2))
        .expect("build account service client");
    spawn_with(
        move |_| Arc::new(directory),
        Some(account_service.to_string()),
    )
    .await
}

/// Start a minimal user service that answers `GET /users/{id}` with 200 for
/// each name in `users` and 404 otherwise. Returns its base URL.
pub async fn spawn_user_service(users: &[&str]) -> String {
    let known: Arc<HashSet<String>> = Arc::new(users.iter().map(|u| u.to_string()).collect());
    let router = Router::new()
        .route(
            "/users/{id}",
            get(
                |State(known): State<Arc<HashSet<String>>>, Path(id): Path<String>| async move {
                    if known.contains(&id) {
                        StatusCode::OK
                    } else {
                        StatusCode::NOT_FOUND
                    }
                },
            ),
        )
        .with_state(known);
    serve(router).await.0
}

/// A base URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    drop(listener);
    format!("http://{addr}")
}
