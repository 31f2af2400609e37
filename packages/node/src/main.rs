//! `kinship-node` — follow-relationship and privacy service.
//!
//! # Quick start
//!
//! ```sh
//! # In-memory node on the default port, accounts registered via PUT /users/{id}:
//! kinship-node
//!
//! # Persistent SQLite node:
//! KINSHIP_DB=./kinship.db kinship-node
//!
//! # Defer account existence to an external user service:
//! KINSHIP_ACCOUNT_SERVICE=http://users.internal:8080 kinship-node
//! ```
//!
//! # Environment variables
//!
//! See [`NodeConfig`] for the full list.

use std::sync::Arc;
use std::time::Duration;

use kinship_node::{
    build_router, AccountDirectory, HttpDirectory, LocalDirectory, MemoryStorage, NodeConfig,
    SqliteStorage, Storage,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kinship_node=info,tower_http=debug".into()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = NodeConfig::from_env()?;

    let storage: Arc<dyn Storage> = match &config.db_path {
        Some(path) => {
            tracing::info!("storage: SQLite at {path}");
            let db = SqliteStorage::open(path)
                .map_err(|e| format!("failed to open SQLite database at {path}: {e}"))?;
            Arc::new(db)
        }
        None => {
            tracing::info!("storage: in-memory (data will not survive restart)");
            Arc::new(MemoryStorage::new())
        }
    };

    let directory: Arc<dyn AccountDirectory> = match &config.account_service {
        Some(url) => {
            tracing::info!(
                "accounts: external service at {url} (timeout = {}s)",
                config.account_timeout_secs
            );
            let timeout = Duration::from_secs(config.account_timeout_secs);
            Arc::new(HttpDirectory::new(url, timeout)?)
        }
        None => {
            tracing::info!("accounts: registered locally");
            Arc::new(LocalDirectory::new(Arc::clone(&storage)))
        }
    };

    let app = build_router(storage, directory, config.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", config.bind_addr))?;
    tracing::info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
