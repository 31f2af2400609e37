//! Account existence lookups.
//!
//! Accounts are owned by an account store that sits outside this service.
//! The relationship manager only asks it one question, "does this username
//! exist?", through the [`AccountDirectory`] trait.
//!
//! | Type | Source of truth |
//! |------|-----------------|
//! | [`LocalDirectory`] | The `accounts` table of the node's own [`Storage`] |
//! | [`HttpDirectory`] | A remote user service, `GET {base}/users/{username}` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::storage::{Storage, StorageError};

/// Answers whether an account exists.
#[async_trait]
pub trait AccountDirectory: Send + Sync + 'static {
    /// `Ok(false)` for an unknown account; `Err(StorageError::Unavailable)`
    /// when the account store cannot be asked right now.
    async fn exists(&self, username: &str) -> Result<bool, StorageError>;
}

// ---------------------------------------------------------------------------
// LocalDirectory
// ---------------------------------------------------------------------------

/// Treats every account registered in the node's storage as existing.
pub struct LocalDirectory {
    storage: Arc<dyn Storage>,
}

impl LocalDirectory {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl AccountDirectory for LocalDirectory {
    async fn exists(&self, username: &str) -> Result<bool, StorageError> {
        Ok(self.storage.is_private(username).await?.is_some())
    }
}

// ---------------------------------------------------------------------------
// HttpDirectory
// ---------------------------------------------------------------------------

/// Looks accounts up on the external user service.
///
/// `200` means the account exists, `404` means it does not. Any other status
/// and any transport failure are reported as [`StorageError::Unavailable`]
/// so the caller can retry.
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectory {
    /// Build a directory for the service at `base_url` (no trailing slash
    /// needed) with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn account_url(&self, username: &str) -> String {
        format!("{}/users/{}", self.base_url, urlencoding::encode(username))
    }
}

#[async_trait]
impl AccountDirectory for HttpDirectory {
    async fn exists(&self, username: &str) -> Result<bool, StorageError> {
        let url = self.account_url(username);
        let resp = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("account service: GET {url} failed: {e}");
            StorageError::Unavailable(format!("account service unreachable: {e}"))
        })?;

        match resp.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => {
                tracing::warn!("account service: GET {url} returned {s}");
                Err(StorageError::Unavailable(format!(
                    "account service returned {s}"
                )))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, Router};

    /// Stub user service: `alice` and `o'brien x` exist, `flaky` errors,
    /// everyone else is unknown.
    async fn spawn_user_service() -> String {
        async fn lookup(Path(name): Path<String>) -> AxumStatus {
            match name.as_str() {
                "alice" | "o'brien x" => AxumStatus::OK,
                "flaky" => AxumStatus::BAD_GATEWAY,
                _ => AxumStatus::NOT_FOUND,
            }
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/users/{name}", get(lookup));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn local_directory_follows_storage() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put_account("alice", false).await.unwrap();
        let dir = LocalDirectory::new(storage);

        assert!(dir.exists("alice").await.unwrap());
        assert!(!dir.exists("Alice").await.unwrap(), "usernames are case-sensitive");
    }

    #[tokio::test]
    async fn http_directory_maps_statuses() {
        let base = spawn_user_service().await;
        let dir = HttpDirectory::new(&format!("{base}/"), Duration::from_secs(5)).unwrap();

        assert!(dir.exists("alice").await.unwrap());
        assert!(dir.exists("o'brien x").await.unwrap(), "names must be percent-encoded");
        assert!(!dir.exists("bob").await.unwrap());

        let err = dir.exists("flaky").await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[tokio::test]
    async fn http_directory_unreachable_is_unavailable() {
        // Bind and drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = HttpDirectory::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let err = dir.exists("alice").await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
