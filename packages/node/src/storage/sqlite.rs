//! SQLite-backed storage implementation.
//!
//! Uses `rusqlite` (with bundled SQLite) wrapped in an `Arc<Mutex<Connection>>`
//! to satisfy the `Send + Sync` requirements. All blocking calls are offloaded
//! to a thread-pool via `tokio::task::spawn_blocking`.
//!
//! # Schema
//!
//! - `accounts` — username and privacy flag.
//! - `follows` — (follower, followee) edges.
//! - `follow_requests` — (requester, target) pending requests.
//!
//! Lists are ordered by `rowid`; `INSERT OR IGNORE` keeps the original row,
//! so a duplicate insert never changes an entry's position.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kinship_node_api::Account;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::{Storage, StorageError};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    username   TEXT PRIMARY KEY,
    is_private INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS follows (
    follower TEXT NOT NULL,
    followee TEXT NOT NULL,
    PRIMARY KEY (follower, followee)
);
CREATE INDEX IF NOT EXISTS idx_follows_followee ON follows(followee);

CREATE TABLE IF NOT EXISTS follow_requests (
    requester TEXT NOT NULL,
    target    TEXT NOT NULL,
    PRIMARY KEY (requester, target)
);
CREATE INDEX IF NOT EXISTS idx_follow_requests_target ON follow_requests(target);
";

// ---------------------------------------------------------------------------
// SqliteStorage
// ---------------------------------------------------------------------------

/// SQLite-backed implementation of [`Storage`].
///
/// Holds a single database connection protected by a `Mutex`. All operations
/// run inside `spawn_blocking` to avoid blocking the async runtime.
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) the SQLite database at `path` and apply the schema.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database (data is lost when dropped).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking thread-pool.
    async fn run<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| StorageError::Internal("connection mutex poisoned".into()))?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| StorageError::Internal(format!("task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// Error conversions
// ---------------------------------------------------------------------------

/// Busy/locked databases and unopenable files are transient; everything
/// else is a bug or corruption.
fn map_err(e: rusqlite::Error) -> StorageError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen) => {
            StorageError::Unavailable(e.to_string())
        }
        _ => StorageError::Internal(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Query helpers (run with the connection already locked)
// ---------------------------------------------------------------------------

fn query_names(conn: &Connection, sql: &str, key: &str) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(map_err)?;
    let names = stmt
        .query_map(params![key], |row| row.get::<_, String>(0))
        .map_err(map_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_err)?;
    Ok(names)
}

fn following(conn: &Connection, username: &str) -> Result<Vec<String>, StorageError> {
    query_names(
        conn,
        "SELECT followee FROM follows WHERE follower = ?1 ORDER BY rowid",
        username,
    )
}

fn followers(conn: &Connection, username: &str) -> Result<Vec<String>, StorageError> {
    query_names(
        conn,
        "SELECT follower FROM follows WHERE followee = ?1 ORDER BY rowid",
        username,
    )
}

fn requests(conn: &Connection, target: &str) -> Result<Vec<String>, StorageError> {
    query_names(
        conn,
        "SELECT requester FROM follow_requests WHERE target = ?1 ORDER BY rowid",
        target,
    )
}

fn privacy_flag(conn: &Connection, username: &str) -> Result<Option<bool>, StorageError> {
    conn.query_row(
        "SELECT is_private FROM accounts WHERE username = ?1",
        params![username],
        |row| row.get::<_, bool>(0),
    )
    .optional()
    .map_err(map_err)
}

fn edge_exists(conn: &Connection, sql: &str, a: &str, b: &str) -> Result<bool, StorageError> {
    conn.query_row(sql, params![a, b], |_| Ok(()))
        .optional()
        .map(|row| row.is_some())
        .map_err(map_err)
}

// ---------------------------------------------------------------------------
// Storage impl
// ---------------------------------------------------------------------------

#[async_trait]
impl Storage for SqliteStorage {
    // --- Accounts ------------------------------------------------------------

    async fn put_account(&self, username: &str, is_private: bool) -> Result<bool, StorageError> {
        let username = username.to_string();
        self.run(move |conn| {
            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO accounts (username, is_private) VALUES (?1, ?2)",
                    params![username, is_private],
                )
                .map_err(map_err)?;
            Ok(inserted > 0)
        })
        .await
    }

    async fn get_account(&self, username: &str) -> Result<Option<Account>, StorageError> {
        let username = username.to_string();
        self.run(move |conn| {
            // One read transaction so the flag and the three lists agree.
            let tx = conn.transaction().map_err(map_err)?;
            let Some(is_private) = privacy_flag(&tx, &username)? else {
                return Ok(None);
            };
            let account = Account {
                following: following(&tx, &username)?,
                followers: followers(&tx, &username)?,
                pending_requests: requests(&tx, &username)?,
                username,
                is_private,
            };
            tx.commit().map_err(map_err)?;
            Ok(Some(account))
        })
        .await
    }

    async fn is_private(&self, username: &str) -> Result<Option<bool>, StorageError> {
        let username = username.to_string();
        self.run(move |conn| privacy_flag(conn, &username)).await
    }

    async fn set_private(&self, username: &str, is_private: bool) -> Result<(), StorageError> {
        let username = username.to_string();
        self.run(move |conn| {
            let updated = conn
                .execute(
                    "UPDATE accounts SET is_private = ?2 WHERE username = ?1",
                    params![username, is_private],
                )
                .map_err(map_err)?;
            if updated == 0 {
                return Err(StorageError::NotFound);
            }
            Ok(())
        })
        .await
    }

    // --- Follows -------------------------------------------------------------

    async fn add_follow(&self, follower: &str, followee: &str) -> Result<bool, StorageError> {
        let follower = follower.to_string();
        let followee = followee.to_string();
        self.run(move |conn| {
            let n = conn
                .execute(
                    "INSERT OR IGNORE INTO follows (follower, followee) VALUES (?1, ?2)",
                    params![follower, followee],
                )
                .map_err(map_err)?;
            Ok(n > 0)
        })
        .await
    }

    async fn remove_follow(&self, follower: &str, followee: &str) -> Result<bool, StorageError> {
        let follower = follower.to_string();
        let followee = followee.to_string();
        self.run(move |conn| {
            let n = conn
                .execute(
                    "DELETE FROM follows WHERE follower = ?1 AND followee = ?2",
                    params![follower, followee],
                )
                .map_err(map_err)?;
            Ok(n > 0)
        })
        .await
    }

    async fn is_following(&self, follower: &str, followee: &str) -> Result<bool, StorageError> {
        let follower = follower.to_string();
        let followee = followee.to_string();
        self.run(move |conn| {
            edge_exists(
                conn,
                "SELECT 1 FROM follows WHERE follower = ?1 AND followee = ?2",
                &follower,
                &followee,
            )
        })
        .await
    }

    async fn list_following(&self, username: &str) -> Result<Vec<String>, StorageError> {
        let username = username.to_string();
        self.run(move |conn| following(conn, &username)).await
    }

    async fn list_followers(&self, username: &str) -> Result<Vec<String>, StorageError> {
        let username = username.to_string();
        self.run(move |conn| followers(conn, &username)).await
    }

    // --- Pending requests ----------------------------------------------------

    async fn add_request(&self, requester: &str, target: &str) -> Result<bool, StorageError> {
        let requester = requester.to_string();
        let target = target.to_string();
        self.run(move |conn| {
            let n = conn
                .execute(
                    "INSERT OR IGNORE INTO follow_requests (requester, target) VALUES (?1, ?2)",
                    params![requester, target],
                )
                .map_err(map_err)?;
            Ok(n > 0)
        })
        .await
    }

    async fn remove_request(&self, requester: &str, target: &str) -> Result<bool, StorageError> {
        let requester = requester.to_string();
        let target = target.to_string();
        self.run(move |conn| {
            let n = conn
                .execute(
                    "DELETE FROM follow_requests WHERE requester = ?1 AND target = ?2",
                    params![requester, target],
                )
                .map_err(map_err)?;
            Ok(n > 0)
        })
        .await
    }

    async fn has_request(&self, requester: &str, target: &str) -> Result<bool, StorageError> {
        let requester = requester.to_string();
        let target = target.to_string();
        self.run(move |conn| {
            edge_exists(
                conn,
                "SELECT 1 FROM follow_requests WHERE requester = ?1 AND target = ?2",
                &requester,
                &target,
            )
        })
        .await
    }

    async fn accept_request(&self, requester: &str, target: &str) -> Result<bool, StorageError> {
        let requester = requester.to_string();
        let target = target.to_string();
        self.run(move |conn| {
            let tx = conn.transaction().map_err(map_err)?;
            let removed = tx
                .execute(
                    "DELETE FROM follow_requests WHERE requester = ?1 AND target = ?2",
                    params![requester, target],
                )
                .map_err(map_err)?;
            if removed == 0 {
                // Dropping `tx` rolls back; nothing was written anyway.
                return Ok(false);
            }
            tx.execute(
                "INSERT OR IGNORE INTO follows (follower, followee) VALUES (?1, ?2)",
                params![requester, target],
            )
            .map_err(map_err)?;
            tx.commit().map_err(map_err)?;
            Ok(true)
        })
        .await
    }

    async fn list_requests(&self, target: &str) -> Result<Vec<String>, StorageError> {
        let target = target.to_string();
        self.run(move |conn| requests(conn, &target)).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
