//! Storage abstraction layer for the relationship service.
//!
//! The [`Storage`] trait defines the contract between the relationship
//! manager and persistence. Every method is a single atomic step; the
//! decision of *which* step to take (auto-follow or queue, accept or report
//! a stale request) lives in [`crate::relations`], and storage never
//! enforces the follow state machine on its own.
//!
//! A follow is stored as one directed edge `(follower, followee)`. An
//! account's `following` and `followers` lists are both read from that
//! edge set, so the two views can never disagree.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryStorage`] | Tests, conformance suite, ephemeral nodes |
//! | [`SqliteStorage`] | Production; durable single-file database |
//!
//! [`MemoryStorage`]: memory::MemoryStorage
//! [`SqliteStorage`]: sqlite::SqliteStorage

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use kinship_node_api::Account;

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Errors that storage operations can return.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// The referenced account does not exist.
    #[error("not found")]
    NotFound,

    /// The backing store could not be reached or is busy. Safe to retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An unexpected error in the underlying storage backend.
    #[error("internal storage error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// The persistence contract for relationship state.
///
/// All methods are `async` and return `Result<_, StorageError>`. Implementations
/// must be `Send + Sync + 'static` so they can be held in an `Arc<dyn Storage>`.
///
/// Lists are returned in insertion order: the order in which the edge or
/// request was first stored. Re-inserting an existing entry keeps its place.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    // --- Accounts ------------------------------------------------------------

    /// Create an account record if none exists. Returns `true` if it was
    /// created, `false` if the username was already present (the stored
    /// privacy flag is left untouched in that case).
    async fn put_account(&self, username: &str, is_private: bool) -> Result<bool, StorageError>;

    /// Return a consistent snapshot of an account and all three of its
    /// relationship lists, or `None` if the account is unknown.
    async fn get_account(&self, username: &str) -> Result<Option<Account>, StorageError>;

    /// Return the privacy flag, or `None` if the account is unknown.
    async fn is_private(&self, username: &str) -> Result<Option<bool>, StorageError>;

    /// Overwrite the privacy flag. Returns [`StorageError::NotFound`] if the
    /// account is unknown.
    async fn set_private(&self, username: &str, is_private: bool) -> Result<(), StorageError>;

    // --- Follows -------------------------------------------------------------

    /// Record that `follower` follows `followee`. Returns `true` if the edge
    /// was new.
    async fn add_follow(&self, follower: &str, followee: &str) -> Result<bool, StorageError>;

    /// Remove a follow edge. Returns `true` if it existed.
    async fn remove_follow(&self, follower: &str, followee: &str) -> Result<bool, StorageError>;

    /// Return `true` if `follower` follows `followee`.
    async fn is_following(&self, follower: &str, followee: &str) -> Result<bool, StorageError>;

    /// Accounts that `username` follows.
    async fn list_following(&self, username: &str) -> Result<Vec<String>, StorageError>;

    /// Accounts that follow `username`.
    async fn list_followers(&self, username: &str) -> Result<Vec<String>, StorageError>;

    // --- Pending requests ----------------------------------------------------

    /// Queue a follow request from `requester` to `target`. Returns `true`
    /// if the request was new.
    async fn add_request(&self, requester: &str, target: &str) -> Result<bool, StorageError>;

    /// Drop a pending request. Returns `true` if it existed.
    async fn remove_request(&self, requester: &str, target: &str) -> Result<bool, StorageError>;

    /// Return `true` if `requester` has a pending request to `target`.
    async fn has_request(&self, requester: &str, target: &str) -> Result<bool, StorageError>;

    /// Atomically remove the pending request and create the follow edge.
    ///
    /// Returns `false` (and changes nothing) when no such request exists.
    async fn accept_request(&self, requester: &str, target: &str) -> Result<bool, StorageError>;

    /// Requesters waiting on `target`, oldest first.
    async fn list_requests(&self, target: &str) -> Result<Vec<String>, StorageError>;
}
