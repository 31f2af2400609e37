//! In-memory storage implementation.
//!
//! All data is held in RAM behind a [`RwLock`] and is lost when the process
//! exits. Use this for tests, the conformance suite, and ephemeral nodes.
//!
//! Follow edges and pending requests are keyed by `(from, to)` and carry a
//! sequence number taken from a shared counter; lists are sorted by that
//! number so they come back in insertion order.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use kinship_node_api::Account;

use super::{Storage, StorageError};

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

type Edge = (String, String);

#[derive(Default)]
struct Inner {
    /// username → is_private
    accounts: HashMap<String, bool>,
    /// (follower, followee) → sequence number
    follows: HashMap<Edge, u64>,
    /// (requester, target) → sequence number
    requests: HashMap<Edge, u64>,
    next_seq: u64,
}

impl Inner {
    fn seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn insert_follow(&mut self, follower: &str, followee: &str) -> bool {
        let key = (follower.to_string(), followee.to_string());
        if self.follows.contains_key(&key) {
            return false;
        }
        let seq = self.seq();
        self.follows.insert(key, seq);
        true
    }

    fn collect(edges: &HashMap<Edge, u64>, pick: impl Fn(&Edge) -> Option<&String>) -> Vec<String> {
        let mut hits: Vec<(u64, &String)> = edges
            .iter()
            .filter_map(|(edge, seq)| pick(edge).map(|name| (*seq, name)))
            .collect();
        hits.sort_unstable_by_key(|(seq, _)| *seq);
        hits.into_iter().map(|(_, name)| name.clone()).collect()
    }

    fn following(&self, username: &str) -> Vec<String> {
        Self::collect(&self.follows, |(from, to)| (from == username).then_some(to))
    }

    fn followers(&self, username: &str) -> Vec<String> {
        Self::collect(&self.follows, |(from, to)| (to == username).then_some(from))
    }

    fn requests(&self, target: &str) -> Vec<String> {
        Self::collect(&self.requests, |(from, to)| (to == target).then_some(from))
    }
}

fn key(a: &str, b: &str) -> Edge {
    (a.to_string(), b.to_string())
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// Thread-safe, in-memory implementation of [`Storage`].
///
/// Every trait method holds the lock for its whole body, so each call is
/// observed atomically by concurrent readers.
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    // A poisoned lock only means another thread panicked mid-call; every
    // write below is a single map operation, so the data is still coherent.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Storage impl
// ---------------------------------------------------------------------------

#[async_trait]
impl Storage for MemoryStorage {
    // --- Accounts ------------------------------------------------------------

    async fn put_account(&self, username: &str, is_private: bool) -> Result<bool, StorageError> {
        let mut inner = self.write();
        if inner.accounts.contains_key(username) {
            return Ok(false);
        }
        inner.accounts.insert(username.to_string(), is_private);
        Ok(true)
    }

    async fn get_account(&self, username: &str) -> Result<Option<Account>, StorageError> {
        let inner = self.read();
        let Some(&is_private) = inner.accounts.get(username) else {
            return Ok(None);
        };
        Ok(Some(Account {
            username: username.to_string(),
            is_private,
            following: inner.following(username),
            followers: inner.followers(username),
            pending_requests: inner.requests(username),
        }))
    }

    async fn is_private(&self, username: &str) -> Result<Option<bool>, StorageError> {
        Ok(self.read().accounts.get(username).copied())
    }

    async fn set_private(&self, username: &str, is_private: bool) -> Result<(), StorageError> {
        let mut inner = self.write();
        let flag = inner
            .accounts
            .get_mut(username)
            .ok_or(StorageError::NotFound)?;
        *flag = is_private;
        Ok(())
    }

    // --- Follows -------------------------------------------------------------

    async fn add_follow(&self, follower: &str, followee: &str) -> Result<bool, StorageError> {
        Ok(self.write().insert_follow(follower, followee))
    }

    async fn remove_follow(&self, follower: &str, followee: &str) -> Result<bool, StorageError> {
        Ok(self.write().follows.remove(&key(follower, followee)).is_some())
    }

    async fn is_following(&self, follower: &str, followee: &str) -> Result<bool, StorageError> {
        Ok(self.read().follows.contains_key(&key(follower, followee)))
    }

    async fn list_following(&self, username: &str) -> Result<Vec<String>, StorageError> {
        Ok(self.read().following(username))
    }

    async fn list_followers(&self, username: &str) -> Result<Vec<String>, StorageError> {
        Ok(self.read().followers(username))
    }

    // --- Pending requests ----------------------------------------------------

    async fn add_request(&self, requester: &str, target: &str) -> Result<bool, StorageError> {
        let mut inner = self.write();
        let k = key(requester, target);
        if inner.requests.contains_key(&k) {
            return Ok(false);
        }
        let seq = inner.seq();
        inner.requests.insert(k, seq);
        Ok(true)
    }

    async fn remove_request(&self, requester: &str, target: &str) -> Result<bool, StorageError> {
        Ok(self.write().requests.remove(&key(requester, target)).is_some())
    }

    async fn has_request(&self, requester: &str, target: &str) -> Result<bool, StorageError> {
        Ok(self.read().requests.contains_key(&key(requester, target)))
    }

    async fn accept_request(&self, requester: &str, target: &str) -> Result<bool, StorageError> {
        let mut inner = self.write();
        if inner.requests.remove(&key(requester, target)).is_none() {
            return Ok(false);
        }
        inner.insert_follow(requester, target);
        Ok(true)
    }

    async fn list_requests(&self, target: &str) -> Result<Vec<String>, StorageError> {
        Ok(self.read().requests(target))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
