//! The relationship manager: follow lifecycle and privacy switching.
//!
//! Every directed pair (follower, target) is in one [`EdgeState`]:
//!
//! | From | Command | To |
//! |------|---------|----|
//! | `NONE` | request, target public | `FOLLOWING` |
//! | `NONE` | request, target private | `PENDING` |
//! | `PENDING` | accept, or target goes public | `FOLLOWING` |
//! | `PENDING` | reject | `NONE` |
//! | `FOLLOWING` | unfollow | `NONE` |
//!
//! # Locking
//!
//! The edge `A → B` and B's pending list are only written while B's lock is
//! held. Two-account commands take both locks (see [`locks`]); the privacy
//! switch takes only the owner's lock, which is enough to freeze its pending
//! list and every edge pointing at it.
//!
//! Account existence is resolved *before* locking, since it may cost a round
//! trip to the account service and accounts are never deleted by this
//! service.

mod error;
pub mod locks;

use std::sync::Arc;

use kinship_node_api::{Account, DrainFailure, EdgeState, PrivacyResponse};

use crate::directory::AccountDirectory;
use crate::storage::Storage;

pub use error::RelationError;
use locks::LockTable;

pub struct RelationshipManager {
    storage: Arc<dyn Storage>,
    directory: Arc<dyn AccountDirectory>,
    locks: LockTable,
}

impl RelationshipManager {
    pub fn new(storage: Arc<dyn Storage>, directory: Arc<dyn AccountDirectory>) -> Self {
        Self {
            storage,
            directory,
            locks: LockTable::new(),
        }
    }

    /// Confirm `username` exists and make sure a relationship record is
    /// present for it. `put_account` is insert-if-absent, so accounts that
    /// are already known keep their privacy flag.
    async fn resolve(&self, username: &str) -> Result<(), RelationError> {
        if !self.directory.exists(username).await? {
            return Err(RelationError::NotFound(username.to_string()));
        }
        if self.storage.put_account(username, false).await? {
            tracing::debug!("relations: created relationship record for {username}");
        }
        Ok(())
    }

    async fn resolve_pair(&self, a: &str, b: &str) -> Result<(), RelationError> {
        self.resolve(a).await?;
        if a != b {
            self.resolve(b).await?;
        }
        Ok(())
    }

    async fn privacy_of(&self, username: &str) -> Result<bool, RelationError> {
        self.storage
            .is_private(username)
            .await?
            .ok_or_else(|| RelationError::NotFound(username.to_string()))
    }

    // --- Follow lifecycle ----------------------------------------------------

    /// `requester` asks to follow `target`.
    ///
    /// Public targets are followed immediately; private targets get a
    /// pending request. Repeating the call returns the current state
    /// without duplicating anything.
    pub async fn request_follow(
        &self,
        requester: &str,
        target: &str,
    ) -> Result<EdgeState, RelationError> {
        if requester == target {
            return Err(RelationError::SelfFollow(requester.to_string()));
        }
        self.resolve_pair(requester, target).await?;
        let _guard = self.locks.lock_pair(requester, target).await;

        if self.storage.is_following(requester, target).await? {
            return Ok(EdgeState::Following);
        }
        if self.storage.has_request(requester, target).await? {
            return Ok(EdgeState::Pending);
        }

        if self.privacy_of(target).await? {
            self.storage.add_request(requester, target).await?;
            tracing::info!("relations: {requester} requested to follow {target}");
            Ok(EdgeState::Pending)
        } else {
            self.storage.add_follow(requester, target).await?;
            tracing::info!("relations: {requester} now follows {target}");
            Ok(EdgeState::Following)
        }
    }

    /// `follower` stops following `target`. A no-op if it was not following;
    /// any pending request between the two is left alone.
    pub async fn unfollow(&self, follower: &str, target: &str) -> Result<EdgeState, RelationError> {
        self.resolve_pair(follower, target).await?;
        let _guard = self.locks.lock_pair(follower, target).await;

        if self.storage.remove_follow(follower, target).await? {
            tracing::info!("relations: {follower} unfollowed {target}");
        }
        Ok(EdgeState::None)
    }

    /// `target` accepts the pending request from `requester`.
    pub async fn accept_request(
        &self,
        target: &str,
        requester: &str,
    ) -> Result<EdgeState, RelationError> {
        self.resolve_pair(target, requester).await?;
        let _guard = self.locks.lock_pair(target, requester).await;

        if !self.storage.accept_request(requester, target).await? {
            return Err(RelationError::NoSuchRequest {
                target: target.to_string(),
                requester: requester.to_string(),
            });
        }
        tracing::info!("relations: {target} accepted {requester}");
        Ok(EdgeState::Following)
    }

    /// `target` rejects the pending request from `requester`.
    pub async fn reject_request(
        &self,
        target: &str,
        requester: &str,
    ) -> Result<EdgeState, RelationError> {
        self.resolve_pair(target, requester).await?;
        let _guard = self.locks.lock_pair(target, requester).await;

        if !self.storage.remove_request(requester, target).await? {
            return Err(RelationError::NoSuchRequest {
                target: target.to_string(),
                requester: requester.to_string(),
            });
        }
        tracing::info!("relations: {target} rejected {requester}");
        Ok(EdgeState::None)
    }

    // --- Privacy -------------------------------------------------------------

    /// Switch `username` between private and public.
    ///
    /// Going public accepts every request that was pending when the switch
    /// happened. The backlog is drained while the account is still private
    /// and the flag flips afterwards, so readers never see a public account
    /// with a queue. Each acceptance stands alone: a store fault on one entry
    /// is logged, reported in `failed`, and the drain moves on. Requests that
    /// failed stay pending, and calling this again with `is_private = false`
    /// retries them even though the flag is already off.
    ///
    /// Going private leaves existing followers in place.
    pub async fn set_privacy(
        &self,
        username: &str,
        is_private: bool,
    ) -> Result<PrivacyResponse, RelationError> {
        self.resolve(username).await?;
        let _guard = self.locks.lock(username).await;

        let current = self.privacy_of(username).await?;
        // If this read fails nothing has changed.
        let backlog = if is_private {
            Vec::new()
        } else {
            self.storage.list_requests(username).await?
        };

        let mut drained = Vec::with_capacity(backlog.len());
        let mut failed = Vec::new();
        for requester in backlog {
            match self.storage.accept_request(&requester, username).await {
                Ok(true) => drained.push(requester),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("relations: draining {requester} into {username} failed: {e}");
                    failed.push(DrainFailure {
                        username: requester,
                        error: e.to_string(),
                    });
                }
            }
        }
        if !drained.is_empty() {
            tracing::info!(
                "relations: drained {} pending request(s) into {username}",
                drained.len()
            );
        }

        if current != is_private {
            self.storage.set_private(username, is_private).await?;
            let mode = if is_private { "private" } else { "public" };
            tracing::info!("relations: {username} is now {mode}");
        }

        let account = self.snapshot(username).await?;
        Ok(PrivacyResponse {
            account,
            drained,
            failed,
        })
    }

    // --- Queries -------------------------------------------------------------

    async fn snapshot(&self, username: &str) -> Result<Account, RelationError> {
        self.storage
            .get_account(username)
            .await?
            .ok_or_else(|| RelationError::NotFound(username.to_string()))
    }

    /// Consistent snapshot of an account's privacy flag and relationship lists.
    pub async fn profile(&self, username: &str) -> Result<Account, RelationError> {
        self.resolve(username).await?;
        self.snapshot(username).await
    }

    pub async fn list_following(&self, username: &str) -> Result<Vec<String>, RelationError> {
        self.resolve(username).await?;
        Ok(self.storage.list_following(username).await?)
    }

    pub async fn list_followers(&self, username: &str) -> Result<Vec<String>, RelationError> {
        self.resolve(username).await?;
        Ok(self.storage.list_followers(username).await?)
    }

    pub async fn list_pending_requests(&self, username: &str) -> Result<Vec<String>, RelationError> {
        self.resolve(username).await?;
        Ok(self.storage.list_requests(username).await?)
    }

    /// Current state of the edge `follower → target`.
    pub async fn edge_state(&self, follower: &str, target: &str) -> Result<EdgeState, RelationError> {
        self.resolve_pair(follower, target).await?;
        // Locked so an accept cannot slip between the two reads.
        let _guard = self.locks.lock_pair(follower, target).await;

        if self.storage.is_following(follower, target).await? {
            Ok(EdgeState::Following)
        } else if self.storage.has_request(follower, target).await? {
            Ok(EdgeState::Pending)
        } else {
            Ok(EdgeState::None)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
