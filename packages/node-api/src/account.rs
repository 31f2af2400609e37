//! Account types: `GET/PUT /users/{id}` and `POST /users/{id}/privacy`.
//!
//! An account is identified by its case-sensitive `username`. Besides the
//! privacy flag it carries three relationship sets; `following` and
//! `followers` are two views of the same directed edges, `pending_requests`
//! holds requests waiting for the owner's decision.

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of an account's relationship state.
///
/// # Example
///
/// ```json
/// {
///   "username": "alice",
///   "is_private": true,
///   "following": ["bob"],
///   "followers": [],
///   "pending_requests": ["carol"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Unique, immutable key.
    pub username: String,

    /// Whether incoming follow requests need the owner's approval.
    pub is_private: bool,

    /// Accounts this account follows, in the order the edges were created.
    #[serde(default)]
    pub following: Vec<String>,

    /// Accounts following this account, in the order the edges were created.
    #[serde(default)]
    pub followers: Vec<String>,

    /// Accounts waiting for approval, oldest request first.
    #[serde(default)]
    pub pending_requests: Vec<String>,
}

impl Account {
    /// A freshly registered account with no relationships.
    pub fn new(username: impl Into<String>, is_private: bool) -> Self {
        Self {
            username: username.into(),
            is_private,
            following: vec![],
            followers: vec![],
            pending_requests: vec![],
        }
    }
}

/// Request body for `PUT /users/{id}`, which registers an account.
///
/// Registration belongs to the account store; the relationship service only
/// exposes it when it is running with its local account store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RegisterRequest {
    /// Initial privacy mode. Defaults to public.
    #[serde(default)]
    pub is_private: bool,
}

/// Request body for `POST /users/{id}/privacy`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrivacyRequest {
    pub is_private: bool,
}

/// A pending request that could not be accepted while draining the backlog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrainFailure {
    /// The requester whose request is still pending.
    pub username: String,

    /// Why the acceptance failed.
    pub error: String,
}

/// Response body for `POST /users/{id}/privacy`.
///
/// When an account switches from private to public every pending request is
/// accepted. `drained` lists the requesters that became followers; `failed`
/// lists the ones whose acceptance hit a store fault. Retrying the same
/// switch drains whatever is left.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrivacyResponse {
    pub account: Account,

    #[serde(default)]
    pub drained: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<DrainFailure>,
}
