//! Follow-graph types: `POST /users/{id}/{follow,unfollow,accept,reject}`
//! and the list endpoints.
//!
//! Every directed pair of accounts (follower, target) is in exactly one
//! [`EdgeState`] at a time. Following a public account moves the pair
//! straight to `FOLLOWING`; following a private account parks it in
//! `PENDING` until the target accepts or rejects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State of a directed relationship from one account to another.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeState {
    /// No relationship and no outstanding request.
    None,
    /// A follow request is waiting for the target's decision.
    Pending,
    /// Confirmed: the follower follows the target.
    Following,
}

impl fmt::Display for EdgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeState::None => "NONE",
            EdgeState::Pending => "PENDING",
            EdgeState::Following => "FOLLOWING",
        };
        f.write_str(s)
    }
}

/// Request body shared by the follow, unfollow, accept and reject endpoints.
///
/// For follow/unfollow `username` is the account being (un)followed; for
/// accept/reject it is the requester whose pending request is decided.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsernameBody {
    pub username: String,
}

impl UsernameBody {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Result of a follow-graph command: the pair and its state afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeResponse {
    /// The account on the requesting side of the edge.
    pub follower: String,

    /// The account being followed.
    pub target: String,

    pub state: EdgeState,
}

/// A list of usernames, in insertion order.
///
/// Returned by `GET /users/{id}/following`, `/followers` and `/requests`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserListResponse {
    pub items: Vec<String>,
}
