//! End-to-end conformance tests for the Kinship node API.
//!
//! Each test spawns an ephemeral in-process node (real TCP, real HTTP) via
//! [`kinship_conformance::spawn_node`] and exercises the API surface with a
//! `reqwest` HTTP client.
//!
//! # Coverage
//!
//! | Test | Area |
//! |------|------|
//! | `health_returns_ok` | liveness |
//! | `register_and_fetch_profile` | accounts |
//! | `register_existing_returns_200` | accounts |
//! | `profile_unknown_returns_404` | accounts |
//! | `follow_public_is_immediate` | follow lifecycle |
//! | `follow_private_then_accept` | follow lifecycle |
//! | `follow_private_then_reject` | follow lifecycle |
//! | `follow_is_idempotent` | follow lifecycle |
//! | `self_follow_returns_422` | errors |
//! | `follow_unknown_returns_404` | errors |
//! | `stale_accept_returns_409` | errors |
//! | `unfollow_keeps_pending_requests` | follow lifecycle |
//! | `going_public_drains_requests` | privacy |
//! | `going_private_keeps_followers` | privacy |
//! | `relationship_endpoint` | queries |
//! | `remote_accounts_are_created_lazily` | account service |
//! | `remote_unknown_account_returns_404` | account service |
//! | `remote_register_is_forbidden` | account service |
//! | `account_service_down_returns_503` | account service |

use kinship_conformance::{
    dead_url, spawn_node, spawn_node_with_account_service, spawn_user_service,
};
use kinship_node::Storage;
use kinship_node_api::{Account, EdgeResponse, EdgeState, ErrorResponse, PrivacyResponse, UserListResponse};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap()
}

async fn command(
    client: &reqwest::Client,
    base: &str,
    actor: &str,
    verb: &str,
    other: &str,
) -> reqwest::Response {
    client
        .post(format!("{base}/users/{actor}/{verb}"))
        .json(&json!({ "username": other }))
        .send()
        .await
        .unwrap()
}

async fn edge(client: &reqwest::Client, base: &str, actor: &str, verb: &str, other: &str) -> EdgeState {
    let resp = command(client, base, actor, verb, other).await;
    assert_eq!(resp.status(), 200, "{actor} {verb} {other}");
    resp.json::<EdgeResponse>().await.unwrap().state
}

async fn list(client: &reqwest::Client, base: &str, user: &str, which: &str) -> Vec<String> {
    let resp = client
        .get(format!("{base}/users/{user}/{which}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json::<UserListResponse>().await.unwrap().items
}

async fn relationship(client: &reqwest::Client, base: &str, from: &str, to: &str) -> EdgeState {
    let resp = client
        .get(format!("{base}/users/{from}/relationship/{to}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json::<EdgeResponse>().await.unwrap().state
}

async fn set_privacy(client: &reqwest::Client, base: &str, user: &str, private: bool) -> PrivacyResponse {
    let resp = client
        .post(format!("{base}/users/{user}/privacy"))
        .json(&json!({ "is_private": private }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let (base, _) = spawn_node().await;
    let resp = make_client().get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_and_fetch_profile() {
    let (base, _) = spawn_node().await;
    let client = make_client();

    let resp = client
        .put(format!("{base}/users/alice"))
        .json(&json!({ "is_private": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let acct: Account = client
        .get(format!("{base}/users/alice"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(acct.username, "alice");
    assert!(acct.is_private);
    assert!(acct.following.is_empty());
    assert!(acct.followers.is_empty());
    assert!(acct.pending_requests.is_empty());
}

#[tokio::test]
async fn register_existing_returns_200() {
    let (base, storage) = spawn_node().await;
    storage.put_account("alice", false).await.unwrap();

    let resp = make_client()
        .put(format!("{base}/users/alice"))
        .json(&json!({ "is_private": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let acct: Account = resp.json().await.unwrap();
    assert!(!acct.is_private, "re-registering must not change privacy");
}

#[tokio::test]
async fn profile_unknown_returns_404() {
    let (base, _) = spawn_node().await;
    let resp = make_client().get(format!("{base}/users/nobody")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(err.code, "not_found");
}

// ---------------------------------------------------------------------------
// Follow lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn follow_public_is_immediate() {
    let (base, storage) = spawn_node().await;
    storage.put_account("alice", false).await.unwrap();
    storage.put_account("bob", false).await.unwrap();
    let client = make_client();

    assert_eq!(edge(&client, &base, "alice", "follow", "bob").await, EdgeState::Following);
    assert_eq!(list(&client, &base, "alice", "following").await, vec!["bob"]);
    assert_eq!(list(&client, &base, "bob", "followers").await, vec!["alice"]);
    assert!(list(&client, &base, "bob", "requests").await.is_empty());
}

#[tokio::test]
async fn follow_private_then_accept() {
    let (base, storage) = spawn_node().await;
    storage.put_account("alice", false).await.unwrap();
    storage.put_account("bob", true).await.unwrap();
    let client = make_client();

    assert_eq!(edge(&client, &base, "alice", "follow", "bob").await, EdgeState::Pending);
    assert_eq!(list(&client, &base, "bob", "requests").await, vec!["alice"]);
    assert!(list(&client, &base, "bob", "followers").await.is_empty());

    assert_eq!(edge(&client, &base, "bob", "accept", "alice").await, EdgeState::Following);
    assert!(list(&client, &base, "bob", "requests").await.is_empty());
    assert_eq!(list(&client, &base, "bob", "followers").await, vec!["alice"]);
    assert_eq!(list(&client, &base, "alice", "following").await, vec!["bob"]);
}

#[tokio::test]
async fn follow_private_then_reject() {
    let (base, storage) = spawn_node().await;
    storage.put_account("alice", false).await.unwrap();
    storage.put_account("bob", true).await.unwrap();
    let client = make_client();

    edge(&client, &base, "alice", "follow", "bob").await;
    assert_eq!(edge(&client, &base, "bob", "reject", "alice").await, EdgeState::None);
    assert!(list(&client, &base, "bob", "requests").await.is_empty());
    assert!(list(&client, &base, "alice", "following").await.is_empty());

    // A rejected requester may ask again.
    assert_eq!(edge(&client, &base, "alice", "follow", "bob").await, EdgeState::Pending);
}

#[tokio::test]
async fn follow_is_idempotent() {
    let (base, storage) = spawn_node().await;
    for (name, private) in [("alice", false), ("bob", false), ("carol", true)] {
        storage.put_account(name, private).await.unwrap();
    }
    let client = make_client();

    for _ in 0..3 {
        assert_eq!(edge(&client, &base, "alice", "follow", "bob").await, EdgeState::Following);
        assert_eq!(edge(&client, &base, "alice", "follow", "carol").await, EdgeState::Pending);
    }
    assert_eq!(list(&client, &base, "bob", "followers").await, vec!["alice"]);
    assert_eq!(list(&client, &base, "carol", "requests").await, vec!["alice"]);
}

#[tokio::test]
async fn self_follow_returns_422() {
    let (base, storage) = spawn_node().await;
    storage.put_account("alice", false).await.unwrap();

    let resp = command(&make_client(), &base, "alice", "follow", "alice").await;
    assert_eq!(resp.status(), 422);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(err.code, "self_follow");
}

#[tokio::test]
async fn follow_unknown_returns_404() {
    let (base, storage) = spawn_node().await;
    storage.put_account("alice", false).await.unwrap();
    let client = make_client();

    let resp = command(&client, &base, "alice", "follow", "ghost").await;
    assert_eq!(resp.status(), 404);
    let resp = command(&client, &base, "ghost", "follow", "alice").await;
    assert_eq!(resp.status(), 404);
    assert!(list(&client, &base, "alice", "followers").await.is_empty());
}

#[tokio::test]
async fn stale_accept_returns_409() {
    let (base, storage) = spawn_node().await;
    storage.put_account("alice", false).await.unwrap();
    storage.put_account("bob", true).await.unwrap();
    let client = make_client();

    let resp = command(&client, &base, "bob", "accept", "alice").await;
    assert_eq!(resp.status(), 409);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(err.code, "no_such_request");
    assert!(!err.is_retryable());

    let resp = command(&client, &base, "bob", "reject", "alice").await;
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn unfollow_keeps_pending_requests() {
    let (base, storage) = spawn_node().await;
    storage.put_account("alice", false).await.unwrap();
    storage.put_account("bob", true).await.unwrap();
    let client = make_client();

    edge(&client, &base, "alice", "follow", "bob").await;
    assert_eq!(edge(&client, &base, "alice", "unfollow", "bob").await, EdgeState::None);
    assert_eq!(list(&client, &base, "bob", "requests").await, vec!["alice"]);
}

// ---------------------------------------------------------------------------
// Privacy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn going_public_drains_requests() {
    let (base, storage) = spawn_node().await;
    for (name, private) in [("alice", false), ("bob", false), ("carol", true)] {
        storage.put_account(name, private).await.unwrap();
    }
    let client = make_client();

    edge(&client, &base, "bob", "follow", "carol").await;
    edge(&client, &base, "alice", "follow", "carol").await;

    let resp = set_privacy(&client, &base, "carol", false).await;
    assert!(!resp.account.is_private);
    assert_eq!(resp.drained, vec!["bob", "alice"]);
    assert!(resp.account.pending_requests.is_empty());
    assert_eq!(list(&client, &base, "carol", "followers").await, vec!["bob", "alice"]);

    // New follows on a public account are immediate.
    storage.put_account("dave", false).await.unwrap();
    assert_eq!(edge(&client, &base, "dave", "follow", "carol").await, EdgeState::Following);
}

#[tokio::test]
async fn going_private_keeps_followers() {
    let (base, storage) = spawn_node().await;
    for (name, private) in [("alice", false), ("bob", false), ("carol", false)] {
        storage.put_account(name, private).await.unwrap();
    }
    let client = make_client();

    edge(&client, &base, "alice", "follow", "carol").await;
    let resp = set_privacy(&client, &base, "carol", true).await;
    assert!(resp.account.is_private);
    assert_eq!(resp.account.followers, vec!["alice"]);

    assert_eq!(edge(&client, &base, "bob", "follow", "carol").await, EdgeState::Pending);
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relationship_endpoint() {
    let (base, storage) = spawn_node().await;
    storage.put_account("alice", false).await.unwrap();
    storage.put_account("bob", true).await.unwrap();
    let client = make_client();

    assert_eq!(relationship(&client, &base, "alice", "bob").await, EdgeState::None);
    edge(&client, &base, "alice", "follow", "bob").await;
    assert_eq!(relationship(&client, &base, "alice", "bob").await, EdgeState::Pending);
    edge(&client, &base, "bob", "accept", "alice").await;
    assert_eq!(relationship(&client, &base, "alice", "bob").await, EdgeState::Following);

    // Direction matters.
    assert_eq!(relationship(&client, &base, "bob", "alice").await, EdgeState::None);
}

// ---------------------------------------------------------------------------
// External account service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remote_accounts_are_created_lazily() {
    let users = spawn_user_service(&["alice", "bob"]).await;
    let (base, storage) = spawn_node_with_account_service(&users).await;
    let client = make_client();

    assert!(storage.is_private("alice").await.unwrap().is_none());
    assert_eq!(edge(&client, &base, "alice", "follow", "bob").await, EdgeState::Following);
    assert_eq!(storage.is_private("alice").await.unwrap(), Some(false));
    assert_eq!(list(&client, &base, "bob", "followers").await, vec!["alice"]);
}

#[tokio::test]
async fn remote_unknown_account_returns_404() {
    let users = spawn_user_service(&["alice"]).await;
    let (base, storage) = spawn_node_with_account_service(&users).await;

    let resp = command(&make_client(), &base, "alice", "follow", "mallory").await;
    assert_eq!(resp.status(), 404);
    assert!(storage.is_private("mallory").await.unwrap().is_none());
}

#[tokio::test]
async fn remote_register_is_forbidden() {
    let users = spawn_user_service(&[]).await;
    let (base, _) = spawn_node_with_account_service(&users).await;

    let resp = make_client()
        .put(format!("{base}/users/alice"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn account_service_down_returns_503() {
    let users = dead_url().await;
    let (base, storage) = spawn_node_with_account_service(&users).await;

    let resp = command(&make_client(), &base, "alice", "follow", "bob").await;
    assert_eq!(resp.status(), 503);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(err.code, "store_unavailable");
    assert!(err.is_retryable());
    assert!(storage.is_private("alice").await.unwrap().is_none());
}
