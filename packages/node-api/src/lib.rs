//! Request and response types for the Kinship relationship API.
//!
//! Shared by the node, the `kin` command-line client and the conformance
//! suite so that all three agree on the wire format.
//!
//! # Endpoints covered
//!
//! | Method | Path | Type |
//! |--------|------|------|
//! | GET | `/users/{id}` | → [`Account`] |
//! | PUT | `/users/{id}` | [`RegisterRequest`] → [`Account`] |
//! | POST | `/users/{id}/follow` | [`UsernameBody`] → [`EdgeResponse`] |
//! | POST | `/users/{id}/unfollow` | [`UsernameBody`] → [`EdgeResponse`] |
//! | POST | `/users/{id}/accept` | [`UsernameBody`] → [`EdgeResponse`] |
//! | POST | `/users/{id}/reject` | [`UsernameBody`] → [`EdgeResponse`] |
//! | POST | `/users/{id}/privacy` | [`PrivacyRequest`] → [`PrivacyResponse`] |
//! | GET | `/users/{id}/following` | → [`UserListResponse`] |
//! | GET | `/users/{id}/followers` | → [`UserListResponse`] |
//! | GET | `/users/{id}/requests` | → [`UserListResponse`] |
//! | GET | `/users/{id}/relationship/{target}` | → [`EdgeResponse`] |

pub mod account;
pub mod error;
pub mod follow;

pub use account::{Account, DrainFailure, PrivacyRequest, PrivacyResponse, RegisterRequest};
pub use error::ErrorResponse;
pub use follow::{EdgeResponse, EdgeState, UserListResponse, UsernameBody};
