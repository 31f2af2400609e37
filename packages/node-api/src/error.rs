//! Standard error response body.

use serde::{Deserialize, Serialize};

/// The JSON body returned for all error responses.
///
/// ```json
/// { "error": "alice has no pending request from bob", "code": "no_such_request" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable description of the problem.
    pub error: String,

    /// Machine-readable error code.
    ///
    /// | `code` | HTTP status |
    /// |--------|------------|
    /// | `invalid_parameter` | 400 |
    /// | `forbidden` | 403 |
    /// | `not_found` | 404 |
    /// | `no_such_request` | 409 |
    /// | `self_follow` | 422 |
    /// | `internal_error` | 500 |
    /// | `store_unavailable` | 503 |
    pub code: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }

    /// `true` when the failure is transient and the request may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code == codes::STORE_UNAVAILABLE
    }
}

/// Well-known error codes.
pub mod codes {
    pub const INVALID_PARAMETER: &str = "invalid_parameter";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const NO_SUCH_REQUEST: &str = "no_such_request";
    pub const SELF_FOLLOW: &str = "self_follow";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const STORE_UNAVAILABLE: &str = "store_unavailable";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_shape() {
        let e = ErrorResponse::new(codes::SELF_FOLLOW, "alice cannot follow itself");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["code"], "self_follow");
        assert_eq!(v["error"], "alice cannot follow itself");
    }

    #[test]
    fn only_store_faults_are_retryable() {
        assert!(ErrorResponse::new(codes::STORE_UNAVAILABLE, "down").is_retryable());
        assert!(!ErrorResponse::new(codes::NO_SUCH_REQUEST, "stale").is_retryable());
    }
}
