use crate::storage::StorageError;

/// Errors reported by [`RelationshipManager`](super::RelationshipManager).
///
/// None of these are retried internally. Only [`StoreUnavailable`] is
/// transient; the rest mean the caller's view of the graph is wrong.
///
/// [`StoreUnavailable`]: RelationError::StoreUnavailable
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RelationError {
    #[error("account {0} not found")]
    NotFound(String),

    #[error("{0} cannot follow itself")]
    SelfFollow(String),

    #[error("{target} has no pending follow request from {requester}")]
    NoSuchRequest { target: String, requester: String },

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal storage error: {0}")]
    Internal(String),
}

impl From<StorageError> for RelationError {
    fn from(e: StorageError) -> Self {
        match e {
            // Storage only says NotFound for account-level writes, and the
            // manager has already resolved the username by then.
            StorageError::NotFound => RelationError::Internal("account vanished".into()),
            StorageError::Unavailable(msg) => RelationError::StoreUnavailable(msg),
            StorageError::Internal(msg) => RelationError::Internal(msg),
        }
    }
}
