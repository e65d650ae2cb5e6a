use thiserror::Error;
use tripsplit_domain::{BillValidationError, GroupEditError};

/// Failure reported by a [`crate::GroupStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// The change is kept in memory; call `GroupSession::save` to retry.
    #[error("failed to persist group: {0}")]
    Store(#[from] StoreError),
    #[error("stored group is not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("failed to serialize group: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("settlement #{index} does not exist (plan has {len})")]
    SettlementOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Edit(#[from] GroupEditError),
    #[error(transparent)]
    Validation(#[from] BillValidationError),
}
