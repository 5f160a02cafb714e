//! Error types for remote sinks.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Ways a remote append can fail. None of them touch the local ledger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// Credentials are missing or were refused.
    #[error("remote sheet unauthorized: {0}")]
    Unauthorized(String),

    /// The remote did not answer in time.
    #[error("remote sheet timed out")]
    Timeout,

    /// The remote could not be reached.
    #[error("remote sheet unreachable: {0}")]
    Network(String),

    /// The remote answered with an error status.
    #[error("remote sheet rejected the row (HTTP {status})")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },

    /// The background worker is gone.
    #[error("sync worker has stopped")]
    WorkerStopped,
}
