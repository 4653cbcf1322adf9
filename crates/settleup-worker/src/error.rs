//! Errors raised by the worker's collaborators.

use settleup_types::SettleError;

/// Errors that can occur in an object store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object key: {0:?}")]
    InvalidKey(String),

    #[error("Store I/O error: {0}")]
    Io(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in a job queue.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Unknown receipt handle: {0}")]
    UnknownReceipt(String),

    #[error("Invalid receipt handle: {0:?}")]
    InvalidReceipt(String),

    #[error("Queue I/O error: {0}")]
    Io(String),
}

pub type QueueResult<T> = Result<T, QueueError>;

/// Why a single job failed.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Settle(#[from] SettleError),

    #[error("Invalid job message: {0}")]
    InvalidMessage(String),
}
