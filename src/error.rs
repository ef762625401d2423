//! Error types returned by the countdown store.

/// Failure of a store operation. Prior state is left intact in every case.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No countdown with this id.
    #[error("countdown {0} not found")]
    NotFound(String),

    /// The request itself was malformed (e.g. a reorder that is not a permutation).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The database could not be read or written.
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// Convenience result type.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
