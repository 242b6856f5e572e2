//! Storage errors.

/// A store operation failed.
///
/// The swallowing accessors collapse every variant into `None`/`false`; the
/// cause is only visible through the `try_` accessors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The host store could not be reached at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The host store refused the write because it is full.
    #[error("storage quota exceeded writing {key:?}")]
    QuotaExceeded { key: String },

    /// The value could not be encoded as JSON.
    #[error("failed to encode value for {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The stored text could not be decoded into the requested type.
    #[error("failed to decode stored value for {key:?}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Any other failure reported by the host store.
    #[error("host storage error: {0}")]
    Host(String),
}

/// Result alias for store operations.
pub type StorageResult<T> = Result<T, StorageError>;
