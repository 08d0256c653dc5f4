//! Error types for the map and the memoizer.

/// Errors surfaced by [`ExpiringMap`](crate::ExpiringMap) and
/// [`Memoizer`](crate::Memoizer).
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The key is absent, or was present but had already expired.
    #[error("key not found")]
    KeyNotFound,

    #[error("invalid ttl configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to serialize memoized arguments: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
