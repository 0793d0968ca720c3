use thiserror::Error;

use mercado_core::DomainError;

/// Storage-layer error.
///
/// Malformed on-disk state is *not* represented here: a snapshot that fails
/// to parse is auto-repaired at open (treated as an empty collection).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("collection lock poisoned")]
    Poisoned,
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::storage(err.to_string())
    }
}
