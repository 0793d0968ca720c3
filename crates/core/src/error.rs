//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Not-found conditions are usually signalled with `Option` at the service
/// boundary; `NotFound` exists for operations where an absent collaborator
/// (e.g. the product behind a cart line) has to abort a mutation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A value failed validation (e.g. missing required field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found.
    #[error("not found")]
    NotFound,

    /// A cart mutation asked for more units than the product has in stock.
    #[error("insufficient stock: available {available}, in cart {in_cart}")]
    InsufficientStock { available: u32, in_cart: u32 },

    /// The backing store failed (I/O, serialization, poisoned lock).
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_stock(available: u32, in_cart: u32) -> Self {
        Self::InsufficientStock { available, in_cart }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
