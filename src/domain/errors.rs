use thiserror::Error;

/// Failures reported by the catalog store and the order engine.
///
/// Every variant except `Internal` is an expected business outcome and is
/// recovered at the operation boundary; callers branch on the variant, not
/// on the message text.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not enough stock for product {product}. Available: {available}")]
    InsufficientStock { product: String, available: i32 },

    #[error("Invalid status '{0}'")]
    InvalidStatus(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
