//! Commerce error types.

use stockroom_db::DbError;
use thiserror::Error;

/// Errors that can occur in catalog, cart and audit operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but has been soft-deleted.
    #[error("Product is no longer available: {0}")]
    ProductUnavailable(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Cart line not found for this user.
    #[error("Item not in cart: {0}")]
    CartItemNotFound(String),

    /// Insufficient inventory.
    #[error("Insufficient inventory for {product_id}: requested {requested}, available {available}")]
    InsufficientInventory {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Storage error.
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CommerceError {
    /// Whether the error is caused by the request rather than the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            CommerceError::DatabaseError(_) | CommerceError::SerializationError(_)
        )
    }

    /// Whether the error means the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommerceError::ProductNotFound(_)
                | CommerceError::CategoryNotFound(_)
                | CommerceError::CartItemNotFound(_)
        )
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

/// Result alias for commerce operations.
pub type Result<T> = std::result::Result<T, CommerceError>;
