//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Password did not match.
    #[error("Invalid password")]
    InvalidCredentials,

    /// No user with that name or id.
    #[error("User not found: {0}")]
    UnknownUser(String),

    /// Username already taken.
    #[error("Username already exists: {0}")]
    DuplicateUser(String),

    /// Password too weak.
    #[error("{0}")]
    WeakPassword(String),

    /// Form input rejected.
    #[error("{0}")]
    Validation(String),

    /// An admin tried to delete their own account.
    #[error("You cannot delete your own account")]
    CannotDeleteSelf,

    /// Insufficient permissions.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// Storage error.
    #[error("Database error: {0}")]
    Db(#[from] stockroom_db::DbError),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(#[from] stockroom_cache::CacheError),

    /// Password hashing failed.
    #[error("Password hashing error: {0}")]
    Hash(String),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials | AuthError::UnknownUser(_))
    }

    /// Check if this is a permission error.
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            AuthError::InsufficientPermissions | AuthError::CannotDeleteSelf
        )
    }

    /// Whether the error is caused by the request rather than the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AuthError::Db(_) | AuthError::Cache(_) | AuthError::Hash(_)
        )
    }
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;
