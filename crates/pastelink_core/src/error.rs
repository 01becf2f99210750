//! Application error types for core storage and domain logic.
use crate::share_id::ShareId;
use thiserror::Error;

/// Public fields of the paste holding a contested share id.
///
/// `title` is `None` when the id was retired by a deletion: the id stays
/// reserved forever but no longer has a visible owner row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareIdConflict {
    pub share_id: ShareId,
    pub title: Option<String>,
}

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] redb::Error),

    #[error("Storage unavailable: {0}")]
    UnavailableMessage(String),

    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Validation failed for {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Paste not found")]
    NotFound,

    #[error("Not authorized to access this paste")]
    Forbidden,

    #[error("This paste has expired")]
    Expired,

    #[error("Share id '{}' is already taken", .0.share_id)]
    IdentifierConflict(ShareIdConflict),

    #[error("Could not allocate a free share id after {attempts} attempts")]
    AllocatorExhausted { attempts: u32 },
}

impl AppError {
    /// Shorthand for a field-level validation error.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Whether a retry with backoff could succeed.
    ///
    /// Domain errors (validation, ownership, expiry, conflicts) are final;
    /// only storage-availability failures are transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::UnavailableMessage(_))
    }
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Unavailable(value.into())
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Unavailable(value.into())
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::Unavailable(value.into())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::Unavailable(value.into())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::Unavailable(value.into())
    }
}
