//! Custom error types for EduCenter
//!
//! Every store operation returns an `EduResult`; the store additionally routes
//! failures to an [`ErrorHandler`](crate::storage::ErrorHandler) so the
//! surrounding application can decide how to present them.

use thiserror::Error;

/// The main error type for EduCenter operations
#[derive(Error, Debug)]
pub enum EduError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for caller-supplied data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A collection name outside the known set
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// A setting key outside the known set
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// The key-value backend ran out of room
    #[error("Storage quota exceeded while writing '{key}': need {needed} bytes, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: u64,
        limit: u64,
    },

    /// An entity cannot be removed while other records still point at it
    #[error("{entity_type} '{identifier}' is still referenced by {count} registration(s)")]
    InUse {
        entity_type: &'static str,
        identifier: String,
        count: usize,
    },

    /// A mutation was attempted before `load_all` or after `clear_all`
    #[error("Data store is not loaded")]
    NotLoaded,

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Backup errors
    #[error("Backup error: {0}")]
    Backup(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl EduError {
    /// Create a "not found" error for a record in a collection
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Record",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for a backup
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a storage capacity error
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for EduError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EduError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for EduError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for EduCenter operations
pub type EduResult<T> = Result<T, EduError>;
