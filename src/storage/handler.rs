//! Centralized error handling
//!
//! The store never hands a failure back silently: every failed public
//! operation is passed to an `ErrorHandler` before the `Err` is returned.
//! Storage exhaustion gets its own hook, which receives a full snapshot so the
//! handler can save it somewhere before anything is lost.

use tracing::error;

use crate::backup::SnapshotData;
use crate::error::EduError;

/// Decides how store failures reach the user
pub trait ErrorHandler {
    /// A failed operation; `context` names the operation (e.g. `DataStore.update`)
    fn handle(&self, error: &EduError, context: &str);

    /// The backend refused a write because it is full
    fn handle_storage_full(&self, error: &EduError, snapshot: &SnapshotData);
}

/// Handler that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, err: &EduError, context: &str) {
        error!("[{}] {}", context, err);
    }

    fn handle_storage_full(&self, err: &EduError, snapshot: &SnapshotData) {
        error!(
            records = snapshot.record_count(),
            "Storage is full, export a backup file before making further changes: {}", err
        );
    }
}

/// User-facing message for an error, in the style of a notification toast
pub fn user_message(err: &EduError) -> String {
    match err {
        EduError::QuotaExceeded { .. } => {
            "Storage is full! Delete some data or export a backup.".to_string()
        }
        EduError::NotFound { entity_type, .. } => format!("{} not found", entity_type),
        EduError::UnknownCollection(name) => format!("Collection \"{}\" does not exist", name),
        other => other.to_string(),
    }
}
