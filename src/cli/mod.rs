//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the store and services.

pub mod backup;
pub mod export;
pub mod records;
pub mod settings;

pub use backup::{handle_backup_command, BackupCommands};
pub use export::{handle_export_command, ExportCommands};
pub use records::{handle_record_command, parse_assignment, RecordCommands};
pub use settings::{handle_setting_command, SettingCommands};

use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, error};

use crate::backup::{BackupFile, SnapshotData};
use crate::storage::collections::DATA_VERSION;
use crate::storage::{user_message, ErrorHandler};
use crate::error::EduError;

/// Error handler for the command line
///
/// Ordinary failures are returned to `main`, which prints them, so they are
/// only logged here. When storage fills up the current data is written to an
/// emergency backup file in the exports directory.
#[derive(Debug, Clone)]
pub struct CliErrorHandler {
    exports_dir: PathBuf,
}

impl CliErrorHandler {
    pub fn new(exports_dir: PathBuf) -> Self {
        Self { exports_dir }
    }

    /// Where the emergency backup for a failure at `now` goes
    pub fn emergency_path(&self, now: chrono::DateTime<Utc>) -> PathBuf {
        self.exports_dir.join(format!(
            "educenter-emergency-{}.json",
            now.format("%Y%m%d-%H%M%S")
        ))
    }
}

impl ErrorHandler for CliErrorHandler {
    fn handle(&self, err: &EduError, context: &str) {
        debug!("[{}] {}", context, err);
    }

    fn handle_storage_full(&self, err: &EduError, snapshot: &SnapshotData) {
        error!("{}", err);
        eprintln!("{}", user_message(err));

        let now = Utc::now();
        let file = BackupFile {
            export_date: now,
            version: DATA_VERSION.to_string(),
            data: snapshot.clone(),
        };
        let path = self.emergency_path(now);
        match file.write_to(&path) {
            Ok(()) => eprintln!("Your data was saved to {}", path.display()),
            Err(e) => error!("Could not write emergency backup: {}", e),
        }
    }
}
