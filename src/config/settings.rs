//! User settings for EduCenter
//!
//! Backup retention, the auto-backup quiet period, the storage quota applied
//! to the key-value backend, and the default log level.

use serde::{Deserialize, Serialize};

use super::paths::EduPaths;
use crate::error::EduError;

/// Default storage quota, matching the 5 MiB browsers give local storage
pub const DEFAULT_STORAGE_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// User settings for EduCenter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// How many backups the history keeps before evicting the oldest
    #[serde(default = "default_max_backup_history")]
    pub max_backup_history: usize,

    /// Quiet period after the last write before an auto-backup fires
    #[serde(default = "default_auto_backup_delay_secs")]
    pub auto_backup_delay_secs: u64,

    /// Byte limit for the key-value backend (`None` means unlimited)
    #[serde(default = "default_storage_quota")]
    pub storage_quota_bytes: Option<u64>,

    /// Log level used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_max_backup_history() -> usize {
    10
}

fn default_auto_backup_delay_secs() -> u64 {
    5
}

fn default_storage_quota() -> Option<u64> {
    Some(DEFAULT_STORAGE_QUOTA_BYTES)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            max_backup_history: default_max_backup_history(),
            auto_backup_delay_secs: default_auto_backup_delay_secs(),
            storage_quota_bytes: default_storage_quota(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Auto-backup quiet period as a chrono duration
    pub fn auto_backup_delay(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.auto_backup_delay_secs as i64)
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &EduPaths) -> Result<Self, EduError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| EduError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| EduError::Config(format!("Failed to parse settings file: {}", e)))?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &EduPaths) -> Result<(), EduError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| EduError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| EduError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
