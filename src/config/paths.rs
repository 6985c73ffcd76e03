//! Path management for EduCenter
//!
//! ## Path Resolution Order
//!
//! 1. `EDUCENTER_DATA_DIR` environment variable (if set)
//! 2. The platform data directory reported by `directories`
//!    (e.g. `~/.local/share/educenter` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::EduError;

/// Manages all paths used by EduCenter
#[derive(Debug, Clone)]
pub struct EduPaths {
    /// Base directory for all EduCenter data
    base_dir: PathBuf,
}

impl EduPaths {
    /// Create a new EduPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no platform data directory can be determined.
    pub fn new() -> Result<Self, EduError> {
        let base_dir = if let Ok(custom) = std::env::var("EDUCENTER_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create EduPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding one JSON document per storage key
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Directory for backup files and CSV exports
    pub fn exports_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), EduError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| EduError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| EduError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.exports_dir())
            .map_err(|e| EduError::Io(format!("Failed to create exports directory: {}", e)))?;

        Ok(())
    }

    /// Check if EduCenter has been initialized (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, EduError> {
    ProjectDirs::from("", "", "educenter")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| EduError::Config("Could not determine a data directory".into()))
}
