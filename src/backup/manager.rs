//! Backup creation, restore and the auto-backup trigger
//!
//! These operations live on `DataStore` itself: a backup is a snapshot of the
//! store, and restoring one replaces the store's contents wholesale.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{EduError, EduResult};
use crate::storage::collections::BACKUP_HISTORY_KEY;
use crate::storage::record::generate_id;
use crate::storage::{Collection, DataStore, StoreState};

use super::history::{Backup, BackupKind};

/// Result of a restore operation
#[derive(Debug, Clone)]
pub struct RestoreResult {
    /// Id of the backup that was restored
    pub backup_id: String,
    /// Date the backup was created
    pub backup_date: DateTime<Utc>,
    /// Collections taken from the backup
    pub restored: Vec<Collection>,
    /// Collections the backup lacked, reset to their defaults
    pub defaulted: Vec<Collection>,
}

impl RestoreResult {
    /// Whether the backup carried every collection
    pub fn all_restored(&self) -> bool {
        self.defaulted.is_empty()
    }

    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        let restored: Vec<_> = self.restored.iter().map(Collection::name).collect();
        let mut summary = format!("Restored: {}", restored.join(", "));
        if !self.defaulted.is_empty() {
            let defaulted: Vec<_> = self.defaulted.iter().map(Collection::name).collect();
            summary.push_str(&format!("\nReset to defaults: {}", defaulted.join(", ")));
        }
        summary
    }
}

impl DataStore {
    /// Backups held in history, most recent first
    pub fn backups(&self) -> &[Backup] {
        self.history.entries()
    }

    pub fn backup(&self, id: &str) -> Option<&Backup> {
        self.history.get(id)
    }

    fn new_backup(&self, kind: BackupKind) -> Backup {
        Backup {
            id: generate_id(),
            date: self.now(),
            kind,
            data: self.snapshot(),
        }
    }

    /// Snapshot the store into history right away
    ///
    /// If the history cannot be written the previous history is put back
    /// (including any entry the new one evicted) and the error returned, so
    /// memory and storage keep agreeing.
    pub fn create_manual_backup(&mut self) -> EduResult<Backup> {
        let backup = self.new_backup(BackupKind::Manual);
        let previous = self.history.entries().to_vec();
        let evicted = self.history.push(backup.clone());

        let json = serde_json::to_string(self.history.entries())?;
        if let Err(err) = self.write_key(BACKUP_HISTORY_KEY, json, "BackupManager.createManualBackup") {
            self.history.replace(previous);
            return Err(err);
        }

        info!(id = %backup.id, evicted = evicted.len(), "Created manual backup");
        Ok(backup)
    }

    /// Snapshot the store into history; failures are logged and swallowed
    pub fn create_auto_backup(&mut self) -> Option<Backup> {
        let backup = self.new_backup(BackupKind::Auto);
        let previous = self.history.entries().to_vec();
        self.history.push(backup.clone());

        match self.persist_history() {
            Ok(()) => {
                info!(id = %backup.id, "Created auto backup");
                Some(backup)
            }
            Err(e) => {
                self.history.replace(previous);
                warn!("Auto backup failed: {}", e);
                None
            }
        }
    }

    /// Run the auto-backup if its quiet period has elapsed
    ///
    /// Call this from the event loop; it is cheap when nothing is pending.
    pub fn tick(&mut self) -> Option<Backup> {
        let now = self.now();
        if !self.scheduler.take_due(now) {
            return None;
        }
        if !self.auto_backup_enabled() {
            return None;
        }
        self.create_auto_backup()
    }

    /// Run a pending auto-backup now instead of waiting out the delay
    ///
    /// For callers that are about to stop ticking, such as a process exiting.
    pub fn flush_auto_backup(&mut self) -> Option<Backup> {
        if !self.scheduler.is_pending() {
            return None;
        }
        self.scheduler.cancel();
        if !self.auto_backup_enabled() {
            return None;
        }
        self.create_auto_backup()
    }

    /// When the pending auto-backup will run, if one is armed
    pub fn auto_backup_due_at(&self) -> Option<DateTime<Utc>> {
        self.scheduler.due_at()
    }

    /// Replace the whole store with a backup's contents and persist it
    ///
    /// Destructive: anything not in the backup is gone afterwards. Callers
    /// confirm with the user first.
    pub fn restore_from_backup(&mut self, backup: &Backup) -> EduResult<RestoreResult> {
        const CONTEXT: &str = "BackupManager.restoreFromBackup";
        if self.state() != StoreState::Loaded {
            let err = EduError::NotLoaded;
            self.handler.handle(&err, CONTEXT);
            return Err(err);
        }

        let defaulted = self.replace_contents(&backup.data);
        let restored = Collection::ALL
            .into_iter()
            .filter(|c| !defaulted.contains(c))
            .collect();

        self.save_all()?;

        info!(id = %backup.id, "Restored backup");
        Ok(RestoreResult {
            backup_id: backup.id.clone(),
            backup_date: backup.date,
            restored,
            defaulted,
        })
    }

    /// Restore a backup held in history
    pub fn restore_from_history(&mut self, id: &str) -> EduResult<RestoreResult> {
        let Some(backup) = self.history.get(id).cloned() else {
            let err = EduError::backup_not_found(id);
            self.handler.handle(&err, "BackupManager.restoreFromHistory");
            return Err(err);
        };
        self.restore_from_backup(&backup)
    }

    /// Drop one backup from history
    pub fn delete_backup(&mut self, id: &str) -> EduResult<Backup> {
        let Some(removed) = self.history.remove(id) else {
            let err = EduError::backup_not_found(id);
            self.handler.handle(&err, "BackupManager.deleteBackup");
            return Err(err);
        };

        if let Err(err) = self.persist_history() {
            let mut entries = self.history.entries().to_vec();
            entries.push(removed);
            self.history.replace(entries);
            self.handler.handle(&err, "BackupManager.deleteBackup");
            return Err(err);
        }
        Ok(removed)
    }
}
