//! Backup system for EduCenter
//!
//! Snapshots of the whole store are kept in a bounded history persisted
//! alongside the data, and can be exported to (or imported from) a standalone
//! JSON file.
//!
//! # Architecture
//!
//! - `SnapshotData`: a copy of every collection plus center and bank info
//! - `BackupHistory`: the newest-first list of `Backup`s, capped at a maximum
//! - `AutoBackupScheduler`: the debounce that turns a burst of writes into
//!   one automatic backup
//! - `BackupFile`: the portable export format
//!
//! Creating and restoring backups are methods on
//! [`DataStore`](crate::storage::DataStore).
//!
//! # Example
//!
//! ```rust,ignore
//! use educenter::storage::{DataStore, MemoryKeyValueStore};
//!
//! let mut store = DataStore::new(MemoryKeyValueStore::new());
//! store.load_all();
//!
//! let backup = store.create_manual_backup()?;
//! // ... later
//! let result = store.restore_from_history(&backup.id)?;
//! println!("{}", result.summary());
//! ```

mod file;
mod history;
mod manager;
mod scheduler;
mod snapshot;

pub use file::{BackupFile, ImportResult, EXPORTED_COLLECTIONS};
pub use history::{Backup, BackupHistory, BackupKind};
pub use manager::RestoreResult;
pub use scheduler::{AutoBackupScheduler, CancellationToken};
pub use snapshot::SnapshotData;
