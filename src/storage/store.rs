//! The collection store
//!
//! `DataStore` holds every collection in memory, mirrors each one to a
//! key-value backend on every write, and owns the backup history and the
//! auto-backup scheduler. It is an ordinary value: the application builds one
//! and hands it (or a `DataModule` wrapping it) to whatever needs data, and
//! tests build as many isolated instances as they like.
//!
//! Write policy: memory is the truth for the session. When a persist fails
//! (most often because the backend is full) the in-memory change is kept,
//! the collection is listed in [`DataStore::unsaved_collections`], and the
//! failure goes to the [`ErrorHandler`].
//!
//! The store is referentially blind. Deleting a record never touches records
//! in other collections that mention its id; callers check for dependents
//! first when that matters.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backup::{AutoBackupScheduler, Backup, BackupHistory, SnapshotData};
use crate::clock::{Clock, SystemClock};
use crate::config::{EduPaths, Settings};
use crate::error::{EduError, EduResult};

use super::collections::{
    Collection, SettingKey, BACKUP_HISTORY_KEY, DATA_VERSION, DATA_VERSION_KEY,
};
use super::handler::{ErrorHandler, LogErrorHandler};
use super::kv::{FileKeyValueStore, KeyValueStore};
use super::migration::{migrate, needs_migration, MigrationReport};
use super::record::{generate_id, Record, SyncStatus, FIELD_CREATED_AT, FIELD_ID};

/// Lifecycle of a store instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Built but `load_all` not yet called
    Uninitialized,
    /// Collections loaded; mutations allowed
    Loaded,
    /// Wiped by `clear_all`; reload before mutating again
    Cleared,
}

/// Outcome of `load_all`
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Keys that were absent or unreadable and fell back to their default
    pub defaulted: Vec<String>,
    /// Set when the migration step changed anything
    pub migration: Option<MigrationReport>,
}

impl LoadReport {
    /// Every key was present and parsed
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty()
    }
}

/// In-memory collections mirrored to a key-value backend
pub struct DataStore {
    pub(crate) backend: Box<dyn KeyValueStore>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) handler: Box<dyn ErrorHandler>,
    pub(crate) collections: BTreeMap<Collection, Vec<Record>>,
    pub(crate) settings: BTreeMap<SettingKey, Value>,
    pub(crate) history: BackupHistory,
    pub(crate) scheduler: AutoBackupScheduler,
    unsaved: BTreeSet<Collection>,
    state: StoreState,
}

impl DataStore {
    /// Default number of backups kept
    pub const DEFAULT_BACKUP_LIMIT: usize = 10;

    /// Default auto-backup quiet period
    pub const DEFAULT_AUTO_BACKUP_DELAY_SECS: i64 = 5;

    /// Create a store over `backend` with the system clock and a logging
    /// error handler
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            clock: Box::new(SystemClock),
            handler: Box::new(LogErrorHandler),
            collections: BTreeMap::new(),
            settings: BTreeMap::new(),
            history: BackupHistory::new(Self::DEFAULT_BACKUP_LIMIT),
            scheduler: AutoBackupScheduler::new(Duration::seconds(
                Self::DEFAULT_AUTO_BACKUP_DELAY_SECS,
            )),
            unsaved: BTreeSet::new(),
            state: StoreState::Uninitialized,
        }
    }

    /// Create a file-backed store configured from user settings
    pub fn open(paths: &EduPaths, settings: &Settings) -> EduResult<Self> {
        paths.ensure_directories()?;
        let backend = FileKeyValueStore::new(paths.data_dir(), settings.storage_quota_bytes);

        Ok(Self::new(backend)
            .with_backup_limit(settings.max_backup_history)
            .with_auto_backup_delay(settings.auto_backup_delay()))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    pub fn with_backup_limit(mut self, max_entries: usize) -> Self {
        self.history = BackupHistory::new(max_entries);
        self
    }

    pub fn with_auto_backup_delay(mut self, delay: Duration) -> Self {
        self.scheduler = AutoBackupScheduler::new(delay);
        self
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Collections whose in-memory contents were not written successfully
    pub fn unsaved_collections(&self) -> Vec<Collection> {
        self.unsaved.iter().copied().collect()
    }

    /// Load every collection and setting from the backend
    ///
    /// Missing or malformed keys fall back to their defaults; nothing here
    /// fails. The migration step runs on every load, so older-schema records
    /// brought in by a restore or import are upgraded too. The data version
    /// marker is written when missing or older.
    pub fn load_all(&mut self) -> LoadReport {
        let now = self.now();
        let mut report = LoadReport::default();

        for collection in Collection::ALL {
            let records = match self.load_key::<Vec<Record>>(collection.storage_key()) {
                Some(records) => records,
                None => {
                    report.defaulted.push(collection.storage_key().to_string());
                    collection.default_records(now)
                }
            };
            self.collections.insert(collection, records);
        }

        for key in SettingKey::ALL {
            let value = match self.load_key::<Value>(key.storage_key()) {
                Some(value) => value,
                None => {
                    report.defaulted.push(key.storage_key().to_string());
                    key.default_value()
                }
            };
            self.settings.insert(key, value);
        }

        let history = self
            .load_key::<Vec<Backup>>(BACKUP_HISTORY_KEY)
            .unwrap_or_default();
        self.history.replace(history);

        self.unsaved.clear();
        self.state = StoreState::Loaded;

        let migration = self.run_migration();
        if migration.changed() {
            report.migration = Some(migration);
        }
        let version = self.load_key::<String>(DATA_VERSION_KEY);
        if needs_migration(version.as_deref()) {
            self.mark_data_version();
        }
        // Writes made while loading are not edits
        self.scheduler.cancel();

        info!(
            collections = Collection::ALL.len(),
            defaulted = report.defaulted.len(),
            "Loaded all data"
        );
        report
    }

    /// Read and parse one key; `None` when absent or unreadable
    fn load_key<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Could not parse {}: {}", key, e);
                None
            }
        }
    }

    /// Apply the migration step to the loaded collections and persist the
    /// two collections it touches when anything changed
    pub fn run_migration(&mut self) -> MigrationReport {
        let mut students = self.collections.remove(&Collection::Students).unwrap_or_default();
        let registrations = self
            .collections
            .entry(Collection::Registrations)
            .or_default();

        let report = migrate(&mut students, registrations);
        self.collections.insert(Collection::Students, students);

        if report.changed() {
            let _ = self.save_collection(Collection::Students);
            let _ = self.save_collection(Collection::Registrations);
            info!(
                students = report.students_updated,
                registrations = report.registrations_flattened,
                "Migration completed"
            );
        }
        report
    }

    fn mark_data_version(&mut self) {
        let json = Value::String(DATA_VERSION.to_string()).to_string();
        let _ = self.write_key(DATA_VERSION_KEY, json, "DataStore.loadAll");
    }

    /// Write one serialized value; successful writes re-arm the auto-backup
    /// timer (except the backup history itself)
    pub(crate) fn store_key(&mut self, key: &str, json: String) -> EduResult<()> {
        self.backend.set(key, &json)?;
        debug!(key, bytes = json.len(), "Persisted");

        if key != BACKUP_HISTORY_KEY && self.auto_backup_enabled() {
            let now = self.now();
            self.scheduler.schedule(now);
        }
        Ok(())
    }

    /// `store_key` plus routing of failures to the error handler
    pub(crate) fn write_key(&mut self, key: &str, json: String, context: &str) -> EduResult<()> {
        match self.store_key(key, json) {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.is_quota_exceeded() {
                    let snapshot = self.snapshot();
                    self.handler.handle_storage_full(&err, &snapshot);
                } else {
                    self.handler.handle(&err, context);
                }
                Err(err)
            }
        }
    }

    /// Persist one collection as it currently is in memory
    pub fn save_collection(&mut self, collection: Collection) -> EduResult<()> {
        let json = serde_json::to_string(self.records(collection))?;
        match self.write_key(collection.storage_key(), json, "DataStore.saveCollection") {
            Ok(()) => {
                self.unsaved.remove(&collection);
                Ok(())
            }
            Err(err) => {
                self.unsaved.insert(collection);
                Err(err)
            }
        }
    }

    fn save_setting(&mut self, key: SettingKey) -> EduResult<()> {
        let json = serde_json::to_string(self.setting(key))?;
        self.write_key(key.storage_key(), json, "DataStore.set")
    }

    /// Persist every collection plus center and bank info
    ///
    /// Keeps going after a failure; returns the first error.
    pub fn save_all(&mut self) -> EduResult<()> {
        let mut first_error = None;

        for collection in Collection::ALL {
            if let Err(e) = self.save_collection(collection) {
                first_error.get_or_insert(e);
            }
        }
        for key in [SettingKey::CenterInfo, SettingKey::BankInfo] {
            if let Err(e) = self.save_setting(key) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub(crate) fn persist_history(&mut self) -> EduResult<()> {
        let json = serde_json::to_string(self.history.entries())?;
        self.store_key(BACKUP_HISTORY_KEY, json)
    }

    fn fail<T>(&self, err: EduError, context: &str) -> EduResult<T> {
        self.handler.handle(&err, context);
        Err(err)
    }

    fn require_loaded(&self, context: &str) -> EduResult<()> {
        match self.state {
            StoreState::Loaded => Ok(()),
            _ => self.fail(EduError::NotLoaded, context),
        }
    }

    /// Add a record, stamping id, timestamps and `syncStatus = pending`
    ///
    /// A non-empty `id` in `partial` is kept when it is not already taken;
    /// otherwise a fresh one is generated.
    pub fn create(&mut self, collection: Collection, partial: Record) -> EduResult<Record> {
        const CONTEXT: &str = "DataStore.create";
        self.require_loaded(CONTEXT)?;

        let mut record = partial;
        let id = match record.id().map(str::to_string) {
            Some(id) if self.exists(collection, &id) => {
                return self.fail(
                    EduError::Duplicate {
                        entity_type: "Record",
                        identifier: id,
                    },
                    CONTEXT,
                );
            }
            Some(id) => id,
            None => self.fresh_id(collection),
        };

        let now = self.now();
        record.set_id(id);
        record.set_created_at(now);
        record.set_updated_at(now);
        record.set_sync_status(SyncStatus::Pending);

        self.collections
            .entry(collection)
            .or_default()
            .push(record.clone());

        // Memory keeps the record even if the write fails
        let _ = self.save_collection(collection);
        Ok(record)
    }

    fn fresh_id(&self, collection: Collection) -> String {
        loop {
            let id = generate_id();
            if !self.exists(collection, &id) {
                return id;
            }
        }
    }

    /// Look a record up by id
    pub fn read(&self, collection: Collection, id: &str) -> Option<&Record> {
        self.records(collection).iter().find(|r| r.id() == Some(id))
    }

    /// Merge `updates` into an existing record
    ///
    /// `id` and `createdAt` in `updates` are ignored. `updatedAt` always
    /// moves strictly forward, even if the clock has not.
    pub fn update(&mut self, collection: Collection, id: &str, updates: Record) -> EduResult<Record> {
        const CONTEXT: &str = "DataStore.update";
        self.require_loaded(CONTEXT)?;

        let Some(index) = self.position(collection, id) else {
            return self.fail(EduError::record_not_found(id), CONTEXT);
        };

        let mut updates = updates;
        updates.remove(FIELD_ID);
        updates.remove(FIELD_CREATED_AT);

        let now = self.now();
        let records = self.collections.entry(collection).or_default();
        let record = &mut records[index];

        let floor = record
            .updated_at()
            .into_iter()
            .chain(record.created_at())
            .max()
            .map(|prev| prev + Duration::milliseconds(1));
        let stamp = match floor {
            Some(floor) if floor > now => floor,
            _ => now,
        };

        record.merge(&updates);
        record.set_updated_at(stamp);
        record.set_sync_status(SyncStatus::Pending);
        let updated = record.clone();

        let _ = self.save_collection(collection);
        Ok(updated)
    }

    /// Remove a record; never cascades to other collections
    pub fn delete(&mut self, collection: Collection, id: &str) -> EduResult<Record> {
        const CONTEXT: &str = "DataStore.delete";
        self.require_loaded(CONTEXT)?;

        let Some(index) = self.position(collection, id) else {
            return self.fail(EduError::record_not_found(id), CONTEXT);
        };

        let removed = self
            .collections
            .entry(collection)
            .or_default()
            .remove(index);

        let _ = self.save_collection(collection);
        Ok(removed)
    }

    /// Update when `record.id` already exists, create otherwise
    pub fn save(&mut self, collection: Collection, record: Record) -> EduResult<Record> {
        match record.id().map(str::to_string) {
            Some(id) if self.exists(collection, &id) => self.update(collection, &id, record),
            _ => self.create(collection, record),
        }
    }

    fn position(&self, collection: Collection, id: &str) -> Option<usize> {
        self.records(collection)
            .iter()
            .position(|r| r.id() == Some(id))
    }

    /// All records of a collection in insertion order
    pub fn records(&self, collection: Collection) -> &[Record] {
        self.collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn find<P>(&self, collection: Collection, predicate: P) -> Option<&Record>
    where
        P: Fn(&Record) -> bool,
    {
        self.records(collection).iter().find(|r| predicate(r))
    }

    pub fn filter<P>(&self, collection: Collection, predicate: P) -> Vec<&Record>
    where
        P: Fn(&Record) -> bool,
    {
        self.records(collection)
            .iter()
            .filter(|r| predicate(r))
            .collect()
    }

    pub fn count(&self, collection: Collection) -> usize {
        self.records(collection).len()
    }

    pub fn count_where<P>(&self, collection: Collection, predicate: P) -> usize
    where
        P: Fn(&Record) -> bool,
    {
        self.records(collection)
            .iter()
            .filter(|r| predicate(r))
            .count()
    }

    pub fn exists(&self, collection: Collection, id: &str) -> bool {
        self.read(collection, id).is_some()
    }

    pub fn setting(&self, key: SettingKey) -> &Value {
        static NULL: Value = Value::Null;
        self.settings.get(&key).unwrap_or(&NULL)
    }

    /// Replace a setting value and persist it
    pub fn set_setting(&mut self, key: SettingKey, value: Value) -> EduResult<()> {
        const CONTEXT: &str = "DataStore.set";
        self.require_loaded(CONTEXT)?;

        if key == SettingKey::AutoBackupEnabled && !value.is_boolean() {
            return self.fail(
                EduError::Validation("autoBackupEnabled must be true or false".into()),
                CONTEXT,
            );
        }

        self.settings.insert(key, value);
        if !self.auto_backup_enabled() {
            self.scheduler.cancel();
        }
        self.save_setting(key)
    }

    pub fn auto_backup_enabled(&self) -> bool {
        self.setting(SettingKey::AutoBackupEnabled)
            .as_bool()
            .unwrap_or(false)
    }

    /// Copy of every collection plus center and bank info
    pub fn snapshot(&self) -> SnapshotData {
        let mut data = SnapshotData::default();
        for collection in Collection::ALL {
            data.set_collection(collection, self.records(collection).to_vec());
        }
        data.center_info = Some(self.setting(SettingKey::CenterInfo).clone());
        data.bank_info = Some(self.setting(SettingKey::BankInfo).clone());
        data
    }

    /// Replace every collection and setting with `data`, defaulting
    /// whatever it doesn't carry; memory only, nothing is persisted
    pub(crate) fn replace_contents(&mut self, data: &SnapshotData) -> Vec<Collection> {
        let now = self.now();
        let mut defaulted = Vec::new();

        for collection in Collection::ALL {
            let records = match data.collection(collection) {
                Some(records) => records.clone(),
                None => {
                    defaulted.push(collection);
                    collection.default_records(now)
                }
            };
            self.collections.insert(collection, records);
        }

        self.settings.insert(
            SettingKey::CenterInfo,
            data.center_info
                .clone()
                .unwrap_or_else(|| SettingKey::CenterInfo.default_value()),
        );
        self.settings.insert(
            SettingKey::BankInfo,
            data.bank_info
                .clone()
                .unwrap_or_else(|| SettingKey::BankInfo.default_value()),
        );

        defaulted
    }

    /// Wipe the backend and reset memory to defaults
    ///
    /// Default subjects are re-seeded and written straight away. The store
    /// is `Cleared` afterwards; call `load_all` before mutating again.
    pub fn clear_all(&mut self) -> EduResult<()> {
        if let Err(err) = self.backend.clear() {
            return self.fail(err, "DataStore.clearAll");
        }

        let now = self.now();
        for collection in Collection::ALL {
            self.collections
                .insert(collection, collection.default_records(now));
        }
        for key in SettingKey::ALL {
            self.settings.insert(key, key.default_value());
        }
        self.history.clear();
        self.scheduler.cancel();
        self.unsaved.clear();
        self.state = StoreState::Cleared;

        info!("Cleared all data");
        self.save_collection(Collection::Subjects)
    }
}
