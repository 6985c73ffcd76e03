//! Backup files: the whole store as one portable JSON document
//!
//! ```json
//! { "exportDate": "...", "version": "4.0", "data": { "students": [...], ... } }
//! ```
//!
//! Importing writes each key the file carries straight to storage and then
//! reloads the store, so an import behaves exactly like starting the
//! application on that data (migration included).

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{EduError, EduResult};
use crate::storage::collections::DATA_VERSION;
use crate::storage::file_io::write_json_atomic;
use crate::storage::migration::MigrationReport;
use crate::storage::{Collection, DataStore, SettingKey};

use super::snapshot::SnapshotData;

/// Collections written to a backup file
pub const EXPORTED_COLLECTIONS: [Collection; 10] = [
    Collection::Students,
    Collection::Parents,
    Collection::Appointments,
    Collection::Registrations,
    Collection::Receipts,
    Collection::Subjects,
    Collection::Packages,
    Collection::Promotions,
    Collection::Teachers,
    Collection::Classes,
];

/// A backup file as written to and read from disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub data: SnapshotData,
}

impl BackupFile {
    /// Capture the store's current contents
    pub fn from_store(store: &DataStore) -> Self {
        let mut data = SnapshotData::default();
        for collection in EXPORTED_COLLECTIONS {
            data.set_collection(collection, store.records(collection).to_vec());
        }
        data.center_info = Some(store.setting(SettingKey::CenterInfo).clone());
        data.bank_info = Some(store.setting(SettingKey::BankInfo).clone());

        Self {
            export_date: store.now(),
            version: DATA_VERSION.to_string(),
            data,
        }
    }

    /// Conventional file name for an export made at `at`
    pub fn default_file_name(at: DateTime<Utc>) -> String {
        format!("educenter-backup-{}.json", at.format("%Y-%m-%d"))
    }

    pub fn write_to(&self, path: &Path) -> EduResult<()> {
        write_json_atomic(path, self)?;
        info!(path = %path.display(), "Exported backup file");
        Ok(())
    }

    /// Read and validate a backup file
    pub fn read_from(path: &Path) -> EduResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EduError::Io(format!("Failed to read backup file: {}", e)))?;
        Self::parse(&contents)
    }

    /// Parse backup file contents; a document without `data` is rejected
    pub fn parse(contents: &str) -> EduResult<Self> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| EduError::Import(format!("Not a valid JSON document: {}", e)))?;

        match value.get("data") {
            Some(Value::Object(_)) => {}
            _ => return Err(EduError::Import("Invalid backup file: missing data".into())),
        }

        let export_date = value
            .get("exportDate")
            .and_then(Value::as_str)
            .and_then(crate::clock::parse_timestamp)
            .unwrap_or_default();
        let version = value
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let data = serde_json::from_value(value["data"].clone())
            .map_err(|e| EduError::Import(format!("Invalid backup data: {}", e)))?;

        Ok(Self {
            export_date,
            version,
            data,
        })
    }
}

/// Result of an import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// Collections overwritten from the file
    pub collections: Vec<Collection>,
    /// Settings overwritten from the file
    pub settings: Vec<SettingKey>,
    /// Set when the reload migrated the imported data
    pub migration: Option<MigrationReport>,
}

impl ImportResult {
    pub fn summary(&self) -> String {
        let mut names: Vec<&str> = self.collections.iter().map(Collection::name).collect();
        names.extend(self.settings.iter().map(SettingKey::storage_key));
        format!("Imported: {}", names.join(", "))
    }
}

impl DataStore {
    /// Overwrite storage with every key `file` carries, then reload
    ///
    /// Keys absent from the file keep their current value. Allowed in any
    /// store state, since the store is reloaded afterwards.
    pub fn import_backup_file(&mut self, file: &BackupFile) -> EduResult<ImportResult> {
        const CONTEXT: &str = "BackupFile.import";
        let mut result = ImportResult::default();

        // Reload even after a failed write so memory matches storage
        let written = self.write_imported(file, &mut result, CONTEXT);
        let report = self.load_all();
        written?;

        result.migration = report.migration;
        info!(
            collections = result.collections.len(),
            version = %file.version,
            "Imported backup file"
        );
        Ok(result)
    }

    fn write_imported(
        &mut self,
        file: &BackupFile,
        result: &mut ImportResult,
        context: &str,
    ) -> EduResult<()> {
        for collection in file.data.present_collections() {
            if let Some(records) = file.data.collection(collection) {
                let json = serde_json::to_string(records)?;
                self.write_key(collection.storage_key(), json, context)?;
                result.collections.push(collection);
            }
        }

        let settings = [
            (SettingKey::CenterInfo, &file.data.center_info),
            (SettingKey::BankInfo, &file.data.bank_info),
        ];
        for (key, value) in settings {
            if let Some(value) = value {
                let json = serde_json::to_string(value)?;
                self.write_key(key.storage_key(), json, context)?;
                result.settings.push(key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryKeyValueStore, Record, StoreState};
    use serde_json::json;
    use tempfile::TempDir;

    fn loaded_store() -> DataStore {
        let mut store = DataStore::new(MemoryKeyValueStore::new());
        store.load_all();
        store
    }

    #[test]
    fn test_export_format() {
        let mut store = loaded_store();
        store
            .create(Collection::Students, Record::new().with("name", "A"))
            .unwrap();

        let value = serde_json::to_value(BackupFile::from_store(&store)).unwrap();

        assert_eq!(value["version"], "4.0");
        assert!(value["exportDate"].is_string());
        assert_eq!(value["data"]["students"][0]["name"], "A");
        assert_eq!(value["data"]["centerInfo"], json!({}));
        assert!(value["data"].get("users").is_none());
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("backup.json");
        let store = loaded_store();
        let file = BackupFile::from_store(&store);

        file.write_to(&path).unwrap();
        let read = BackupFile::read_from(&path).unwrap();

        assert_eq!(read.data, file.data);
        assert_eq!(read.version, "4.0");
    }

    #[test]
    fn test_parse_rejects_missing_data() {
        let err = BackupFile::parse(r#"{"version": "4.0"}"#).unwrap_err();
        assert!(matches!(err, EduError::Import(_)));

        let err = BackupFile::parse("not json").unwrap_err();
        assert!(matches!(err, EduError::Import(_)));
    }

    #[test]
    fn test_import_overwrites_only_present_keys() {
        let mut store = loaded_store();
        store
            .create(Collection::Parents, Record::new().with("name", "P"))
            .unwrap();

        let file = BackupFile::parse(
            r#"{"version": "4.0", "data": {"students": [{"id": "s1", "name": "B", "status": "Học Thử"}]}}"#,
        )
        .unwrap();
        let result = store.import_backup_file(&file).unwrap();

        assert_eq!(result.collections, vec![Collection::Students]);
        assert_eq!(store.count(Collection::Students), 1);
        assert_eq!(store.count(Collection::Parents), 1);
        assert!(result.summary().starts_with("Imported: students"));
    }

    #[test]
    fn test_import_of_current_version_still_upgrades_old_records() {
        let mut store = loaded_store();
        let file = BackupFile::parse(
            r#"{"version": "4.0", "data": {"students": [{"id": "s1", "name": "B"}]}}"#,
        )
        .unwrap();

        let result = store.import_backup_file(&file).unwrap();

        assert!(result.migration.is_some());
        assert_eq!(
            store.read(Collection::Students, "s1").unwrap().get_str("status"),
            Some("Học Thử")
        );
    }

    #[test]
    fn test_failed_import_leaves_store_loaded() {
        let mut store = DataStore::new(MemoryKeyValueStore::with_quota(200));
        store.load_all();
        let file = BackupFile::parse(&format!(
            r#"{{"version": "3.0", "data": {{"students": [{{"id": "s1", "name": "{}"}}]}}}}"#,
            "x".repeat(300)
        ))
        .unwrap();

        let err = store.import_backup_file(&file).unwrap_err();

        assert!(err.is_quota_exceeded());
        assert_eq!(store.state(), StoreState::Loaded);
        assert_eq!(store.count(Collection::Students), 0);
        assert!(store.backend.get("students").unwrap().is_none());
    }

    #[test]
    fn test_import_of_older_version_runs_migration() {
        let mut store = loaded_store();
        let file = BackupFile::parse(
            r#"{"version": "3.0", "data": {"students": [{"id": "s1", "name": "B"}]}}"#,
        )
        .unwrap();

        let result = store.import_backup_file(&file).unwrap();

        assert_eq!(result.migration.unwrap().students_updated, 1);
        assert_eq!(
            store.read(Collection::Students, "s1").unwrap().get_str("status"),
            Some("Học Thử")
        );
    }
}
