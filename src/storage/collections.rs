//! The fixed set of collections and singleton settings, with their storage
//! keys and default values.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::error::EduError;

use super::record::{Record, SyncStatus};

/// Storage key for the backup history list
pub const BACKUP_HISTORY_KEY: &str = "backupHistory";

/// Storage key for the schema marker consulted before migration
pub const DATA_VERSION_KEY: &str = "dataVersion";

/// Current data schema version
pub const DATA_VERSION: &str = "4.0";

/// A named, ordered list of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Students,
    Parents,
    Teachers,
    Classes,
    Appointments,
    Registrations,
    Receipts,
    Attendance,
    Subjects,
    Packages,
    Promotions,
    Users,
}

impl Collection {
    /// Every collection, in load order
    pub const ALL: [Collection; 12] = [
        Self::Students,
        Self::Parents,
        Self::Teachers,
        Self::Classes,
        Self::Appointments,
        Self::Registrations,
        Self::Receipts,
        Self::Attendance,
        Self::Subjects,
        Self::Packages,
        Self::Promotions,
        Self::Users,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Parents => "parents",
            Self::Teachers => "teachers",
            Self::Classes => "classes",
            Self::Appointments => "appointments",
            Self::Registrations => "registrations",
            Self::Receipts => "receipts",
            Self::Attendance => "attendance",
            Self::Subjects => "subjects",
            Self::Packages => "packages",
            Self::Promotions => "promotions",
            Self::Users => "users",
        }
    }

    /// Key under which the collection is persisted
    pub fn storage_key(&self) -> &'static str {
        self.name()
    }

    /// Contents used when nothing (or nothing readable) is persisted
    pub fn default_records(&self, now: DateTime<Utc>) -> Vec<Record> {
        match self {
            Self::Subjects => default_subjects(now),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = EduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| EduError::UnknownCollection(s.to_string()))
    }
}

/// Singleton values stored beside the collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    CurrentUser,
    CenterInfo,
    BankInfo,
    AutoBackupEnabled,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        Self::CurrentUser,
        Self::CenterInfo,
        Self::BankInfo,
        Self::AutoBackupEnabled,
    ];

    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::CurrentUser => "currentUser",
            Self::CenterInfo => "centerInfo",
            Self::BankInfo => "bankInfo",
            Self::AutoBackupEnabled => "autoBackupEnabled",
        }
    }

    pub fn default_value(&self) -> Value {
        match self {
            Self::CurrentUser => Value::Null,
            Self::CenterInfo | Self::BankInfo => json!({}),
            Self::AutoBackupEnabled => Value::Bool(false),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

impl FromStr for SettingKey {
    type Err = EduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.storage_key() == s)
            .ok_or_else(|| EduError::UnknownSetting(s.to_string()))
    }
}

/// Subjects seeded on first run and after a full wipe
pub fn default_subjects(now: DateTime<Utc>) -> Vec<Record> {
    [
        ("subj_1", "♟️", "Cờ Vua", 2_000_000),
        ("subj_2", "🎨", "Vẽ Tranh", 1_800_000),
        ("subj_3", "📚", "Tiền Tiểu Học", 1_500_000),
        ("subj_4", "✍️", "Rèn Chữ", 1_600_000),
    ]
    .into_iter()
    .map(|(id, icon, name, fee)| {
        let mut record = Record::new()
            .with("id", id)
            .with("icon", icon)
            .with("name", name)
            .with("defaultFee", fee);
        record.set_created_at(now);
        record.set_updated_at(now);
        record.set_sync_status(SyncStatus::Synced);
        record
    })
    .collect()
}
