//! Backup records and the bounded, newest-first history that holds them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::snapshot::SnapshotData;

/// How a backup came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    /// Written by the debounced trigger after a burst of edits
    Auto,
    /// Requested explicitly
    Manual,
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A snapshot of the store with its identity and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: BackupKind,
    pub data: SnapshotData,
}

/// Most-recent-first list of backups, capped at `max_entries`
#[derive(Debug, Clone)]
pub struct BackupHistory {
    entries: Vec<Backup>,
    max_entries: usize,
}

impl BackupHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
        }
    }

    /// Replace the contents, e.g. with what was persisted
    pub fn replace(&mut self, entries: Vec<Backup>) {
        self.entries = entries;
        self.enforce_limit();
    }

    /// Add a backup at the front; returns the ids evicted to stay in bounds
    pub fn push(&mut self, backup: Backup) -> Vec<String> {
        self.entries.insert(0, backup);
        self.enforce_limit()
    }

    /// Drop the oldest entries (by date) beyond the limit
    fn enforce_limit(&mut self) -> Vec<String> {
        // Stable sort keeps insertion order for backups sharing a timestamp
        self.entries.sort_by(|a, b| b.date.cmp(&a.date));

        if self.entries.len() <= self.max_entries {
            return Vec::new();
        }
        self.entries
            .split_off(self.max_entries)
            .into_iter()
            .map(|b| b.id)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Backup> {
        self.entries.iter().find(|b| b.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Backup> {
        let index = self.entries.iter().position(|b| b.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn latest(&self) -> Option<&Backup> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[Backup] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
