//! Key-value backends
//!
//! The store persists every collection as one JSON document under a fixed
//! key. Backends account for size the way browser storage does (key length
//! plus value length) and refuse writes that would push the total past the
//! quota, leaving the previous value in place.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{EduError, EduResult};

use super::file_io::{read_optional, write_atomic};

/// Persistent string-to-string storage
pub trait KeyValueStore {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> EduResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> EduResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> EduResult<()>;

    /// Remove every key
    fn clear(&mut self) -> EduResult<()>;

    /// All keys currently stored, sorted
    fn keys(&self) -> EduResult<Vec<String>>;

    /// Bytes currently in use
    fn used_bytes(&self) -> EduResult<u64>;
}

fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

fn check_quota(
    quota: Option<u64>,
    key: &str,
    used: u64,
    old_size: u64,
    new_size: u64,
) -> EduResult<()> {
    if let Some(limit) = quota {
        let needed = used - old_size + new_size;
        if needed > limit {
            return Err(EduError::QuotaExceeded {
                key: key.to_string(),
                needed,
                limit,
            });
        }
    }
    Ok(())
}

/// In-memory backend, mostly for tests
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
    quota: Option<u64>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that rejects writes once `quota` bytes are in use
    pub fn with_quota(quota: u64) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    pub fn set_quota(&mut self, quota: Option<u64>) {
        self.quota = quota;
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> EduResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> EduResult<()> {
        let old_size = self
            .entries
            .get(key)
            .map(|v| entry_size(key, v))
            .unwrap_or(0);
        check_quota(
            self.quota,
            key,
            self.used_bytes()?,
            old_size,
            entry_size(key, value),
        )?;

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> EduResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> EduResult<()> {
        self.entries.clear();
        Ok(())
    }

    fn keys(&self) -> EduResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn used_bytes(&self) -> EduResult<u64> {
        Ok(self.entries.iter().map(|(k, v)| entry_size(k, v)).sum())
    }
}

/// File backend: one `<key>.json` document per key in a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    quota: Option<u64>,
}

impl FileKeyValueStore {
    pub fn new(dir: PathBuf, quota: Option<u64>) -> Self {
        Self { dir, quota }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn path_for(&self, key: &str) -> EduResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(EduError::Storage(format!("Invalid storage key: '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> EduResult<Option<String>> {
        read_optional(self.path_for(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> EduResult<()> {
        let path = self.path_for(key)?;
        let old_size = read_optional(&path)?
            .map(|v| entry_size(key, &v))
            .unwrap_or(0);
        check_quota(
            self.quota,
            key,
            self.used_bytes()?,
            old_size,
            entry_size(key, value),
        )?;

        write_atomic(path, value)
    }

    fn remove(&mut self, key: &str) -> EduResult<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                EduError::Storage(format!("Failed to remove {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }

    fn clear(&mut self) -> EduResult<()> {
        for key in self.keys()? {
            self.remove(&key)?;
        }
        Ok(())
    }

    fn keys(&self) -> EduResult<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .map_err(|e| EduError::Storage(format!("Failed to read data directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| EduError::Storage(format!("Failed to read directory entry: {}", e)))?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    keys.push(stem.to_string_lossy().to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn used_bytes(&self) -> EduResult<u64> {
        let mut total = 0;
        for key in self.keys()? {
            let len = fs::metadata(self.path_for(&key)?)
                .map(|m| m.len())
                .unwrap_or(0);
            total += key.len() as u64 + len;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_set_get_remove() {
        let mut kv = MemoryKeyValueStore::new();
        kv.set("students", "[]").unwrap();
        assert_eq!(kv.get("students").unwrap().as_deref(), Some("[]"));
        assert_eq!(kv.used_bytes().unwrap(), 10);

        kv.remove("students").unwrap();
        assert!(kv.get("students").unwrap().is_none());
        kv.remove("students").unwrap();
    }

    #[test]
    fn test_memory_quota_rejects_and_keeps_old_value() {
        let mut kv = MemoryKeyValueStore::with_quota(20);
        kv.set("a", "[1]").unwrap();

        let err = kv.set("a", &"x".repeat(30)).unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(kv.get("a").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_memory_quota_counts_replacement_not_sum() {
        let mut kv = MemoryKeyValueStore::with_quota(12);
        kv.set("k", "0123456789").unwrap();
        // Replacing an 11-byte entry with another 11-byte entry fits
        kv.set("k", "9876543210").unwrap();
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut kv = FileKeyValueStore::new(temp_dir.path().join("data"), None);

        kv.set("students", r#"[{"id":"s1"}]"#).unwrap();
        kv.set("centerInfo", "{}").unwrap();

        assert_eq!(
            kv.get("students").unwrap().as_deref(),
            Some(r#"[{"id":"s1"}]"#)
        );
        assert_eq!(kv.keys().unwrap(), vec!["centerInfo", "students"]);

        kv.clear().unwrap();
        assert!(kv.keys().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_quota() {
        let temp_dir = TempDir::new().unwrap();
        let mut kv = FileKeyValueStore::new(temp_dir.path().to_path_buf(), Some(32));

        kv.set("small", "[]").unwrap();
        let err = kv.set("large", &"y".repeat(64)).unwrap_err();
        assert!(err.is_quota_exceeded());
        assert!(kv.get("large").unwrap().is_none());
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut kv = FileKeyValueStore::new(temp_dir.path().to_path_buf(), None);
        assert!(kv.set("../escape", "1").is_err());
    }
}
