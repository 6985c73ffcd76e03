//! String-keyed facade over the store
//!
//! Feature code that works with collection and setting names as text (the
//! CLI, imported scripts) goes through `DataModule`. Nothing here returns an
//! error: failures become `false`/`None`/empty, and the error itself is
//! passed to the store's error handler.

use serde_json::Value;

use crate::error::EduError;

use super::collections::{Collection, SettingKey};
use super::record::Record;
use super::store::DataStore;

/// The collaborator-facing store contract
pub struct DataModule {
    store: DataStore,
}

impl DataModule {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Load everything from storage
    pub fn init(&mut self) -> bool {
        self.store.load_all();
        true
    }

    pub fn get_all(&self, collection: &str) -> Vec<Record> {
        match self.collection(collection, "DataModule.getAll") {
            Some(c) => self.store.records(c).to_vec(),
            None => Vec::new(),
        }
    }

    pub fn get_by_id(&self, collection: &str, id: &str) -> Option<Record> {
        let c = self.collection(collection, "DataModule.getById")?;
        self.store.read(c, id).cloned()
    }

    /// Create or update depending on whether `record.id` already exists
    pub fn save(&mut self, collection: &str, record: Record) -> bool {
        match self.collection(collection, "DataModule.save") {
            Some(c) => self.store.save(c, record).is_ok(),
            None => false,
        }
    }

    pub fn delete(&mut self, collection: &str, id: &str) -> bool {
        match self.collection(collection, "DataModule.delete") {
            Some(c) => self.store.delete(c, id).is_ok(),
            None => false,
        }
    }

    /// A setting's value; `None` when unset or unknown
    pub fn get(&self, key: &str) -> Option<Value> {
        let key = self.setting_key(key, "DataModule.get")?;
        match self.store.setting(key) {
            Value::Null => None,
            value => Some(value.clone()),
        }
    }

    pub fn set(&mut self, key: &str, value: Value) -> bool {
        match self.setting_key(key, "DataModule.set") {
            Some(k) => self.store.set_setting(k, value).is_ok(),
            None => false,
        }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DataStore {
        &mut self.store
    }

    pub fn into_store(self) -> DataStore {
        self.store
    }

    fn collection(&self, name: &str, context: &str) -> Option<Collection> {
        self.resolve(name.parse::<Collection>(), context)
    }

    fn setting_key(&self, name: &str, context: &str) -> Option<SettingKey> {
        self.resolve(name.parse::<SettingKey>(), context)
    }

    fn resolve<T>(&self, parsed: Result<T, EduError>, context: &str) -> Option<T> {
        match parsed {
            Ok(value) => Some(value),
            Err(err) => {
                self.store.handler.handle(&err, context);
                None
            }
        }
    }
}
