//! Storage layer for EduCenter
//!
//! Every collection lives in memory inside a [`DataStore`] and is mirrored,
//! one JSON document per key, to a [`KeyValueStore`] backend. The file
//! backend writes atomically; the memory backend backs tests.

pub mod collections;
pub mod file_io;
pub mod handler;
pub mod kv;
pub mod migration;
pub mod module;
pub mod record;
pub mod store;

pub use collections::{Collection, SettingKey};
pub use file_io::{read_optional, write_atomic, write_json_atomic};
pub use handler::{user_message, ErrorHandler, LogErrorHandler};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use migration::MigrationReport;
pub use module::DataModule;
pub use record::{Record, SyncStatus};
pub use store::{DataStore, LoadReport, StoreState};
