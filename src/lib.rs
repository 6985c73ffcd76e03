//! EduCenter - data core for an education-center management tool
//!
//! Students, parents, registrations, receipts and the rest of a small
//! center's records, kept as named collections of JSON records and mirrored to
//! a key-value store on every change.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `storage`: The collection store, its backends and migration
//! - `backup`: Backup history, auto-backup and backup files
//! - `services`: Feature rules on top of the store (catalog, receipts)
//! - `export`: CSV export
//! - `display`, `cli`: The command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use educenter::storage::{Collection, DataStore, MemoryKeyValueStore, Record};
//!
//! let mut store = DataStore::new(MemoryKeyValueStore::new());
//! store.load_all();
//! let student = store.create(Collection::Students, Record::new().with("name", "An"))?;
//! ```

pub mod backup;
pub mod cli;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod services;
pub mod storage;

pub use error::{EduError, EduResult};
