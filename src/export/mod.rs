//! Export module for EduCenter
//!
//! - CSV: one collection at a time, for spreadsheets
//!
//! Whole-store exports use the backup file format, see
//! [`BackupFile`](crate::backup::BackupFile).

pub mod csv;

pub use csv::{cell_text, collect_columns, export_collection_csv};
