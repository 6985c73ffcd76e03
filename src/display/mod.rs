//! Display formatting for terminal output
//!
//! Plain-text tables and detail views for records and backups.

pub mod backup;
pub mod records;

pub use backup::{format_age, format_backup_details, format_backup_list};
pub use records::{format_record_details, format_record_list};
