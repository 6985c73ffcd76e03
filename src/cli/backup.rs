//! Backup CLI commands
//!
//! Implements CLI commands for the backup history and backup files.

use clap::Subcommand;
use std::path::PathBuf;

use crate::backup::BackupFile;
use crate::config::EduPaths;
use crate::display::{format_backup_details, format_backup_list};
use crate::error::{EduError, EduResult};
use crate::storage::DataStore;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup in the history
    Create,

    /// List the backup history
    List,

    /// Show what a backup contains
    Show {
        /// Backup ID (use 'latest' for most recent)
        id: String,
    },

    /// Restore from a backup in the history
    Restore {
        /// Backup ID (use 'latest' for most recent)
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Delete a backup from the history
    Delete {
        /// Backup ID
        id: String,
    },

    /// Write all data to a backup file
    Export {
        /// Output file (defaults to the exports directory)
        file: Option<PathBuf>,
    },

    /// Load data from a backup file
    Import {
        /// Backup file
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    store: &mut DataStore,
    paths: &EduPaths,
    cmd: BackupCommands,
) -> EduResult<()> {
    match cmd {
        BackupCommands::Create => {
            println!("Creating backup...");
            let backup = store.create_manual_backup()?;
            println!("Backup created: {}", backup.id);
            println!("Records: {}", backup.data.record_count());
        }

        BackupCommands::List => {
            println!("{}", format_backup_list(store.backups(), store.now()));
        }

        BackupCommands::Show { id } => {
            let id = resolve_backup_id(store, &id)?;
            if let Some(backup) = store.backup(&id) {
                print!("{}", format_backup_details(backup));
            }
        }

        BackupCommands::Restore { id, force } => {
            let id = resolve_backup_id(store, &id)?;
            if let Some(backup) = store.backup(&id) {
                print!("{}", format_backup_details(backup));
                println!();
            }

            if !force {
                println!("WARNING: This will overwrite ALL current data!");
                println!("To proceed, run again with --force flag:");
                println!("  educenter backup restore {} --force", id);
                return Ok(());
            }

            println!("Restoring from backup...");
            let result = store.restore_from_history(&id)?;

            println!("Restore complete!");
            println!("{}", result.summary());

            if result.all_restored() {
                println!("\nAll data has been restored successfully.");
            } else {
                println!("\nNote: Some data was not present in the backup and was reset.");
            }
        }

        BackupCommands::Delete { id } => {
            let removed = store.delete_backup(&id)?;
            println!("Deleted backup {}", removed.id);
        }

        BackupCommands::Export { file } => {
            let export = BackupFile::from_store(store);
            let path = match file {
                Some(path) => path,
                None => {
                    paths.ensure_directories()?;
                    paths
                        .exports_dir()
                        .join(BackupFile::default_file_name(export.export_date))
                }
            };

            export.write_to(&path)?;
            println!("Backup file written: {}", path.display());
            println!("Records: {}", export.data.record_count());
        }

        BackupCommands::Import { file, force } => {
            let import = BackupFile::read_from(&file)?;

            println!("Backup File");
            println!("===========");
            println!("File: {}", file.display());
            println!(
                "Exported: {}",
                import.export_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Version: {}", import.version);
            println!("Records: {}", import.data.record_count());
            println!();

            if !force {
                println!("WARNING: This will overwrite the data stored in this file!");
                println!("To proceed, run again with --force flag:");
                println!("  educenter backup import {} --force", file.display());
                return Ok(());
            }

            let result = store.import_backup_file(&import)?;
            println!("Import complete!");
            println!("{}", result.summary());
            if let Some(report) = result.migration.filter(|r| r.changed()) {
                println!(
                    "Migrated {} student(s), {} registration(s)",
                    report.students_updated, report.registrations_flattened
                );
            }
        }
    }

    Ok(())
}

/// Resolve 'latest' to the most recent backup's id
fn resolve_backup_id(store: &DataStore, id: &str) -> EduResult<String> {
    if id.eq_ignore_ascii_case("latest") {
        return store
            .backups()
            .first()
            .map(|b| b.id.clone())
            .ok_or_else(|| EduError::backup_not_found("latest"));
    }

    if store.backup(id).is_none() {
        return Err(EduError::backup_not_found(id));
    }
    Ok(id.to_string())
}
