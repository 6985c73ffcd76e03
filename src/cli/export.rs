//! Export CLI commands

use clap::Subcommand;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::error::{EduError, EduResult};
use crate::export::export_collection_csv;
use crate::storage::{Collection, DataStore};

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export one collection as CSV
    Csv {
        /// Collection name
        collection: String,
        /// Output file
        file: PathBuf,
    },
}

/// Handle an export command
pub fn handle_export_command(store: &DataStore, cmd: ExportCommands) -> EduResult<()> {
    match cmd {
        ExportCommands::Csv { collection, file } => {
            let collection: Collection = collection.parse()?;
            let output = File::create(&file).map_err(|e| {
                EduError::Export(format!("Failed to create {}: {}", file.display(), e))
            })?;

            let rows = export_collection_csv(store, collection, BufWriter::new(output))?;
            println!(
                "Exported {} {} record(s) to {}",
                rows,
                collection.name(),
                file.display()
            );
        }
    }

    Ok(())
}
