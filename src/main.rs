use anyhow::Result;
use clap::{Parser, Subcommand};

use educenter::cli::{
    handle_backup_command, handle_export_command, handle_record_command, handle_setting_command,
    CliErrorHandler,
};
use educenter::config::{EduPaths, Settings};
use educenter::logging::init_logging;
use educenter::storage::{Collection, DataStore};

#[derive(Parser)]
#[command(
    name = "educenter",
    version,
    about = "Records, receipts and backups for a small education center",
    long_about = "EduCenter keeps a center's students, parents, registrations, receipts \
                  and catalog as JSON collections, with a rolling backup history and \
                  portable backup files."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default settings
    Init,

    /// Show current configuration and paths
    Config,

    #[command(flatten)]
    Records(educenter::cli::RecordCommands),

    /// Read or change settings
    #[command(subcommand)]
    Setting(educenter::cli::SettingCommands),

    /// Backup history and backup files
    #[command(subcommand)]
    Backup(educenter::cli::BackupCommands),

    /// Export data for other tools
    #[command(subcommand)]
    Export(educenter::cli::ExportCommands),

    /// Delete ALL data and start over
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = EduPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_logging(&settings.log_level)?;

    // Initialize storage
    let mut store = DataStore::open(&paths, &settings)?
        .with_error_handler(CliErrorHandler::new(paths.exports_dir()));
    store.load_all();

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing EduCenter at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            store.save_all()?;
            println!("Initialization complete!");
            println!();
            println!("Default subjects have been created:");
            for subject in store.records(Collection::Subjects) {
                println!("  - {}", subject.get_str("name").unwrap_or_default());
            }
            println!();
            println!("Run 'educenter list students' to see your students.");
        }
        Some(Commands::Config) => {
            println!("EduCenter Configuration");
            println!("=======================");
            println!("Base directory:    {}", paths.base_dir().display());
            println!("Data directory:    {}", paths.data_dir().display());
            println!("Exports directory: {}", paths.exports_dir().display());
            println!();
            println!("Settings:");
            println!("  Backup history size: {}", settings.max_backup_history);
            println!("  Auto-backup delay:   {}s", settings.auto_backup_delay_secs);
            match settings.storage_quota_bytes {
                Some(quota) => println!("  Storage quota:       {} bytes", quota),
                None => println!("  Storage quota:       unlimited"),
            }
            println!("  Auto-backup:         {}", store.auto_backup_enabled());
        }
        Some(Commands::Records(cmd)) => handle_record_command(&mut store, cmd)?,
        Some(Commands::Setting(cmd)) => handle_setting_command(&mut store, cmd)?,
        Some(Commands::Backup(cmd)) => handle_backup_command(&mut store, &paths, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&store, cmd)?,
        Some(Commands::Clear { force }) => {
            if !force {
                println!("WARNING: This will delete ALL data, including the backup history!");
                println!("Export a backup file first with: educenter backup export");
                println!("To proceed, run again with --force flag:");
                println!("  educenter clear --force");
                return Ok(());
            }
            store.clear_all()?;
            println!("All data cleared. Default subjects restored.");
        }
        None => {
            println!("EduCenter - education center records");
            println!();
            println!("Run 'educenter --help' for usage information.");
        }
    }

    // The process ends here, so the quiet period is over
    if let Some(backup) = store.flush_auto_backup() {
        tracing::debug!(id = %backup.id, "Auto backup written on exit");
    }

    Ok(())
}
