//! Setting CLI commands

use clap::Subcommand;
use serde_json::Value;

use crate::error::EduResult;
use crate::storage::{DataStore, SettingKey};

/// Setting subcommands
#[derive(Subcommand)]
pub enum SettingCommands {
    /// Show one setting, or all of them
    Get {
        /// Setting key (currentUser, centerInfo, bankInfo, autoBackupEnabled)
        key: Option<String>,
    },
    /// Replace a setting value
    Set {
        /// Setting key
        key: String,
        /// New value; parsed as JSON when possible, otherwise taken as a string
        value: String,
    },
}

/// Handle a setting command
pub fn handle_setting_command(store: &mut DataStore, cmd: SettingCommands) -> EduResult<()> {
    match cmd {
        SettingCommands::Get { key: Some(key) } => {
            let key: SettingKey = key.parse()?;
            println!("{}", serde_json::to_string_pretty(store.setting(key))?);
        }

        SettingCommands::Get { key: None } => {
            for key in SettingKey::ALL {
                println!("{:<18} {}", key.storage_key(), store.setting(key));
            }
        }

        SettingCommands::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            store.set_setting(key, value)?;
            println!("Updated {}", key);
        }
    }

    Ok(())
}
