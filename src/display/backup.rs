//! Backup display formatting

use chrono::{DateTime, Utc};

use crate::backup::Backup;
use crate::storage::Collection;

/// Format a duration in human-readable form
pub fn format_age(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    format!("{}d", hours / 24)
}

/// Format the backup history, newest first
pub fn format_backup_list(backups: &[Backup], now: DateTime<Utc>) -> String {
    if backups.is_empty() {
        return "No backups found.\nCreate one with: educenter backup create".to_string();
    }

    let mut output = String::from("Backup History\n==============\n\n");
    for (i, backup) in backups.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {}  {:<6}  {}  ({} ago, {} records)\n",
            i + 1,
            backup.id,
            backup.kind.to_string(),
            backup.date.format("%Y-%m-%d %H:%M:%S UTC"),
            format_age(now.signed_duration_since(backup.date)),
            backup.data.record_count(),
        ));
    }
    output.push_str(&format!("\nTotal: {} backup(s)", backups.len()));
    output
}

/// Format one backup's contents
pub fn format_backup_details(backup: &Backup) -> String {
    let mut output = String::new();
    output.push_str(&format!("Backup:  {}\n", backup.id));
    output.push_str(&format!("Type:    {}\n", backup.kind));
    output.push_str(&format!(
        "Created: {}\n\nContents:\n",
        backup.date.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for collection in Collection::ALL {
        let count = match backup.data.collection(collection) {
            Some(records) => records.len().to_string(),
            None => "-".to_string(),
        };
        output.push_str(&format!("  {:<14} {}\n", collection.name(), count));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::{BackupKind, SnapshotData};
    use chrono::{Duration, TimeZone};

    fn backup() -> Backup {
        let mut data = SnapshotData::default();
        data.set_collection(Collection::Students, Vec::new());
        Backup {
            id: "b1".into(),
            date: Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap(),
            kind: BackupKind::Manual,
            data,
        }
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::seconds(5)), "5s");
        assert_eq!(format_age(Duration::minutes(90)), "1h");
        assert_eq!(format_age(Duration::days(3)), "3d");
    }

    #[test]
    fn test_list() {
        let b = backup();
        let output = format_backup_list(&[b.clone()], b.date + Duration::minutes(2));
        assert!(output.contains("1. b1  manual"));
        assert!(output.contains("(2m ago, 0 records)"));
        assert!(format_backup_list(&[], b.date).starts_with("No backups found."));
    }

    #[test]
    fn test_details_mark_missing_collections() {
        let output = format_backup_details(&backup());
        assert!(output.contains("  students       0"));
        assert!(output.contains("  parents        -"));
    }
}
