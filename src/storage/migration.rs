//! One-time structural upgrades for data written by older versions
//!
//! Students gain `status`, `previousStatus` and `syncStatus`; registrations
//! that used to live inside each student are copied out into the top-level
//! registrations collection. Running the migration on already-migrated data
//! changes nothing.

use serde_json::Value;

use super::collections::DATA_VERSION;
use super::record::{generate_id, Record, SyncStatus, FIELD_SYNC_STATUS};

/// Status given to students that predate the status field
pub const DEFAULT_STUDENT_STATUS: &str = "Học Thử";

/// Field holding a legacy student's embedded registrations
const LEGACY_REGISTRATIONS_FIELD: &str = "registrations";

/// What a migration pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Students that received at least one new field
    pub students_updated: usize,
    /// Registrations copied out of student records
    pub registrations_flattened: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.students_updated > 0 || self.registrations_flattened > 0
    }
}

/// Upgrade `students` in place and flatten embedded registrations
pub fn migrate(students: &mut [Record], registrations: &mut Vec<Record>) -> MigrationReport {
    let mut report = MigrationReport::default();

    for student in students.iter_mut() {
        let mut touched = false;

        if is_blank(student.get("status")) {
            student.set("status", DEFAULT_STUDENT_STATUS);
            touched = true;
        }
        if !student.contains("previousStatus") {
            student.set("previousStatus", Value::Null);
            touched = true;
        }
        // Unrecognised values are kept; only blanks are filled
        if is_blank(student.get(FIELD_SYNC_STATUS)) {
            student.set_sync_status(SyncStatus::Synced);
            touched = true;
        }

        if touched {
            report.students_updated += 1;
        }
    }

    // Only when nothing has been flattened before
    if registrations.is_empty() {
        for student in students.iter() {
            let Some(student_id) = student.id() else {
                continue;
            };
            let Some(Value::Array(embedded)) = student.get(LEGACY_REGISTRATIONS_FIELD) else {
                continue;
            };

            for legacy in embedded {
                let Some(mut registration) = Record::from_value(legacy.clone()) else {
                    continue;
                };
                if registration.id().is_none() {
                    registration.set_id(generate_id());
                }
                registration.set("studentId", student_id);
                registration.set_sync_status(SyncStatus::Synced);
                registrations.push(registration);
                report.registrations_flattened += 1;
            }
        }
    }

    report
}

/// Absent, null, false, zero or an empty string
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// Whether data stamped with `stored` needs migrating to the current version
///
/// Versions compare numerically component by component, so "10.0" is newer
/// than "4.0". A missing or unreadable marker always needs migrating.
pub fn needs_migration(stored: Option<&str>) -> bool {
    let Some(stored) = stored.and_then(parse_version) else {
        return true;
    };
    let current = parse_version(DATA_VERSION).unwrap_or_default();
    stored < current
}

fn parse_version(s: &str) -> Option<Vec<u64>> {
    s.trim()
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_students_gain_missing_fields() {
        let mut students = vec![record(json!({"id": "s1", "name": "An"}))];
        let mut registrations = Vec::new();

        let report = migrate(&mut students, &mut registrations);

        assert_eq!(report.students_updated, 1);
        assert_eq!(students[0].get_str("status"), Some(DEFAULT_STUDENT_STATUS));
        assert_eq!(students[0].get("previousStatus"), Some(&Value::Null));
        assert_eq!(students[0].sync_status(), Some(SyncStatus::Synced));
    }

    #[test]
    fn test_existing_fields_untouched() {
        let mut students = vec![record(json!({
            "id": "s1",
            "status": "Đã Đăng Ký",
            "previousStatus": "Học Thử",
            "syncStatus": "pending"
        }))];
        let before = students.clone();

        let report = migrate(&mut students, &mut Vec::new());

        assert!(!report.changed());
        assert_eq!(students, before);
    }

    #[test]
    fn test_unrecognised_sync_status_kept() {
        let mut students = vec![
            record(json!({"id": "s1", "status": "Đã Đăng Ký", "previousStatus": null, "syncStatus": "conflict"})),
            record(json!({"id": "s2", "status": "Đã Đăng Ký", "previousStatus": null, "syncStatus": ""})),
        ];

        let report = migrate(&mut students, &mut Vec::new());

        assert_eq!(report.students_updated, 1);
        assert_eq!(students[0].get_str("syncStatus"), Some("conflict"));
        assert_eq!(students[1].sync_status(), Some(SyncStatus::Synced));
    }

    #[test]
    fn test_embedded_registrations_flattened() {
        let mut students = vec![record(json!({
            "id": "s1",
            "registrations": [
                {"id": "r1", "subjectId": "subj_1"},
                {"subjectId": "subj_2"}
            ]
        }))];
        let mut registrations = Vec::new();

        let report = migrate(&mut students, &mut registrations);

        assert_eq!(report.registrations_flattened, 2);
        assert_eq!(registrations[0].id(), Some("r1"));
        assert_eq!(registrations[0].get_str("studentId"), Some("s1"));
        assert!(registrations[1].id().is_some());
        assert_eq!(registrations[1].sync_status(), Some(SyncStatus::Synced));
    }

    #[test]
    fn test_flatten_skipped_when_registrations_exist() {
        let mut students = vec![record(json!({
            "id": "s1",
            "registrations": [{"id": "r1"}]
        }))];
        let mut registrations = vec![record(json!({"id": "r0"}))];

        migrate(&mut students, &mut registrations);

        assert_eq!(registrations.len(), 1);
    }

    #[test]
    fn test_migration_is_idempotent() {
        let mut students = vec![
            record(json!({"id": "s1", "registrations": [{"id": "r1"}]})),
            record(json!({"id": "s2", "status": ""})),
        ];
        let mut registrations = Vec::new();

        migrate(&mut students, &mut registrations);
        let (students_once, registrations_once) = (students.clone(), registrations.clone());

        let second = migrate(&mut students, &mut registrations);

        assert!(!second.changed());
        assert_eq!(students, students_once);
        assert_eq!(registrations, registrations_once);
    }

    #[test]
    fn test_needs_migration() {
        assert!(needs_migration(None));
        assert!(needs_migration(Some("3.9")));
        assert!(needs_migration(Some("garbage")));
        assert!(!needs_migration(Some("4.0")));
        assert!(!needs_migration(Some("10.0")));
    }
}
