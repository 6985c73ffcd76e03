//! Foreign-id lookups that tolerate dangling references
//!
//! Records point at each other by id and nothing keeps those ids valid, so
//! every lookup here falls back to a placeholder instead of failing.

use crate::storage::{Collection, DataStore, Record};

/// Shown in place of a name whose record no longer exists
pub const UNKNOWN_NAME: &str = "Unknown";

/// Resolves ids to display names
pub struct ReferenceResolver<'a> {
    store: &'a DataStore,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    fn name_in(&self, collection: Collection, id: Option<&str>) -> String {
        id.and_then(|id| self.store.read(collection, id))
            .and_then(|r| r.get_str("name"))
            .unwrap_or(UNKNOWN_NAME)
            .to_string()
    }

    pub fn student_name(&self, id: &str) -> String {
        self.name_in(Collection::Students, Some(id))
    }

    pub fn subject_name(&self, id: &str) -> String {
        self.name_in(Collection::Subjects, Some(id))
    }

    pub fn package_name(&self, id: &str) -> String {
        self.name_in(Collection::Packages, Some(id))
    }

    /// The student a receipt belongs to
    ///
    /// Goes through the receipt's registration when that still exists, and
    /// falls back to the receipt's own `studentId`.
    pub fn receipt_student(&self, receipt: &Record) -> Option<&'a Record> {
        let store = self.store;
        let via_registration = receipt
            .get_str("registrationId")
            .and_then(|id| store.read(Collection::Registrations, id))
            .and_then(|reg| reg.get_str("studentId"))
            .and_then(|id| store.read(Collection::Students, id));

        via_registration.or_else(|| {
            receipt
                .get_str("studentId")
                .and_then(|id| store.read(Collection::Students, id))
        })
    }

    pub fn receipt_student_name(&self, receipt: &Record) -> String {
        self.receipt_student(receipt)
            .and_then(|s| s.get_str("name"))
            .unwrap_or(UNKNOWN_NAME)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    fn create_test_store() -> DataStore {
        let mut store = DataStore::new(MemoryKeyValueStore::new());
        store.load_all();
        store
            .create(
                Collection::Students,
                Record::new().with("id", "s1").with("name", "An"),
            )
            .unwrap();
        store
            .create(
                Collection::Students,
                Record::new().with("id", "s2").with("name", "Binh"),
            )
            .unwrap();
        store
            .create(
                Collection::Registrations,
                Record::new().with("id", "r1").with("studentId", "s1"),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_names_with_dangling_ids() {
        let store = create_test_store();
        let resolver = ReferenceResolver::new(&store);

        assert_eq!(resolver.student_name("s1"), "An");
        assert_eq!(resolver.student_name("gone"), UNKNOWN_NAME);
        assert_eq!(resolver.subject_name("subj_1"), "Cờ Vua");
        assert_eq!(resolver.package_name("gone"), UNKNOWN_NAME);
    }

    #[test]
    fn test_receipt_student_prefers_registration() {
        let store = create_test_store();
        let resolver = ReferenceResolver::new(&store);

        let receipt = Record::new()
            .with("registrationId", "r1")
            .with("studentId", "s2");
        assert_eq!(resolver.receipt_student_name(&receipt), "An");

        let orphan = Record::new()
            .with("registrationId", "deleted")
            .with("studentId", "s2");
        assert_eq!(resolver.receipt_student_name(&orphan), "Binh");

        assert_eq!(resolver.receipt_student_name(&Record::new()), UNKNOWN_NAME);
    }
}
