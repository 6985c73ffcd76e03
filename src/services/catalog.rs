//! Catalog service
//!
//! Subjects, packages and promotions. Subjects and packages cannot be deleted
//! while a registration still points at them.

use chrono::NaiveDate;

use crate::error::{EduError, EduResult};
use crate::storage::{Collection, DataStore, Record};

/// Service for catalog management
pub struct CatalogService<'a> {
    store: &'a mut DataStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service
    pub fn new(store: &'a mut DataStore) -> Self {
        Self { store }
    }

    /// Registrations whose `field` equals `id`
    fn registrations_referencing(&self, field: &str, id: &str) -> usize {
        self.store
            .count_where(Collection::Registrations, |r| r.get_str(field) == Some(id))
    }

    fn delete_unreferenced(
        &mut self,
        collection: Collection,
        entity_type: &'static str,
        field: &str,
        id: &str,
    ) -> EduResult<Record> {
        let count = self.registrations_referencing(field, id);
        if count > 0 {
            return Err(EduError::InUse {
                entity_type,
                identifier: id.to_string(),
                count,
            });
        }
        self.store.delete(collection, id)
    }

    /// Delete a subject no registration uses
    pub fn delete_subject(&mut self, id: &str) -> EduResult<Record> {
        self.delete_unreferenced(Collection::Subjects, "Subject", "subjectId", id)
    }

    /// Delete a package no registration uses
    pub fn delete_package(&mut self, id: &str) -> EduResult<Record> {
        self.delete_unreferenced(Collection::Packages, "Package", "packageId", id)
    }

    pub fn delete_promotion(&mut self, id: &str) -> EduResult<Record> {
        self.store.delete(Collection::Promotions, id)
    }

    /// Subjects not explicitly switched off
    pub fn active_subjects(&self) -> Vec<&Record> {
        self.store.filter(Collection::Subjects, is_active)
    }

    /// Packages not explicitly switched off
    pub fn active_packages(&self) -> Vec<&Record> {
        self.store.filter(Collection::Packages, is_active)
    }

    /// Promotions switched on and running on `today`
    ///
    /// Unlike subjects, a promotion must be enabled explicitly. `startDate`
    /// and `endDate` are `YYYY-MM-DD` and both inclusive; a missing bound is
    /// open.
    pub fn active_promotions(&self, today: NaiveDate) -> Vec<&Record> {
        self.store.filter(Collection::Promotions, |p| {
            if p.get("isActive").and_then(|v| v.as_bool()) != Some(true) {
                return false;
            }
            let starts = p.get_str("startDate").and_then(parse_date);
            let ends = p.get_str("endDate").and_then(parse_date);
            starts.map_or(true, |d| d <= today) && ends.map_or(true, |d| d >= today)
        })
    }
}

fn is_active(record: &Record) -> bool {
    record.get("isActive").and_then(|v| v.as_bool()) != Some(false)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    fn create_test_store() -> DataStore {
        let mut store = DataStore::new(MemoryKeyValueStore::new());
        store.load_all();
        store
    }

    #[test]
    fn test_delete_subject_in_use() {
        let mut store = create_test_store();
        store
            .create(
                Collection::Registrations,
                Record::new().with("subjectId", "subj_1"),
            )
            .unwrap();

        let mut service = CatalogService::new(&mut store);
        let err = service.delete_subject("subj_1").unwrap_err();

        assert!(matches!(err, EduError::InUse { count: 1, .. }));
        assert!(store.exists(Collection::Subjects, "subj_1"));
    }

    #[test]
    fn test_delete_unused_subject() {
        let mut store = create_test_store();
        let mut service = CatalogService::new(&mut store);

        let removed = service.delete_subject("subj_2").unwrap();

        assert_eq!(removed.id(), Some("subj_2"));
        assert_eq!(store.count(Collection::Subjects), 3);
    }

    #[test]
    fn test_delete_package_in_use() {
        let mut store = create_test_store();
        let package = store
            .create(Collection::Packages, Record::new().with("name", "Combo"))
            .unwrap();
        let package_id = package.id().unwrap().to_string();
        store
            .create(
                Collection::Registrations,
                Record::new().with("packageId", package_id.as_str()),
            )
            .unwrap();

        let mut service = CatalogService::new(&mut store);
        assert!(service.delete_package(&package_id).is_err());
    }

    #[test]
    fn test_active_filters() {
        let mut store = create_test_store();
        store
            .update(Collection::Subjects, "subj_3", Record::new().with("isActive", false))
            .unwrap();
        store
            .create(
                Collection::Promotions,
                Record::new()
                    .with("name", "Back to school")
                    .with("isActive", true)
                    .with("startDate", "2024-08-15")
                    .with("endDate", "2024-09-15"),
            )
            .unwrap();
        store
            .create(Collection::Promotions, Record::new().with("name", "Draft"))
            .unwrap();

        let service = CatalogService::new(&mut store);
        let today = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();

        assert_eq!(service.active_subjects().len(), 3);
        assert!(service.active_packages().is_empty());
        assert_eq!(service.active_promotions(today).len(), 1);
        assert!(service.active_promotions(later).is_empty());
    }
}
