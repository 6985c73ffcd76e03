//! Point-in-time copies of the whole store
//!
//! Every field is optional so snapshots written by older versions (or backup
//! files that only carry a subset of collections) still deserialize; missing
//! collections fall back to their defaults when restored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::{Collection, Record};

/// The `data` payload of a backup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teachers: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrations: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipts: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotions: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<Record>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_info: Option<Value>,
}

impl SnapshotData {
    pub fn collection(&self, collection: Collection) -> Option<&Vec<Record>> {
        self.slot(collection).as_ref()
    }

    pub fn set_collection(&mut self, collection: Collection, records: Vec<Record>) {
        *self.slot_mut(collection) = Some(records);
    }

    /// Collections this snapshot actually carries
    pub fn present_collections(&self) -> Vec<Collection> {
        Collection::ALL
            .into_iter()
            .filter(|c| self.collection(*c).is_some())
            .collect()
    }

    /// Total records across all carried collections
    pub fn record_count(&self) -> usize {
        Collection::ALL
            .iter()
            .filter_map(|c| self.collection(*c))
            .map(Vec::len)
            .sum()
    }

    fn slot(&self, collection: Collection) -> &Option<Vec<Record>> {
        match collection {
            Collection::Students => &self.students,
            Collection::Parents => &self.parents,
            Collection::Teachers => &self.teachers,
            Collection::Classes => &self.classes,
            Collection::Appointments => &self.appointments,
            Collection::Registrations => &self.registrations,
            Collection::Receipts => &self.receipts,
            Collection::Attendance => &self.attendance,
            Collection::Subjects => &self.subjects,
            Collection::Packages => &self.packages,
            Collection::Promotions => &self.promotions,
            Collection::Users => &self.users,
        }
    }

    fn slot_mut(&mut self, collection: Collection) -> &mut Option<Vec<Record>> {
        match collection {
            Collection::Students => &mut self.students,
            Collection::Parents => &mut self.parents,
            Collection::Teachers => &mut self.teachers,
            Collection::Classes => &mut self.classes,
            Collection::Appointments => &mut self.appointments,
            Collection::Registrations => &mut self.registrations,
            Collection::Receipts => &mut self.receipts,
            Collection::Attendance => &mut self.attendance,
            Collection::Subjects => &mut self.subjects,
            Collection::Packages => &mut self.packages,
            Collection::Promotions => &mut self.promotions,
            Collection::Users => &mut self.users,
        }
    }
}
