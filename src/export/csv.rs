//! CSV export of a single collection
//!
//! Records have no fixed schema, so the header is the union of every field
//! name in the collection, in the order the fields are first seen.

use std::io::Write;

use serde_json::Value;

use crate::error::EduResult;
use crate::storage::{Collection, DataStore, Record};

/// Every field name across `records`, first-seen order
pub fn collect_columns(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.fields().keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// How a field value appears in a cell
///
/// Missing and `null` are empty, strings are written bare, objects and
/// arrays as their JSON text.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Write one collection as CSV; returns the number of rows written
pub fn export_collection_csv<W: Write>(
    store: &DataStore,
    collection: Collection,
    writer: W,
) -> EduResult<usize> {
    let records = store.records(collection);
    let columns = collect_columns(records);

    let mut csv_writer = csv::Writer::from_writer(writer);
    if !columns.is_empty() {
        csv_writer.write_record(&columns)?;
    }

    for record in records {
        let row = columns.iter().map(|c| cell_text(record.get(c)));
        csv_writer.write_record(row)?;
    }

    csv_writer.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use serde_json::json;

    fn create_test_store() -> DataStore {
        let mut store = DataStore::new(MemoryKeyValueStore::new());
        store.load_all();
        store
    }

    #[test]
    fn test_columns_in_first_seen_order() {
        let records = vec![
            Record::from_value(json!({"id": "1", "name": "A"})).unwrap(),
            Record::from_value(json!({"id": "2", "phone": "09", "name": "B"})).unwrap(),
        ];
        assert_eq!(collect_columns(&records), vec!["id", "name", "phone"]);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("a,b"))), "a,b");
        assert_eq!(cell_text(Some(&json!(1500000))), "1500000");
        assert_eq!(cell_text(Some(&json!({"x": 1}))), r#"{"x":1}"#);
    }

    #[test]
    fn test_export_escapes_and_fills_gaps() {
        let mut store = create_test_store();
        store
            .create(
                Collection::Students,
                Record::new().with("id", "s1").with("name", "Nguyen, An"),
            )
            .unwrap();
        store
            .create(
                Collection::Students,
                Record::new().with("id", "s2").with("note", "say \"hi\""),
            )
            .unwrap();

        let mut output = Vec::new();
        let rows = export_collection_csv(&store, Collection::Students, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(rows, 2);
        assert_eq!(
            lines[0],
            "id,name,createdAt,updatedAt,syncStatus,note"
        );
        assert!(lines[1].starts_with("s1,\"Nguyen, An\","));
        assert!(lines[1].ends_with(",pending,"));
        assert!(lines[2].starts_with("s2,,"));
        assert!(lines[2].ends_with(",\"say \"\"hi\"\"\""));
    }

    #[test]
    fn test_empty_collection_writes_nothing() {
        let store = create_test_store();
        let mut output = Vec::new();

        let rows = export_collection_csv(&store, Collection::Receipts, &mut output).unwrap();

        assert_eq!(rows, 0);
        assert!(output.is_empty());
    }
}
