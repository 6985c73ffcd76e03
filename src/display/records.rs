//! Record display formatting
//!
//! Records carry arbitrary fields, so the list view picks the first few
//! domain fields it finds and the detail view shows everything.

use crate::export::{cell_text, collect_columns};
use crate::storage::record::{FIELD_CREATED_AT, FIELD_ID, FIELD_SYNC_STATUS, FIELD_UPDATED_AT};
use crate::storage::{Collection, Record};

/// Domain columns shown next to the id in list view
const LIST_COLUMNS: usize = 4;

/// Longest cell shown in list view before truncating
const MAX_CELL_WIDTH: usize = 28;

fn is_metadata(field: &str) -> bool {
    matches!(
        field,
        FIELD_ID | FIELD_CREATED_AT | FIELD_UPDATED_AT | FIELD_SYNC_STATUS
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(len)))
}

/// Format a collection as a table
pub fn format_record_list(collection: Collection, records: &[Record]) -> String {
    if records.is_empty() {
        return format!("No {} found.", collection);
    }

    let mut columns = vec![FIELD_ID.to_string()];
    columns.extend(
        collect_columns(records)
            .into_iter()
            .filter(|c| !is_metadata(c))
            .take(LIST_COLUMNS),
    );

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| truncate(&cell_text(r.get(c)), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    // Calculate column widths
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    let header: Vec<String> = columns.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
    output.push_str(header.join("  ").trim_end());
    output.push('\n');

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&separator.join("  "));
    output.push('\n');

    for row in &rows {
        let cells: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        output.push_str(cells.join("  ").trim_end());
        output.push('\n');
    }

    output.push_str(&format!("\n{} record(s)", records.len()));
    output
}

/// Format one record with every field
pub fn format_record_details(record: &Record) -> String {
    let width = record
        .fields()
        .keys()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for (key, value) in record.fields() {
        output.push_str(&format!(
            "{}  {}\n",
            pad(&format!("{}:", key), width + 1),
            cell_text(Some(value))
        ));
    }
    output
}
