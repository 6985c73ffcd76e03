//! Record CLI commands
//!
//! Generic CRUD over any collection. Subjects and packages go through the
//! catalog service so they can't be deleted while registrations use them, and
//! receipts go through the receipt service for balance checks.

use clap::Subcommand;
use serde_json::Value;

use crate::display::{format_record_details, format_record_list};
use crate::error::{EduError, EduResult};
use crate::services::{CatalogService, ReceiptService, ReferenceResolver};
use crate::storage::{Collection, DataStore, Record};

/// Record subcommands
#[derive(Subcommand)]
pub enum RecordCommands {
    /// List the records of a collection
    List {
        /// Collection name (e.g. students, receipts)
        collection: String,
        /// Maximum number of records to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show one record
    Show {
        /// Collection name
        collection: String,
        /// Record ID
        id: String,
    },
    /// Add a record
    Add {
        /// Collection name
        collection: String,
        /// Field assignment, `key=value`; values are parsed as JSON when possible
        #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },
    /// Update fields of a record
    Update {
        /// Collection name
        collection: String,
        /// Record ID
        id: String,
        /// Field assignment, `key=value`
        #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },
    /// Delete a record
    Delete {
        /// Collection name
        collection: String,
        /// Record ID
        id: String,
    },
}

/// Parse `key=value`; the value is JSON if it parses, otherwise a string
pub fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{}'", s));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn build_record(fields: Vec<(String, Value)>) -> Record {
    let mut record = Record::new();
    for (key, value) in fields {
        record.set(&key, value);
    }
    record
}

/// Handle a record command
pub fn handle_record_command(store: &mut DataStore, cmd: RecordCommands) -> EduResult<()> {
    match cmd {
        RecordCommands::List { collection, limit } => {
            let collection: Collection = collection.parse()?;
            let records = store.records(collection);
            let shown = &records[..limit.unwrap_or(records.len()).min(records.len())];

            println!("{}", format_record_list(collection, shown));
            if shown.len() < records.len() {
                println!("(showing {} of {})", shown.len(), records.len());
            }
        }

        RecordCommands::Show { collection, id } => {
            let collection: Collection = collection.parse()?;
            let record = store
                .read(collection, &id)
                .ok_or_else(|| EduError::record_not_found(&id))?;

            print!("{}", format_record_details(record));
            if collection == Collection::Receipts {
                let resolver = ReferenceResolver::new(store);
                println!();
                println!("Student: {}", resolver.receipt_student_name(record));
            }
            if collection == Collection::Registrations {
                let resolver = ReferenceResolver::new(store);
                let student = record.get_str("studentId").unwrap_or_default();
                println!();
                println!("Student: {}", resolver.student_name(student));
                if let Some(subject) = record.get_str("subjectId") {
                    println!("Subject: {}", resolver.subject_name(subject));
                }
                let service = ReceiptService::new(store);
                println!("Paid:      {}", service.paid_amount(&id));
                println!("Remaining: {}", service.remaining(&id)?);
            }
        }

        RecordCommands::Add { collection, fields } => {
            let collection: Collection = collection.parse()?;
            let record = build_record(fields);

            let created = if collection == Collection::Receipts {
                ReceiptService::new(store).save_receipt(record)?
            } else {
                store.create(collection, record)?
            };

            println!(
                "Created {} record: {}",
                collection.name(),
                created.id().unwrap_or_default()
            );
        }

        RecordCommands::Update {
            collection,
            id,
            fields,
        } => {
            let collection: Collection = collection.parse()?;
            if fields.is_empty() {
                return Err(EduError::Validation("Nothing to update, pass --set KEY=VALUE".into()));
            }
            let updates = build_record(fields);

            let updated = if collection == Collection::Receipts {
                // Balance checks need the full receipt, not just the changes
                let mut merged = store
                    .read(collection, &id)
                    .cloned()
                    .ok_or_else(|| EduError::record_not_found(&id))?;
                merged.merge(&updates);
                ReceiptService::new(store).save_receipt(merged)?
            } else {
                store.update(collection, &id, updates)?
            };

            println!("Updated {} record: {}", collection.name(), id);
            print!("{}", format_record_details(&updated));
        }

        RecordCommands::Delete { collection, id } => {
            let collection: Collection = collection.parse()?;
            match collection {
                Collection::Subjects => CatalogService::new(store).delete_subject(&id)?,
                Collection::Packages => CatalogService::new(store).delete_package(&id)?,
                Collection::Promotions => CatalogService::new(store).delete_promotion(&id)?,
                other => store.delete(other, &id)?,
            };
            println!("Deleted {} record: {}", collection.name(), id);
        }
    }

    Ok(())
}
