//! Receipt service
//!
//! Payments against registrations. Only completed receipts count towards what
//! has been paid, and a receipt can never take a registration past its total.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::{EduError, EduResult};
use crate::storage::{Collection, DataStore, Record};

/// Receipt status that counts as money received
pub const STATUS_COMPLETED: &str = "completed";

/// Service for receipts
pub struct ReceiptService<'a> {
    store: &'a mut DataStore,
}

impl<'a> ReceiptService<'a> {
    /// Create a new receipt service
    pub fn new(store: &'a mut DataStore) -> Self {
        Self { store }
    }

    /// Sum of completed receipts for a registration
    pub fn paid_amount(&self, registration_id: &str) -> f64 {
        self.store
            .filter(Collection::Receipts, |r| {
                r.get_str("registrationId") == Some(registration_id) && counts_as_paid(r)
            })
            .into_iter()
            .map(amount)
            .sum()
    }

    /// What is still owed on a registration
    pub fn remaining(&self, registration_id: &str) -> EduResult<f64> {
        let registration = self
            .store
            .read(Collection::Registrations, registration_id)
            .ok_or_else(|| EduError::NotFound {
                entity_type: "Registration",
                identifier: registration_id.to_string(),
            })?;

        let total = registration.get_f64("totalAmount").unwrap_or(0.0);
        Ok(total - self.paid_amount(registration_id))
    }

    /// Create or update a receipt
    ///
    /// New receipts get a fresh `receiptCode`; edits keep the existing one.
    /// When the receipt names a registration its amount must fit in the
    /// remaining balance, counting the receipt's own previous amount as free.
    pub fn save_receipt(&mut self, receipt: Record) -> EduResult<Record> {
        let mut receipt = receipt;
        let existing = receipt
            .id()
            .and_then(|id| self.store.read(Collection::Receipts, id))
            .cloned();

        if let Some(registration_id) = receipt.get_str("registrationId") {
            let mut available = self.remaining(registration_id)?;
            if let Some(old) = &existing {
                if old.get_str("registrationId") == Some(registration_id) && counts_as_paid(old) {
                    available += amount(old);
                }
            }

            let requested = amount(&receipt);
            if requested > available {
                return Err(EduError::Validation(format!(
                    "Amount {} exceeds the remaining balance of {}",
                    requested, available
                )));
            }
        }

        match &existing {
            Some(old) => match old.get("receiptCode") {
                Some(code) => receipt.set("receiptCode", code.clone()),
                None => {
                    receipt.remove("receiptCode");
                }
            },
            None => {
                let code = generate_receipt_code(self.store.now());
                receipt.set("receiptCode", code);
            }
        }

        self.store.save(Collection::Receipts, receipt)
    }
}

fn counts_as_paid(receipt: &Record) -> bool {
    receipt.get_str("status") == Some(STATUS_COMPLETED)
}

fn amount(receipt: &Record) -> f64 {
    receipt.get_f64("amount").unwrap_or(0.0)
}

/// `BL` + `yymmdd` + four random digits
pub fn generate_receipt_code(at: DateTime<Utc>) -> String {
    let suffix: u32 = rand::rng().random_range(0..10_000);
    format!("BL{}{:04}", at.format("%y%m%d"), suffix)
}
