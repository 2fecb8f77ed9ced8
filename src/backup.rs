// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Whole-database JSON backups.
//!
//! Import accepts each section as an array or as an id-keyed map, keeps only
//! known columns, and then requires every record to parse as its typed model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::info;

use crate::accounting::{MAX_DURATION_DAYS, classify, months_for_days};
use crate::error::{EngineError, Result};
use crate::models::{Borrower, Loan, Payment};
use crate::store::LoanStore;
use crate::utils::now_stamp;

pub const BACKUP_VERSION: &str = "1.0";

pub const BORROWER_COLUMNS: &[&str] = &[
    "id",
    "name",
    "phone",
    "address",
    "title",
    "first_name",
    "last_name",
    "nic_number",
    "created_at",
    "updated_at",
];

pub const LOAN_COLUMNS: &[&str] = &[
    "id",
    "borrower_id",
    "principal_amount",
    "interest_rate",
    "duration_months",
    "duration_days",
    "total_amount",
    "amount_paid",
    "start_date",
    "status",
    "next_payment_date",
    "arrears",
    "created_at",
    "updated_at",
];

pub const PAYMENT_COLUMNS: &[&str] = &[
    "id",
    "loan_id",
    "amount",
    "payment_date",
    "payment_time",
    "payment_method",
    "notes",
    "created_at",
];

#[derive(Debug, Clone, Serialize)]
pub struct Backup {
    pub borrowers: Vec<Borrower>,
    pub loans: Vec<Loan>,
    pub payments: Vec<Payment>,
    #[serde(rename = "exportDate")]
    pub export_date: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub borrowers: usize,
    pub loans: usize,
    pub payments: usize,
}

/// Snapshot of every table. Loan statuses are written as classified on `as_of`.
pub fn export_backup<S: LoanStore + ?Sized>(store: &S, as_of: NaiveDate) -> Result<Backup> {
    let loans = store
        .loans()?
        .into_iter()
        .map(|l| Loan {
            status: classify(&l, as_of),
            ..l
        })
        .collect();
    Ok(Backup {
        borrowers: store.borrowers()?,
        loans,
        payments: store.payments()?,
        export_date: now_stamp(),
        version: BACKUP_VERSION.to_string(),
    })
}

/// Section body as a list of objects. Missing or null sections are empty.
fn section_records<'a>(
    envelope: &'a Map<String, Value>,
    section: &str,
) -> Result<Vec<&'a Map<String, Value>>> {
    let values: Vec<&Value> = match envelope.get(section) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        Some(other) => {
            return Err(EngineError::validation(format!(
                "'{}' must be an array or an object, got {}",
                section,
                kind(other)
            )));
        }
    };
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_object().ok_or_else(|| {
                EngineError::validation(format!("{}[{}] is {}, not a record", section, i, kind(v)))
            })
        })
        .collect()
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn whitelisted<T: DeserializeOwned>(
    record: &Map<String, Value>,
    columns: &[&str],
    section: &str,
) -> Result<T> {
    let kept: Map<String, Value> = record
        .iter()
        .filter(|(k, v)| columns.contains(&k.as_str()) && !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    serde_json::from_value(Value::Object(kept))
        .map_err(|e| EngineError::validation(format!("bad {} record: {}", section, e)))
}

fn typed<T: DeserializeOwned>(
    envelope: &Map<String, Value>,
    section: &str,
    columns: &[&str],
) -> Result<Vec<T>> {
    section_records(envelope, section)?
        .into_iter()
        .map(|r| whitelisted(r, columns, section))
        .collect()
}

/// Typed contents of a backup document, checked but not yet stored.
pub fn parse_backup(doc: &Value) -> Result<(Vec<Borrower>, Vec<Loan>, Vec<Payment>)> {
    let envelope = doc.as_object().ok_or_else(|| {
        EngineError::validation(format!("backup must be an object, got {}", kind(doc)))
    })?;
    let borrowers: Vec<Borrower> = typed(envelope, "borrowers", BORROWER_COLUMNS)?;
    let loans: Vec<Loan> = typed(envelope, "loans", LOAN_COLUMNS)?;
    let payments: Vec<Payment> = typed(envelope, "payments", PAYMENT_COLUMNS)?;

    let max_months = months_for_days(MAX_DURATION_DAYS);
    for l in &loans {
        let days_ok = l
            .duration_days
            .is_none_or(|d| (1..=MAX_DURATION_DAYS).contains(&d));
        if !days_ok || !(1..=max_months).contains(&l.duration_months) {
            return Err(EngineError::validation(format!(
                "loan {} has duration {:?} days / {} months outside 1..={} days",
                l.id, l.duration_days, l.duration_months, MAX_DURATION_DAYS
            )));
        }
        if l.principal_amount <= Decimal::ZERO || l.total_amount <= Decimal::ZERO {
            return Err(EngineError::validation(format!(
                "loan {} has a non-positive principal or total",
                l.id
            )));
        }
        if l.amount_paid < Decimal::ZERO || l.amount_paid > l.total_amount {
            return Err(EngineError::validation(format!(
                "loan {} has amount_paid {} outside 0..={}",
                l.id, l.amount_paid, l.total_amount
            )));
        }
    }
    if let Some(p) = payments.iter().find(|p| p.amount <= Decimal::ZERO) {
        return Err(EngineError::validation(format!(
            "payment {} has non-positive amount {}",
            p.id, p.amount
        )));
    }
    Ok((borrowers, loans, payments))
}

/// Every loan's borrower and every payment's loan must be in the backup or
/// already stored.
fn check_references<S: LoanStore + ?Sized>(
    store: &S,
    borrowers: &[Borrower],
    loans: &[Loan],
    payments: &[Payment],
) -> Result<()> {
    let borrower_ids: HashSet<i64> = borrowers.iter().map(|b| b.id).collect();
    for l in loans {
        if !borrower_ids.contains(&l.borrower_id) && store.borrower(l.borrower_id)?.is_none() {
            return Err(EngineError::not_found("borrower", l.borrower_id));
        }
    }
    let loan_ids: HashSet<i64> = loans.iter().map(|l| l.id).collect();
    for p in payments {
        if !loan_ids.contains(&p.loan_id) && store.loan(p.loan_id)?.is_none() {
            return Err(EngineError::not_found("loan", p.loan_id));
        }
    }
    Ok(())
}

pub fn import_backup<S: LoanStore + ?Sized>(store: &mut S, doc: &Value) -> Result<ImportCounts> {
    let (borrowers, loans, payments) = parse_backup(doc)?;
    check_references(store, &borrowers, &loans, &payments)?;
    store.restore(&borrowers, &loans, &payments)?;
    let counts = ImportCounts {
        borrowers: borrowers.len(),
        loans: loans.len(),
        payments: payments.len(),
    };
    info!(
        borrowers = counts.borrowers,
        loans = counts.loans,
        payments = counts.payments,
        "backup imported"
    );
    Ok(counts)
}
