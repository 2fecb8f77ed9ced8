// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup::export_backup;
use crate::commands::loans::query_loans;
use crate::store::{LoanStore, SqliteStore};
use crate::utils::date_or_today;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("payments", sub)) => export_payments(conn, sub),
        Some(("loans", sub)) => export_loans(conn, sub),
        Some(("backup", sub)) => {
            let out = sub.get_one::<String>("out").unwrap();
            let as_of = date_or_today(sub.get_one::<String>("date"))?;
            let store = SqliteStore::new(conn);
            let doc = export_backup(&store, as_of)?;
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
            println!(
                "Backed up {} borrowers, {} loans, {} payments to {}",
                doc.borrowers.len(),
                doc.loans.len(),
                doc.payments.len(),
                out
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

fn format_of(sub: &clap::ArgMatches) -> Result<String> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    match fmt.as_str() {
        "csv" | "json" => Ok(fmt),
        _ => Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentExportRow {
    pub date: NaiveDate,
    pub borrower_name: String,
    pub loan_id: i64,
    pub loan_amount: Decimal,
    pub payment_amount: Decimal,
    pub remaining_amount: Decimal,
    pub method: String,
}

/// Payments in date order with the loan's balance right after each one.
pub fn payment_rows<S: LoanStore + ?Sized>(store: &S) -> Result<Vec<PaymentExportRow>> {
    let names: HashMap<i64, String> = store
        .borrowers()?
        .into_iter()
        .map(|b| (b.id, b.display_name()))
        .collect();
    let loans: HashMap<i64, _> = store.loans()?.into_iter().map(|l| (l.id, l)).collect();
    let mut payments = store.payments()?;
    payments.sort_by(|a, b| {
        a.payment_date
            .cmp(&b.payment_date)
            .then(a.payment_time.cmp(&b.payment_time))
            .then(a.id.cmp(&b.id))
    });

    let mut paid_so_far: HashMap<i64, Decimal> = HashMap::new();
    let mut rows = Vec::with_capacity(payments.len());
    for p in payments {
        let Some(loan) = loans.get(&p.loan_id) else {
            continue;
        };
        let paid = paid_so_far.entry(p.loan_id).or_insert(Decimal::ZERO);
        *paid += p.amount;
        rows.push(PaymentExportRow {
            date: p.payment_date,
            borrower_name: names.get(&loan.borrower_id).cloned().unwrap_or_default(),
            loan_id: loan.id,
            loan_amount: loan.total_amount,
            payment_amount: p.amount,
            remaining_amount: loan.total_amount - *paid,
            method: p.payment_method,
        });
    }
    Ok(rows)
}

fn export_payments(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = format_of(sub)?;
    let out = sub.get_one::<String>("out").unwrap();
    let store = SqliteStore::new(conn);
    let rows = payment_rows(&store)?;

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record([
            "Date",
            "Borrower Name",
            "Loan ID",
            "Loan Amount",
            "Payment Amount",
            "Remaining Amount",
            "Method",
        ])?;
        for r in &rows {
            wtr.write_record([
                r.date.to_string(),
                r.borrower_name.clone(),
                r.loan_id.to_string(),
                format!("{:.2}", r.loan_amount),
                format!("{:.2}", r.payment_amount),
                format!("{:.2}", r.remaining_amount),
                r.method.clone(),
            ])?;
        }
        wtr.flush()?;
    } else {
        std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
    }
    println!("Exported {} payments to {}", rows.len(), out);
    Ok(())
}

fn export_loans(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = format_of(sub)?;
    let out = sub.get_one::<String>("out").unwrap();
    let as_of = date_or_today(sub.get_one::<String>("date"))?;
    let store = SqliteStore::new(conn);
    let rows = query_loans(&store, None, None, as_of)?;

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record([
            "Loan ID",
            "Borrower Name",
            "Start Date",
            "End Date",
            "Loan Amount",
            "Amount Paid",
            "Remaining Amount",
            "Daily Payment",
            "Status",
        ])?;
        for r in &rows {
            wtr.write_record([
                r.id.to_string(),
                r.borrower.clone(),
                r.start_date.to_string(),
                r.end_date.to_string(),
                format!("{:.2}", r.total_amount),
                format!("{:.2}", r.amount_paid),
                format!("{:.2}", r.remaining_amount),
                format!("{:.2}", r.daily_payment_amount),
                r.status.to_string(),
            ])?;
        }
        wtr.flush()?;
    } else {
        std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
    }
    println!("Exported {} loans to {}", rows.len(), out);
    Ok(())
}
