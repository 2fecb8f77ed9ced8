// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounting::classify;
use crate::service::refresh_statuses;
use crate::store::{LoanStore, SqliteStore};
use crate::utils::{date_or_today, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rusqlite::Connection;
use std::collections::HashMap;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = date_or_today(sub.get_one::<String>("date"))?;
    let mut store = SqliteStore::new(conn);

    if sub.get_flag("fix") {
        let n = refresh_statuses(&mut store, as_of)?;
        println!("doctor: rewrote {} stale status(es)", n);
    }

    let rows = diagnose(&store, as_of)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Each row is `[issue, detail]`.
pub fn diagnose<S: LoanStore + ?Sized>(store: &S, as_of: NaiveDate) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let loans = store.loans()?;
    let payments = store.payments()?;

    let mut sums: HashMap<i64, Decimal> = HashMap::new();
    for p in &payments {
        *sums.entry(p.loan_id).or_insert(Decimal::ZERO) += p.amount;
    }

    // 1) Payments whose loan is gone
    for p in &payments {
        if !loans.iter().any(|l| l.id == p.loan_id) {
            rows.push(vec![
                "orphan_payment".into(),
                format!("payment {} -> missing loan {}", p.id, p.loan_id),
            ]);
        }
    }

    for l in &loans {
        // 2) Paid amount outside [0, total]
        if l.amount_paid < Decimal::ZERO || l.amount_paid > l.total_amount {
            rows.push(vec![
                "paid_out_of_range".into(),
                format!("loan {}: paid {} of {}", l.id, l.amount_paid, l.total_amount),
            ]);
        }
        // 3) Paid amount disagrees with the payment history
        let sum = sums.get(&l.id).copied().unwrap_or(Decimal::ZERO);
        if sum != l.amount_paid {
            rows.push(vec![
                "paid_mismatch".into(),
                format!("loan {}: amount_paid {} but payments sum {}", l.id, l.amount_paid, sum),
            ]);
        }
        // 4) Stored status lags the live classification
        let live = classify(l, as_of);
        if live != l.status {
            rows.push(vec![
                "stale_status".into(),
                format!("loan {}: stored {} but is {}", l.id, l.status, live),
            ]);
        }
    }
    Ok(rows)
}
