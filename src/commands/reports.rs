// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounting::{
    all_borrower_stats, collection_series, daily_collection, payments_on, portfolio_summary,
};
use crate::commands::loans::query_loans;
use crate::models::LoanStatus;
use crate::store::{LoanStore, SqliteStore};
use crate::utils::{
    currency_symbol, date_or_today, fmt_money, maybe_print_json, parse_date, pretty_table,
};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("dashboard", sub)) => dashboard(conn, sub)?,
        Some(("daily", sub)) => daily(conn, sub)?,
        Some(("borrowers", sub)) => borrowers(conn, sub)?,
        Some(("overdue", sub)) => overdue(conn, sub)?,
        Some(("collections", sub)) => collections(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn dashboard(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = date_or_today(sub.get_one::<String>("date"))?;
    let store = SqliteStore::new(conn);
    let summary = portfolio_summary(&store.loans()?, &store.payments()?, as_of);
    if maybe_print_json(sub.get_flag("json"), &summary)? {
        return Ok(());
    }
    let ccy = currency_symbol(conn)?;
    let rows = vec![
        vec!["Total loans".into(), summary.total_loans.to_string()],
        vec!["Active".into(), summary.active_loans.to_string()],
        vec!["Overdue".into(), summary.overdue_loans.to_string()],
        vec!["Completed".into(), summary.completed_loans.to_string()],
        vec![
            "Total loan amount".into(),
            fmt_money(&summary.total_loan_amount, &ccy),
        ],
        vec![
            "Total collected".into(),
            fmt_money(&summary.total_collected, &ccy),
        ],
        vec!["Pending".into(), fmt_money(&summary.pending_amount, &ccy)],
        vec![
            "Overdue outstanding".into(),
            fmt_money(&summary.overdue_payments_amount, &ccy),
        ],
        vec!["Payments".into(), summary.payment_count.to_string()],
        vec![
            "Average payment".into(),
            fmt_money(&summary.average_payment, &ccy),
        ],
    ];
    println!("Dashboard as of {}", as_of);
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

fn daily(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let day = date_or_today(sub.get_one::<String>("date"))?;
    let store = SqliteStore::new(conn);
    let payments = store.payments()?;
    let totals = daily_collection(&payments, day);
    let todays = payments_on(&payments, day);
    if maybe_print_json(
        sub.get_flag("json"),
        &serde_json::json!({ "summary": totals, "payments": todays }),
    )? {
        return Ok(());
    }

    let loans: HashMap<i64, _> = store.loans()?.into_iter().map(|l| (l.id, l)).collect();
    let names: HashMap<i64, String> = store
        .borrowers()?
        .into_iter()
        .map(|b| (b.id, b.display_name()))
        .collect();
    let ccy = currency_symbol(conn)?;
    let rows: Vec<Vec<String>> = todays
        .iter()
        .map(|p| {
            let loan = loans.get(&p.loan_id);
            let name = loan
                .and_then(|l| names.get(&l.borrower_id))
                .cloned()
                .unwrap_or_default();
            vec![
                p.payment_time.map(|t| t.to_string()).unwrap_or_default(),
                name,
                format!("#{}", p.loan_id),
                fmt_money(&p.amount, &ccy),
                p.payment_method.clone(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Time", "Borrower", "Loan", "Amount", "Method"], rows));
    println!(
        "{}: {} payment(s), total {}, average {}",
        day,
        totals.count,
        fmt_money(&totals.total, &ccy),
        fmt_money(&totals.average, &ccy)
    );
    Ok(())
}

fn borrowers(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = date_or_today(sub.get_one::<String>("date"))?;
    let store = SqliteStore::new(conn);
    let stats = all_borrower_stats(&store.borrowers()?, &store.loans()?, as_of);
    if maybe_print_json(sub.get_flag("json"), &stats)? {
        return Ok(());
    }
    let ccy = currency_symbol(conn)?;
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.total_loans.to_string(),
                s.active_loans.to_string(),
                s.overdue_loans.to_string(),
                fmt_money(&s.total_amount, &ccy),
                fmt_money(&s.total_paid, &ccy),
                fmt_money(&s.remaining_amount, &ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Borrower", "Loans", "Active", "Overdue", "Total", "Paid", "Remaining"],
            rows
        )
    );
    Ok(())
}

fn overdue(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = date_or_today(sub.get_one::<String>("date"))?;
    let store = SqliteStore::new(conn);
    let data = query_loans(&store, None, Some(LoanStatus::Overdue), as_of)?;
    if maybe_print_json(sub.get_flag("json"), &data)? {
        return Ok(());
    }
    let ccy = currency_symbol(conn)?;
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.borrower.clone(),
                r.end_date.to_string(),
                (as_of - r.end_date).num_days().to_string(),
                fmt_money(&r.remaining_amount, &ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Loan", "Borrower", "Ended", "Days late", "Outstanding"], rows)
    );
    Ok(())
}

fn collections(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    if from > to {
        return Err(anyhow!("--from {} is after --to {}", from, to));
    }
    let store = SqliteStore::new(conn);
    let series = collection_series(&store.payments()?, from, to);
    if maybe_print_json(sub.get_flag("json"), &series)? {
        return Ok(());
    }
    let ccy = currency_symbol(conn)?;
    let rows: Vec<Vec<String>> = series
        .iter()
        .map(|d| {
            vec![
                d.date.to_string(),
                d.count.to_string(),
                fmt_money(&d.total, &ccy),
                fmt_money(&d.average, &ccy),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Date", "Payments", "Total", "Average"], rows));
    Ok(())
}
