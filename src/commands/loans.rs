// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounting::{self, LoanTerms};
use crate::models::{Loan, LoanStatus};
use crate::service::{self, LoanRequest};
use crate::store::{LoanStore, SqliteStore};
use crate::utils::{
    currency_symbol, date_or_today, fmt_money, maybe_print_json, parse_date, pretty_table, today,
};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let mut store = SqliteStore::new(conn);
            service::delete_loan(&mut store, id)?;
            println!("Removed loan {} and its payments", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let borrower_id = *sub.get_one::<i64>("borrower").unwrap();
    let terms = LoanTerms::parse(
        sub.get_one::<String>("principal").unwrap(),
        sub.get_one::<String>("rate").unwrap(),
        sub.get_one::<String>("days").unwrap(),
    )?;
    let start_date = date_or_today(sub.get_one::<String>("start"))?;
    let mut store = SqliteStore::new(conn);
    let loan = service::create_loan(
        &mut store,
        &LoanRequest {
            borrower_id,
            terms,
            start_date,
        },
        today(),
    )?;
    let ccy = currency_symbol(conn)?;
    println!(
        "Created loan #{}: total {} over {} days, {} per day",
        loan.id,
        fmt_money(&loan.total_amount, &ccy),
        terms.duration_days,
        fmt_money(&terms.daily_payment(), &ccy)
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut store = SqliteStore::new(conn);
    let cur = store
        .loan(id)?
        .ok_or_else(|| anyhow!("Loan {} not found", id))?;
    let principal = sub
        .get_one::<String>("principal")
        .cloned()
        .unwrap_or_else(|| cur.principal_amount.to_string());
    let rate = sub
        .get_one::<String>("rate")
        .cloned()
        .unwrap_or_else(|| cur.interest_rate.to_string());
    let days = sub
        .get_one::<String>("days")
        .cloned()
        .unwrap_or_else(|| accounting::duration_days(&cur).to_string());
    let terms = LoanTerms::parse(&principal, &rate, &days)?;
    let start = match sub.get_one::<String>("start") {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };
    let loan = service::edit_loan(&mut store, id, terms, start, today())?;
    let ccy = currency_symbol(conn)?;
    println!(
        "Updated loan #{}: total {} (paid {})",
        loan.id,
        fmt_money(&loan.total_amount, &ccy),
        fmt_money(&loan.amount_paid, &ccy)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct LoanRow {
    pub id: i64,
    pub borrower_id: i64,
    pub borrower: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub remaining_amount: Decimal,
    pub daily_payment_amount: Decimal,
    pub progress_percent: Decimal,
    pub days_remaining: i64,
    pub status: LoanStatus,
}

pub fn loan_row(loan: &Loan, borrower: &str, as_of: NaiveDate) -> LoanRow {
    let st = accounting::loan_state(loan, as_of);
    LoanRow {
        id: loan.id,
        borrower_id: loan.borrower_id,
        borrower: borrower.to_string(),
        start_date: loan.start_date,
        end_date: st.end_date,
        total_amount: loan.total_amount,
        amount_paid: loan.amount_paid,
        remaining_amount: st.remaining_amount,
        daily_payment_amount: st.daily_payment_amount.round_dp(2),
        progress_percent: st.progress_percent,
        days_remaining: st.days_remaining,
        status: st.status,
    }
}

/// Loans with live status, filtered by the list command's flags.
pub fn query_loans<S: LoanStore + ?Sized>(
    store: &S,
    borrower: Option<i64>,
    status: Option<LoanStatus>,
    as_of: NaiveDate,
) -> Result<Vec<LoanRow>> {
    let names: HashMap<i64, String> = store
        .borrowers()?
        .into_iter()
        .map(|b| (b.id, b.display_name()))
        .collect();
    let loans = match borrower {
        Some(id) => store.loans_for_borrower(id)?,
        None => store.loans()?,
    };
    Ok(loans
        .iter()
        .map(|l| {
            let name = names.get(&l.borrower_id).map(String::as_str).unwrap_or("?");
            loan_row(l, name, as_of)
        })
        .filter(|r| status.is_none_or(|s| r.status == s))
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = date_or_today(sub.get_one::<String>("date"))?;
    let status = match sub.get_one::<String>("status") {
        Some(s) => Some(
            s.parse::<LoanStatus>()
                .with_context(|| format!("Invalid --status '{}'", s))?,
        ),
        None => None,
    };
    let store = SqliteStore::new(conn);
    let data = query_loans(&store, sub.get_one::<i64>("borrower").copied(), status, as_of)?;
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
                r.start_date.to_string(),
                r.end_date.to_string(),
                fmt_money(&r.total_amount, &ccy),
                fmt_money(&r.remaining_amount, &ccy),
                fmt_money(&r.daily_payment_amount, &ccy),
                format!("{}%", r.progress_percent),
                r.status.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "ID",
                "Borrower",
                "Start",
                "End",
                "Total",
                "Remaining",
                "Daily",
                "Progress",
                "Status",
            ],
            rows
        )
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let as_of = date_or_today(sub.get_one::<String>("date"))?;
    let store = SqliteStore::new(conn);
    let (loan, state) = service::loan_state(&store, id, as_of)?;
    let payments = store.payments_for_loan(id)?;
    if maybe_print_json(
        sub.get_flag("json"),
        &serde_json::json!({ "loan": loan, "state": state, "payments": payments }),
    )? {
        return Ok(());
    }
    let ccy = currency_symbol(conn)?;
    let borrower = store
        .borrower(loan.borrower_id)?
        .map(|b| b.display_name())
        .unwrap_or_default();
    println!("Loan #{} for {}", loan.id, borrower);
    println!(
        "Principal {} at {}% -> total {}",
        fmt_money(&loan.principal_amount, &ccy),
        loan.interest_rate,
        fmt_money(&loan.total_amount, &ccy)
    );
    println!(
        "{} -> {} ({} days left), status {}",
        loan.start_date, state.end_date, state.days_remaining, state.status
    );
    println!(
        "Paid {} / remaining {} ({}%), daily {}",
        fmt_money(&loan.amount_paid, &ccy),
        fmt_money(&state.remaining_amount, &ccy),
        state.progress_percent,
        fmt_money(&state.daily_payment_amount, &ccy)
    );
    let rows: Vec<Vec<String>> = payments
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.payment_date.to_string(),
                p.payment_time.map(|t| t.to_string()).unwrap_or_default(),
                fmt_money(&p.amount, &ccy),
                p.payment_method.clone(),
                p.notes.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Payment", "Date", "Time", "Amount", "Method", "Notes"], rows)
    );
    Ok(())
}
