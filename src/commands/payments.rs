// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::service::{self, CollectRequest};
use crate::store::{LoanStore, SqliteStore};
use crate::utils::{
    currency_symbol, default_payment_method, fmt_money, maybe_print_json, now_time, parse_date,
    parse_decimal, parse_time, pretty_table, today,
};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("collect", sub)) => collect(conn, sub)?,
        Some(("reverse", sub)) => reverse(conn, sub)?,
        Some(("history", sub)) => history(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Builds the request the collect dialog would submit. The amount defaults
/// to the loan's suggested installment.
pub fn collect_request(conn: &Connection, sub: &clap::ArgMatches) -> Result<CollectRequest> {
    let loan_id = *sub.get_one::<i64>("loan").unwrap();
    let (payment_date, payment_time) = match sub.get_one::<String>("date") {
        Some(d) => (parse_date(d)?, None),
        None => (today(), Some(now_time())),
    };
    let payment_time = match sub.get_one::<String>("time") {
        Some(t) => Some(parse_time(t)?),
        None => payment_time,
    };
    let amount = match sub.get_one::<String>("amount") {
        Some(a) => parse_decimal(a)?,
        None => {
            let store = SqliteStore::new(conn);
            let (_, state) = service::loan_state(&store, loan_id, payment_date)?;
            state.suggested_payment
        }
    };
    let method = match sub.get_one::<String>("method") {
        Some(m) => m.to_string(),
        None => default_payment_method(conn)?,
    };
    Ok(CollectRequest {
        loan_id,
        amount,
        payment_date,
        payment_time,
        payment_method: Some(method),
        notes: sub.get_one::<String>("notes").map(|s| s.to_string()),
    })
}

fn collect(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let req = collect_request(conn, sub)?;
    let mut store = SqliteStore::new(conn);
    let payment = service::collect_payment(&mut store, &req)?;
    let (_, state) = service::loan_state(&store, payment.loan_id, payment.payment_date)?;
    let ccy = currency_symbol(conn)?;
    println!(
        "Collected {} on loan #{} (payment #{}); remaining {}, status {}",
        fmt_money(&payment.amount, &ccy),
        payment.loan_id,
        payment.id,
        fmt_money(&state.remaining_amount, &ccy),
        state.status
    );
    Ok(())
}

fn reverse(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut store = SqliteStore::new(conn);
    let as_of = today();
    let payment = match (
        sub.get_one::<i64>("payment").copied(),
        sub.get_one::<i64>("loan").copied(),
    ) {
        (Some(pid), _) => service::reverse_payment(&mut store, pid, as_of)?,
        (None, Some(lid)) => service::reverse_latest_payment(&mut store, lid, as_of)?,
        (None, None) => return Err(anyhow!("Pass --payment <id> or --loan <id>")),
    };
    let ccy = currency_symbol(conn)?;
    println!(
        "Reversed payment #{} of {} on loan #{}",
        payment.id,
        fmt_money(&payment.amount, &ccy),
        payment.loan_id
    );
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let loan_id = *sub.get_one::<i64>("loan").unwrap();
    let store = SqliteStore::new(conn);
    if store.loan(loan_id)?.is_none() {
        return Err(anyhow!("Loan {} not found", loan_id));
    }
    let payments = store.payments_for_loan(loan_id)?;
    if maybe_print_json(sub.get_flag("json"), &payments)? {
        return Ok(());
    }
    let ccy = currency_symbol(conn)?;
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
        pretty_table(&["ID", "Date", "Time", "Amount", "Method", "Notes"], rows)
    );
    Ok(())
}
