// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounting::{self, all_borrower_stats};
use crate::models::{Loan, NewBorrower};
use crate::service;
use crate::store::{LoanStore, SqliteStore};
use crate::utils::{currency_symbol, date_or_today, fmt_money, maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let mut store = SqliteStore::new(conn);
            service::delete_borrower(&mut store, id, crate::utils::today())?;
            println!("Removed borrower {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn arg(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name).map(|s| s.to_string())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let input = NewBorrower {
        name: arg(sub, "name").unwrap_or_default(),
        phone: arg(sub, "phone").unwrap_or_default(),
        address: arg(sub, "address").unwrap_or_default(),
        title: arg(sub, "title"),
        first_name: arg(sub, "first_name"),
        last_name: arg(sub, "last_name"),
        nic_number: arg(sub, "nic"),
    };
    let mut store = SqliteStore::new(conn);
    let b = service::create_borrower(&mut store, input)?;
    println!("Added borrower #{} '{}'", b.id, b.display_name());
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut store = SqliteStore::new(conn);
    let cur = store
        .borrower(id)?
        .ok_or_else(|| anyhow!("Borrower {} not found", id))?;
    let input = NewBorrower {
        name: arg(sub, "name").unwrap_or(cur.name),
        phone: arg(sub, "phone").unwrap_or(cur.phone),
        address: arg(sub, "address").unwrap_or(cur.address),
        title: arg(sub, "title").or(cur.title),
        first_name: arg(sub, "first_name").or(cur.first_name),
        last_name: arg(sub, "last_name").or(cur.last_name),
        nic_number: arg(sub, "nic").or(cur.nic_number),
    };
    let b = service::update_borrower(&mut store, id, input)?;
    println!("Updated borrower #{} '{}'", b.id, b.display_name());
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = date_or_today(sub.get_one::<String>("date"))?;
    let store = SqliteStore::new(conn);
    let borrowers = store.borrowers()?;
    let stats = all_borrower_stats(&borrowers, &store.loans()?, as_of);
    if maybe_print_json(sub.get_flag("json"), &stats)? {
        return Ok(());
    }
    let ccy = currency_symbol(conn)?;
    let rows: Vec<Vec<String>> = borrowers
        .iter()
        .zip(stats.iter())
        .map(|(b, s)| {
            vec![
                b.id.to_string(),
                s.name.clone(),
                b.phone.clone(),
                s.total_loans.to_string(),
                s.open_loans().to_string(),
                fmt_money(&s.total_amount, &ccy),
                fmt_money(&s.total_paid, &ccy),
                fmt_money(&s.remaining_amount, &ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Phone", "Loans", "Open", "Total", "Paid", "Remaining"],
            rows
        )
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let as_of = date_or_today(sub.get_one::<String>("date"))?;
    let store = SqliteStore::new(conn);
    let b = store
        .borrower(id)?
        .ok_or_else(|| anyhow!("Borrower {} not found", id))?;
    let loans: Vec<Loan> = store
        .loans_for_borrower(id)?
        .into_iter()
        .map(|l| Loan {
            status: accounting::classify(&l, as_of),
            ..l
        })
        .collect();
    let stats = service::borrower_stats(&store, id, as_of)?;
    if maybe_print_json(
        sub.get_flag("json"),
        &serde_json::json!({ "borrower": b, "stats": stats, "loans": loans }),
    )? {
        return Ok(());
    }
    let ccy = currency_symbol(conn)?;
    println!("#{} {}", b.id, b.display_name());
    println!("Phone:   {}", b.phone);
    println!("Address: {}", b.address);
    if let Some(nic) = &b.nic_number {
        println!("NIC:     {}", nic);
    }
    println!(
        "Loans: {} ({} open)  Total {}  Paid {}  Remaining {}",
        stats.total_loans,
        stats.open_loans(),
        fmt_money(&stats.total_amount, &ccy),
        fmt_money(&stats.total_paid, &ccy),
        fmt_money(&stats.remaining_amount, &ccy)
    );
    let rows: Vec<Vec<String>> = loans
        .iter()
        .map(|l| {
            let st = accounting::loan_state(l, as_of);
            vec![
                l.id.to_string(),
                l.start_date.to_string(),
                st.end_date.to_string(),
                fmt_money(&l.total_amount, &ccy),
                fmt_money(&st.remaining_amount, &ccy),
                format!("{}%", st.progress_percent),
                st.status.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Loan", "Start", "End", "Total", "Remaining", "Progress", "Status"],
            rows
        )
    );
    Ok(())
}
