// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{borrower, d, date, pay, setup, standard_loan};
use easycollect::commands::{doctor, payments};
use easycollect::models::LoanStatus;
use easycollect::service;
use easycollect::store::{LoanStore, SqliteStore};
use easycollect::{cli, commands, utils};

fn collect_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["easycollect", "pay", "collect"];
    argv.extend_from_slice(args);
    let m = cli::build_cli().get_matches_from(argv);
    let (_, pay_m) = m.subcommand().unwrap();
    let (_, collect) = pay_m.subcommand().unwrap();
    collect.clone()
}

#[test]
fn collect_defaults_to_suggested_installment() {
    let conn = setup();
    let mut store = SqliteStore::new(&conn);
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);

    let loan_arg = loan.id.to_string();
    let sub = collect_matches(&["--loan", &loan_arg, "--date", "2024-01-05"]);
    let req = payments::collect_request(&conn, &sub).unwrap();
    assert_eq!(req.amount, d("110"));
    assert_eq!(req.payment_date, date("2024-01-05"));
    assert_eq!(req.payment_time, None);
    assert_eq!(req.payment_method.as_deref(), Some("cash"));

    service::collect_payment(&mut store, &pay(loan.id, "1050", "2024-01-05")).unwrap();
    let req = payments::collect_request(&conn, &sub).unwrap();
    assert_eq!(req.amount, d("50"));
}

#[test]
fn collect_uses_configured_method_and_explicit_time() {
    let conn = setup();
    let mut store = SqliteStore::new(&conn);
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);
    utils::set_setting(&conn, "default_payment_method", "bank").unwrap();

    let loan_arg = loan.id.to_string();
    let sub = collect_matches(&[
        "--loan", &loan_arg, "--amount", "75", "--date", "2024-01-03", "--time", "14:05",
    ]);
    let req = payments::collect_request(&conn, &sub).unwrap();
    assert_eq!(req.amount, d("75"));
    assert_eq!(req.payment_method.as_deref(), Some("bank"));
    assert_eq!(req.payment_time.unwrap().to_string(), "14:05:00");
}

#[test]
fn config_rejects_unknown_keys() {
    let conn = setup();
    assert_eq!(utils::currency_symbol(&conn).unwrap(), "Rs");
    utils::set_setting(&conn, "currency", "LKR").unwrap();
    assert_eq!(utils::currency_symbol(&conn).unwrap(), "LKR");
    assert!(utils::set_setting(&conn, "colour", "red").is_err());
    assert!(utils::set_setting(&conn, "currency", "   ").is_err());

    let m = cli::build_cli().get_matches_from(["easycollect", "config", "get", "nope"]);
    if let Some(("config", sub)) = m.subcommand() {
        assert!(commands::config::handle(&conn, sub).is_err());
    }
}

#[test]
fn doctor_finds_and_fixes_stale_status() {
    let conn = setup();
    let mut store = SqliteStore::new(&conn);
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);
    service::collect_payment(&mut store, &pay(loan.id, "100", "2024-01-02")).unwrap();

    assert!(doctor::diagnose(&store, date("2024-01-05")).unwrap().is_empty());

    let rows = doctor::diagnose(&store, date("2024-02-01")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "stale_status");

    let m = cli::build_cli().get_matches_from([
        "easycollect",
        "doctor",
        "--date",
        "2024-02-01",
        "--fix",
    ]);
    if let Some(("doctor", sub)) = m.subcommand() {
        commands::doctor::handle(&conn, sub).unwrap();
    }
    assert_eq!(store.loan(loan.id).unwrap().unwrap().status, LoanStatus::Overdue);
    assert!(doctor::diagnose(&store, date("2024-02-01")).unwrap().is_empty());
}

#[test]
fn doctor_flags_paid_mismatch() {
    let conn = setup();
    let mut store = SqliteStore::new(&conn);
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);
    conn.execute("UPDATE loans SET amount_paid='40' WHERE id=?1", [loan.id]).unwrap();

    let rows = doctor::diagnose(&store, date("2024-01-02")).unwrap();
    assert!(rows.iter().any(|r| r[0] == "paid_mismatch"));
}
