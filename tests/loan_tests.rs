// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{borrower, d, date, pay, setup, standard_loan};
use easycollect::accounting::LoanTerms;
use easycollect::error::EngineError;
use easycollect::models::LoanStatus;
use easycollect::service;
use easycollect::store::{LoanStore, MemoryStore, SqliteStore};

#[test]
fn edit_recomputes_total_and_months() {
    let mut store = MemoryStore::new();
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);

    let terms = LoanTerms::new(d("2000"), d("5"), 20).unwrap();
    let edited = service::edit_loan(&mut store, loan.id, terms, None, date("2024-01-02")).unwrap();
    assert_eq!(edited.total_amount, d("2100"));
    assert_eq!(edited.duration_months, 1);
    assert_eq!(edited.duration_days, Some(20));
    assert_eq!(edited.start_date, date("2024-01-01"));

    let stored = store.loan(loan.id).unwrap().unwrap();
    assert_eq!(stored.total_amount, d("2100"));
    assert_eq!(stored.principal_amount, d("2000"));
}

#[test]
fn edit_below_amount_paid_is_rejected() {
    let mut store = MemoryStore::new();
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);
    service::collect_payment(&mut store, &pay(loan.id, "600", "2024-01-02")).unwrap();

    let terms = LoanTerms::new(d("500"), d("0"), 10).unwrap();
    let err = service::edit_loan(&mut store, loan.id, terms, None, date("2024-01-03")).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let stored = store.loan(loan.id).unwrap().unwrap();
    assert_eq!(stored.total_amount, d("1100"));
    assert_eq!(stored.principal_amount, d("1000"));
    assert_eq!(stored.amount_paid, d("600"));
}

#[test]
fn edit_to_exactly_paid_completes_the_loan() {
    let mut store = MemoryStore::new();
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);
    service::collect_payment(&mut store, &pay(loan.id, "600", "2024-01-02")).unwrap();

    let terms = LoanTerms::new(d("600"), d("0"), 10).unwrap();
    let edited = service::edit_loan(&mut store, loan.id, terms, None, date("2024-01-03")).unwrap();
    assert_eq!(edited.status, LoanStatus::Completed);
}

fn assert_delete_cascades<S: LoanStore>(store: &mut S) {
    let b = borrower(store, "Kamala Silva");
    let doomed = standard_loan(store, b.id);
    let kept = standard_loan(store, b.id);
    let first = service::collect_payment(store, &pay(doomed.id, "100", "2024-01-02")).unwrap();
    service::collect_payment(store, &pay(doomed.id, "100", "2024-01-03")).unwrap();
    service::collect_payment(store, &pay(kept.id, "50", "2024-01-03")).unwrap();

    service::delete_loan(store, doomed.id).unwrap();
    assert!(store.loan(doomed.id).unwrap().is_none());
    assert!(store.payment(first.id).unwrap().is_none());
    assert!(store.payments_for_loan(doomed.id).unwrap().is_empty());
    assert_eq!(store.payments().unwrap().len(), 1);
    assert_eq!(store.loan(kept.id).unwrap().unwrap().amount_paid, d("50"));
}

#[test]
fn delete_cascades_payments_in_memory() {
    assert_delete_cascades(&mut MemoryStore::new());
}

#[test]
fn delete_cascades_payments_in_sqlite() {
    let conn = setup();
    assert_delete_cascades(&mut SqliteStore::new(&conn));
}

#[test]
fn delete_missing_loan_is_not_found() {
    let conn = setup();
    let mut sqlite = SqliteStore::new(&conn);
    let err = service::delete_loan(&mut sqlite, 404).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "loan", id: 404 }));

    let mut memory = MemoryStore::new();
    let err = service::delete_loan(&mut memory, 404).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "loan", id: 404 }));
}

#[test]
fn state_reports_live_status_over_stored_one() {
    let mut store = MemoryStore::new();
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);

    let (shown, state) = service::loan_state(&store, loan.id, date("2024-02-01")).unwrap();
    assert_eq!(shown.status, LoanStatus::Overdue);
    assert_eq!(state.status, LoanStatus::Overdue);
    assert_eq!(store.loan(loan.id).unwrap().unwrap().status, LoanStatus::Active);
}
