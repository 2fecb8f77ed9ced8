// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{borrower, d, date, pay, standard_loan};
use easycollect::accounting::{collection_series, daily_collection, portfolio_summary};
use easycollect::models::Loan;
use easycollect::service;
use easycollect::store::{LoanStore, MemoryStore};
use rust_decimal::Decimal;

#[test]
fn single_payment_day() {
    let mut store = MemoryStore::new();
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);
    service::collect_payment(&mut store, &pay(loan.id, "100", "2024-01-02")).unwrap();

    let payments = store.payments().unwrap();
    let day = daily_collection(&payments, date("2024-01-02"));
    assert_eq!(day.total, d("100"));
    assert_eq!(day.count, 1);
    assert_eq!(day.average, d("100"));

    let other = daily_collection(&payments, date("2024-01-03"));
    assert_eq!(other.count, 0);
    assert_eq!(other.total, Decimal::ZERO);
    assert_eq!(other.average, Decimal::ZERO);
}

#[test]
fn empty_portfolio_is_all_zero() {
    let s = portfolio_summary(&[], &[], date("2024-01-01"));
    assert_eq!(s.total_loans, 0);
    assert_eq!(s.total_loan_amount, Decimal::ZERO);
    assert_eq!(s.total_collected, Decimal::ZERO);
    assert_eq!(s.pending_amount, Decimal::ZERO);
    assert_eq!(s.payment_count, 0);
    assert_eq!(s.average_payment, Decimal::ZERO);
}

#[test]
fn portfolio_counts_by_live_status() {
    let mut store = MemoryStore::new();
    let b = borrower(&mut store, "Nimal Perera");
    let paid_off = standard_loan(&mut store, b.id);
    let partial = standard_loan(&mut store, b.id);
    standard_loan(&mut store, b.id);

    service::collect_payment(&mut store, &pay(paid_off.id, "1100", "2024-01-03")).unwrap();
    service::collect_payment(&mut store, &pay(partial.id, "300", "2024-01-03")).unwrap();

    let loans = store.loans().unwrap();
    let payments = store.payments().unwrap();

    let early = portfolio_summary(&loans, &payments, date("2024-01-05"));
    assert_eq!(early.total_loans, 3);
    assert_eq!(early.completed_loans, 1);
    assert_eq!(early.active_loans, 2);
    assert_eq!(early.overdue_loans, 0);
    assert_eq!(early.total_loan_amount, d("3300"));
    assert_eq!(early.total_collected, d("1400"));
    assert_eq!(early.pending_amount, d("1900"));
    assert_eq!(early.payment_count, 2);
    assert_eq!(early.average_payment, d("700"));

    let late = portfolio_summary(&loans, &payments, date("2024-02-01"));
    assert_eq!(late.overdue_loans, 2);
    assert_eq!(late.active_loans, 0);
    assert_eq!(late.overdue_payments_amount, d("1900"));
}

#[test]
fn series_covers_every_day_in_range() {
    let mut store = MemoryStore::new();
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);
    for (amount, on) in [("100", "2024-01-02"), ("50", "2024-01-04"), ("70", "2024-01-04")] {
        service::collect_payment(&mut store, &pay(loan.id, amount, on)).unwrap();
    }
    let payments = store.payments().unwrap();
    let series = collection_series(&payments, date("2024-01-01"), date("2024-01-05"));
    assert_eq!(series.len(), 5);
    assert_eq!(series[0].count, 0);
    assert_eq!(series[1].total, d("100"));
    assert_eq!(series[3].date, date("2024-01-04"));
    assert_eq!(series[3].count, 2);
    assert_eq!(series[3].total, d("120"));
    assert_eq!(series[3].average, d("60"));
    assert_eq!(series[4].total, Decimal::ZERO);
}

#[test]
fn daily_window_is_exact_calendar_day() {
    let mut store = MemoryStore::new();
    let b = borrower(&mut store, "Nimal Perera");
    let loan = standard_loan(&mut store, b.id);
    service::collect_payment(&mut store, &pay(loan.id, "100", "2024-01-05")).unwrap();
    service::collect_payment(&mut store, &pay(loan.id, "200", "2024-01-06")).unwrap();

    let day = daily_collection(&store.payments().unwrap(), date("2024-01-05"));
    assert_eq!(day.total, d("100"));
    assert_eq!(day.count, 1);
    assert_eq!(day.average, d("100"));
}

#[test]
fn huge_totals_saturate_instead_of_overflowing() {
    let mut store = MemoryStore::new();
    let b = borrower(&mut store, "Nimal Perera");
    standard_loan(&mut store, b.id);
    standard_loan(&mut store, b.id);
    let loans: Vec<Loan> = store
        .loans()
        .unwrap()
        .into_iter()
        .map(|l| Loan {
            total_amount: Decimal::MAX,
            ..l
        })
        .collect();

    let s = portfolio_summary(&loans, &[], date("2024-02-01"));
    assert_eq!(s.total_loan_amount, Decimal::MAX);
    assert_eq!(s.pending_amount, Decimal::MAX);
    assert_eq!(s.overdue_payments_amount, Decimal::MAX);
    assert_eq!(s.overdue_loans, 2);
}
