// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use easycollect::accounting::{self, classify};
use easycollect::models::{Loan, LoanStatus};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn loan(paid: &str) -> Loan {
    Loan {
        id: 7,
        borrower_id: 1,
        principal_amount: d("1000"),
        interest_rate: d("10"),
        duration_months: 1,
        duration_days: Some(10),
        total_amount: d("1100"),
        amount_paid: d(paid),
        start_date: date("2024-01-01"),
        status: LoanStatus::Active,
        next_payment_date: None,
        arrears: None,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

#[test]
fn end_date_counts_days_not_months() {
    let l = loan("0");
    assert_eq!(accounting::end_date(&l), date("2024-01-11"));
}

#[test]
fn due_day_is_not_overdue_but_the_next_day_is() {
    let l = loan("500");
    assert_eq!(classify(&l, date("2024-01-11")), LoanStatus::Active);
    assert_eq!(classify(&l, date("2024-01-12")), LoanStatus::Overdue);
    assert_eq!(classify(&l, date("2024-01-05")), LoanStatus::Active);
}

#[test]
fn fully_paid_is_completed_on_any_date() {
    let l = loan("1100");
    for day in ["2023-12-01", "2024-01-11", "2024-01-12", "2030-01-01"] {
        assert_eq!(classify(&l, date(day)), LoanStatus::Completed);
    }
}

#[test]
fn classification_is_repeatable() {
    let l = loan("10");
    let day = date("2024-02-01");
    let first = classify(&l, day);
    let second = classify(&l, day);
    assert_eq!(first, second);
    assert_eq!(l, loan("10"));
}

#[test]
fn days_remaining_clamps_at_zero() {
    let l = loan("0");
    assert_eq!(accounting::days_remaining(&l, date("2024-01-01")), 10);
    assert_eq!(accounting::days_remaining(&l, date("2024-01-11")), 0);
    assert_eq!(accounting::days_remaining(&l, date("2024-03-01")), 0);
}

#[test]
fn loan_state_reports_progress_and_suggestion() {
    let st = accounting::loan_state(&loan("275"), date("2024-01-04"));
    assert_eq!(st.status, LoanStatus::Active);
    assert_eq!(st.remaining_amount, d("825"));
    assert_eq!(st.progress_percent, d("25"));
    assert_eq!(st.daily_payment_amount, d("110"));
    assert_eq!(st.suggested_payment, d("110"));
    assert_eq!(st.days_remaining, 7);

    let nearly = accounting::loan_state(&loan("1050"), date("2024-01-04"));
    assert_eq!(nearly.suggested_payment, d("50"));

    let done = accounting::loan_state(&loan("1100"), date("2024-01-04"));
    assert_eq!(done.progress_percent, d("100"));
    assert_eq!(done.suggested_payment, Decimal::ZERO);
}
