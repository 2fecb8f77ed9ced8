// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use easycollect::accounting::{self, LoanTerms};
use easycollect::error::EngineError;
use easycollect::models::{Loan, LoanStatus};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn legacy_loan(months: i64) -> Loan {
    Loan {
        id: 1,
        borrower_id: 1,
        principal_amount: d("3000"),
        interest_rate: d("20"),
        duration_months: months,
        duration_days: None,
        total_amount: d("3600"),
        amount_paid: Decimal::ZERO,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        status: LoanStatus::Active,
        next_payment_date: None,
        arrears: None,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

#[test]
fn thousand_at_ten_percent_over_ten_days() {
    let t = LoanTerms::new(d("1000"), d("10"), 10).unwrap();
    assert_eq!(t.total_amount(), d("1100"));
    assert_eq!(t.daily_payment(), d("110"));
    assert_eq!(t.duration_months(), 1);
}

#[test]
fn total_never_below_principal() {
    for principal in ["0.01", "1", "250.50", "1000", "987654.32"] {
        for rate in ["0", "0.5", "10", "33.3", "100", "250"] {
            let p = d(principal);
            let r = d(rate);
            let total = accounting::total_amount(p, r).unwrap();
            assert_eq!(total, p * (Decimal::ONE + r / Decimal::ONE_HUNDRED));
            assert!(total >= p, "{} at {}%", principal, rate);
        }
    }
}

#[test]
fn months_round_up_with_floor_of_one() {
    assert_eq!(accounting::months_for_days(1), 1);
    assert_eq!(accounting::months_for_days(30), 1);
    assert_eq!(accounting::months_for_days(31), 2);
    assert_eq!(accounting::months_for_days(60), 2);
    assert_eq!(accounting::months_for_days(61), 3);
}

#[test]
fn legacy_rows_fall_back_to_thirty_day_months() {
    let loan = legacy_loan(3);
    assert_eq!(accounting::duration_days(&loan), 90);
    assert_eq!(accounting::daily_payment_amount(&loan), d("40"));

    let mut with_days = legacy_loan(3);
    with_days.duration_days = Some(75);
    assert_eq!(accounting::duration_days(&with_days), 75);
    assert_eq!(accounting::daily_payment_amount(&with_days), d("48"));
}

#[test]
fn rejects_bad_inputs() {
    assert!(matches!(
        LoanTerms::new(Decimal::ZERO, d("10"), 10),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        LoanTerms::new(d("100"), d("-1"), 10),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        LoanTerms::new(d("100"), d("10"), 0),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        LoanTerms::parse("abc", "10", "10"),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        LoanTerms::parse("100", "10", "ten"),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        LoanTerms::parse("100", "10", "2.5"),
        Err(EngineError::Validation(_))
    ));

    let ok = LoanTerms::parse(" 1000 ", "0", "45").unwrap();
    assert_eq!(ok.total_amount(), d("1000"));
    assert_eq!(ok.duration_months(), 2);
}

#[test]
fn oversized_totals_are_rejected() {
    assert!(matches!(
        LoanTerms::parse("79228162514264337593543950335", "100", "10"),
        Err(EngineError::Validation(_))
    ));
    assert!(accounting::total_amount(Decimal::MAX, d("1")).is_err());
    assert_eq!(accounting::total_amount(Decimal::MAX, Decimal::ZERO).unwrap(), Decimal::MAX);
}

#[test]
fn duration_is_bounded() {
    let max = accounting::MAX_DURATION_DAYS;
    assert!(LoanTerms::new(d("100"), d("10"), max).is_ok());
    assert!(matches!(
        LoanTerms::new(d("100"), d("10"), max + 1),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        LoanTerms::parse("100", "10", &i64::MAX.to_string()),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn extreme_day_counts_saturate() {
    assert_eq!(accounting::months_for_days(i64::MAX), i64::MAX / 30);

    let huge = legacy_loan(i64::MAX);
    assert_eq!(accounting::duration_days(&huge), i64::MAX);
    let on = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert_eq!(accounting::classify(&huge, on), LoanStatus::Active);
}
