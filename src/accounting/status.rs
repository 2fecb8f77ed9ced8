// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::terms::{daily_payment_amount, duration_days};
use crate::models::{Loan, LoanStatus};

/// `start_date + duration_days`. Saturates instead of overflowing the calendar.
pub fn end_date(loan: &Loan) -> NaiveDate {
    let days = duration_days(loan) as u64;
    loan.start_date
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

/// Live status of a loan on `as_of`.
///
/// A fully paid loan is completed regardless of date. Otherwise the loan is
/// overdue only strictly after its end date.
pub fn classify(loan: &Loan, as_of: NaiveDate) -> LoanStatus {
    if loan.amount_paid >= loan.total_amount {
        LoanStatus::Completed
    } else if as_of > end_date(loan) {
        LoanStatus::Overdue
    } else {
        LoanStatus::Active
    }
}

pub fn days_remaining(loan: &Loan, as_of: NaiveDate) -> i64 {
    (end_date(loan) - as_of).num_days().max(0)
}

/// Share of the total already collected, two decimals, capped at 100.
pub fn progress_percent(loan: &Loan) -> Decimal {
    if loan.total_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let pct = loan
        .amount_paid
        .checked_div(loan.total_amount)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ONE_HUNDRED);
    pct.min(Decimal::ONE_HUNDRED).max(Decimal::ZERO).round_dp(2)
}

/// Everything a loan screen shows that is not stored on the row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanState {
    pub loan_id: i64,
    pub status: LoanStatus,
    pub end_date: NaiveDate,
    pub days_remaining: i64,
    pub remaining_amount: Decimal,
    pub progress_percent: Decimal,
    pub daily_payment_amount: Decimal,
    pub suggested_payment: Decimal,
}

pub fn loan_state(loan: &Loan, as_of: NaiveDate) -> LoanState {
    let daily = daily_payment_amount(loan);
    let remaining = loan.remaining_amount().max(Decimal::ZERO);
    LoanState {
        loan_id: loan.id,
        status: classify(loan, as_of),
        end_date: end_date(loan),
        days_remaining: days_remaining(loan, as_of),
        remaining_amount: remaining,
        progress_percent: progress_percent(loan),
        daily_payment_amount: daily,
        suggested_payment: daily.round_dp(2).min(remaining),
    }
}
