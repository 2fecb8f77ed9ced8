// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only aggregates over a snapshot of loans and payments.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::status::classify;
use crate::models::{Borrower, Loan, LoanStatus, Payment};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BorrowerStats {
    pub borrower_id: i64,
    pub name: String,
    pub total_loans: usize,
    pub active_loans: usize,
    pub overdue_loans: usize,
    pub total_amount: Decimal,
    pub total_paid: Decimal,
    pub remaining_amount: Decimal,
}

impl BorrowerStats {
    /// Loans not yet completed. Any of these blocks deleting the borrower.
    pub fn open_loans(&self) -> usize {
        self.active_loans + self.overdue_loans
    }
}

pub fn borrower_stats(borrower_id: i64, loans: &[Loan], as_of: NaiveDate) -> BorrowerStats {
    let mut stats = BorrowerStats {
        borrower_id,
        ..Default::default()
    };
    for loan in loans.iter().filter(|l| l.borrower_id == borrower_id) {
        stats.total_loans += 1;
        match classify(loan, as_of) {
            LoanStatus::Active => stats.active_loans += 1,
            LoanStatus::Overdue => stats.overdue_loans += 1,
            LoanStatus::Completed => {}
        }
        stats.total_amount = stats.total_amount.saturating_add(loan.total_amount);
        stats.total_paid = stats.total_paid.saturating_add(loan.amount_paid);
    }
    stats.remaining_amount = stats.total_amount.saturating_sub(stats.total_paid);
    stats
}

/// One row per borrower, in the order given.
pub fn all_borrower_stats(
    borrowers: &[Borrower],
    loans: &[Loan],
    as_of: NaiveDate,
) -> Vec<BorrowerStats> {
    borrowers
        .iter()
        .map(|b| BorrowerStats {
            name: b.display_name(),
            ..borrower_stats(b.id, loans, as_of)
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_loans: usize,
    pub active_loans: usize,
    pub completed_loans: usize,
    pub overdue_loans: usize,
    pub total_loan_amount: Decimal,
    pub total_collected: Decimal,
    pub pending_amount: Decimal,
    pub overdue_payments_amount: Decimal,
    pub payment_count: usize,
    pub average_payment: Decimal,
}

pub fn portfolio_summary(
    loans: &[Loan],
    payments: &[Payment],
    as_of: NaiveDate,
) -> PortfolioSummary {
    let mut s = PortfolioSummary {
        total_loans: loans.len(),
        ..Default::default()
    };
    for loan in loans {
        match classify(loan, as_of) {
            LoanStatus::Active => s.active_loans += 1,
            LoanStatus::Completed => s.completed_loans += 1,
            LoanStatus::Overdue => {
                s.overdue_loans += 1;
                s.overdue_payments_amount = s
                    .overdue_payments_amount
                    .saturating_add(loan.remaining_amount());
            }
        }
        s.total_loan_amount = s.total_loan_amount.saturating_add(loan.total_amount);
        s.total_collected = s.total_collected.saturating_add(loan.amount_paid);
    }
    s.pending_amount = s.total_loan_amount.saturating_sub(s.total_collected);
    s.payment_count = payments.len();
    s.average_payment = average(payments.iter().map(|p| p.amount));
    s
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCollection {
    pub date: NaiveDate,
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
}

/// Payments dated exactly `date`, by calendar day.
pub fn payments_on(payments: &[Payment], date: NaiveDate) -> Vec<&Payment> {
    payments.iter().filter(|p| p.payment_date == date).collect()
}

pub fn daily_collection(payments: &[Payment], date: NaiveDate) -> DailyCollection {
    let todays = payments_on(payments, date);
    DailyCollection {
        date,
        total: sum(todays.iter().map(|p| p.amount)),
        count: todays.len(),
        average: average(todays.iter().map(|p| p.amount)),
    }
}

/// Per-day totals for every day in `[from, to]`, zero days included.
pub fn collection_series(
    payments: &[Payment],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<DailyCollection> {
    let mut by_day: BTreeMap<NaiveDate, Vec<Decimal>> = BTreeMap::new();
    for p in payments
        .iter()
        .filter(|p| p.payment_date >= from && p.payment_date <= to)
    {
        by_day.entry(p.payment_date).or_default().push(p.amount);
    }

    let mut out = Vec::new();
    let mut day = from;
    while day <= to {
        let amounts = by_day.remove(&day).unwrap_or_default();
        out.push(DailyCollection {
            date: day,
            total: sum(amounts.iter().copied()),
            count: amounts.len(),
            average: average(amounts.iter().copied()),
        });
        day = match day.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    out
}

// Saturates at Decimal::MAX instead of panicking on huge imported rows.
fn sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, |s, a| s.saturating_add(a))
}

fn average(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    let (total, n) = amounts.fold((Decimal::ZERO, 0u64), |(s, n), a| {
        (s.saturating_add(a), n + 1)
    });
    if n == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(n)
    }
}
