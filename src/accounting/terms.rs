// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Loan term arithmetic: totals, month rounding, and the daily installment.

use rust_decimal::Decimal;

use crate::error::{EngineError, Result};
use crate::models::Loan;

/// Month length used wherever days and months are converted.
pub const DAYS_PER_MONTH: i64 = 30;

/// Longest accepted term, one hundred years of days.
pub const MAX_DURATION_DAYS: i64 = 36_500;

/// Validated inputs for a new or edited loan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: Decimal,
    pub interest_rate: Decimal,
    pub duration_days: i64,
    total: Decimal,
}

impl LoanTerms {
    pub fn new(principal: Decimal, interest_rate: Decimal, duration_days: i64) -> Result<Self> {
        if principal <= Decimal::ZERO {
            return Err(EngineError::validation(format!(
                "principal must be positive, got {}",
                principal
            )));
        }
        if interest_rate < Decimal::ZERO {
            return Err(EngineError::validation(format!(
                "interest rate must not be negative, got {}",
                interest_rate
            )));
        }
        if !(1..=MAX_DURATION_DAYS).contains(&duration_days) {
            return Err(EngineError::validation(format!(
                "duration must be between 1 and {} days, got {}",
                MAX_DURATION_DAYS, duration_days
            )));
        }
        let total = total_amount(principal, interest_rate)?;
        Ok(LoanTerms {
            principal,
            interest_rate,
            duration_days,
            total,
        })
    }

    /// Builds terms from raw form input, rejecting anything non-numeric.
    pub fn parse(principal: &str, interest_rate: &str, duration_days: &str) -> Result<Self> {
        let principal = principal.trim().parse::<Decimal>().map_err(|_| {
            EngineError::validation(format!("principal '{}' is not a number", principal))
        })?;
        let interest_rate = interest_rate.trim().parse::<Decimal>().map_err(|_| {
            EngineError::validation(format!("interest rate '{}' is not a number", interest_rate))
        })?;
        let duration_days = duration_days.trim().parse::<i64>().map_err(|_| {
            EngineError::validation(format!(
                "duration '{}' is not a whole number of days",
                duration_days
            ))
        })?;
        LoanTerms::new(principal, interest_rate, duration_days)
    }

    pub fn total_amount(&self) -> Decimal {
        self.total
    }

    pub fn duration_months(&self) -> i64 {
        months_for_days(self.duration_days)
    }

    pub fn daily_payment(&self) -> Decimal {
        self.total / Decimal::from(self.duration_days)
    }
}

/// `principal + principal * rate / 100`, or `Validation` when it does not fit a `Decimal`.
pub fn total_amount(principal: Decimal, interest_rate: Decimal) -> Result<Decimal> {
    principal
        .checked_mul(interest_rate)
        .and_then(|i| i.checked_div(Decimal::ONE_HUNDRED))
        .and_then(|i| principal.checked_add(i))
        .ok_or_else(|| {
            EngineError::validation(format!(
                "total for principal {} at {}% is too large",
                principal, interest_rate
            ))
        })
}

/// Whole months, rounded up, never below one.
pub fn months_for_days(days: i64) -> i64 {
    let months = days.saturating_add(DAYS_PER_MONTH - 1).div_euclid(DAYS_PER_MONTH);
    months.max(1)
}

/// Day-level duration of a stored loan. Legacy rows only carry months.
pub fn duration_days(loan: &Loan) -> i64 {
    match loan.duration_days {
        Some(days) if days > 0 => days,
        _ => loan.duration_months.saturating_mul(DAYS_PER_MONTH).max(1),
    }
}

pub fn daily_payment_amount(loan: &Loan) -> Decimal {
    loan.total_amount / Decimal::from(duration_days(loan))
}
