// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrower {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nic_number: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Borrower {
    /// `name` when set, otherwise "title first last" from whatever parts exist.
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.trim().to_string();
        }
        [&self.title, &self.first_name, &self.last_name]
            .iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Active,
    Completed,
    Overdue,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Completed => "completed",
            LoanStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(LoanStatus::Active),
            "completed" => Ok(LoanStatus::Completed),
            "overdue" => Ok(LoanStatus::Overdue),
            other => Err(EngineError::validation(format!(
                "unknown loan status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub borrower_id: i64,
    pub principal_amount: Decimal,
    pub interest_rate: Decimal, // percent
    pub duration_months: i64,
    #[serde(default)]
    pub duration_days: Option<i64>, // None on legacy rows
    pub total_amount: Decimal,
    #[serde(default)]
    pub amount_paid: Decimal,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(default)]
    pub next_payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub arrears: Option<Decimal>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Loan {
    pub fn remaining_amount(&self) -> Decimal {
        self.total_amount.saturating_sub(self.amount_paid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub loan_id: i64,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub payment_time: Option<NaiveTime>,
    #[serde(default = "default_method")]
    pub payment_method: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

fn default_method() -> String {
    DEFAULT_PAYMENT_METHOD.to_string()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBorrower {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nic_number: Option<String>,
}

/// A loan row whose derived amounts have already been computed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub borrower_id: i64,
    pub principal_amount: Decimal,
    pub interest_rate: Decimal,
    pub duration_months: i64,
    pub duration_days: Option<i64>,
    pub total_amount: Decimal,
    pub start_date: NaiveDate,
    pub status: LoanStatus,
    pub next_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub loan_id: i64,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_time: Option<NaiveTime>,
    pub payment_method: String,
    pub notes: Option<String>,
}
