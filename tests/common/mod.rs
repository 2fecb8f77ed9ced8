// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::NaiveDate;
use easycollect::accounting::LoanTerms;
use easycollect::db;
use easycollect::models::{Borrower, Loan, NewBorrower};
use easycollect::service::{self, CollectRequest, LoanRequest};
use easycollect::store::LoanStore;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

pub fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn borrower<S: LoanStore + ?Sized>(store: &mut S, name: &str) -> Borrower {
    service::create_borrower(
        store,
        NewBorrower {
            name: name.to_string(),
            phone: "0771234567".to_string(),
            address: "12 Galle Road".to_string(),
            ..Default::default()
        },
    )
    .unwrap()
}

/// 1000 at 10% over 10 days from 2024-01-01: total 1100, daily 110.
pub fn standard_loan<S: LoanStore + ?Sized>(store: &mut S, borrower_id: i64) -> Loan {
    service::create_loan(
        store,
        &LoanRequest {
            borrower_id,
            terms: LoanTerms::new(d("1000"), d("10"), 10).unwrap(),
            start_date: date("2024-01-01"),
        },
        date("2024-01-01"),
    )
    .unwrap()
}

pub fn pay(loan_id: i64, amount: &str, on: &str) -> CollectRequest {
    CollectRequest {
        loan_id,
        amount: d(amount),
        payment_date: date(on),
        payment_time: None,
        payment_method: None,
        notes: None,
    }
}
