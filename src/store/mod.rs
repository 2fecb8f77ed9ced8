// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistence port. The service layer only talks to a `LoanStore`.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{Borrower, Loan, LoanStatus, NewBorrower, NewLoan, NewPayment, Payment};

pub trait LoanStore {
    fn insert_borrower(&mut self, new: &NewBorrower) -> Result<Borrower>;
    fn update_borrower(&mut self, borrower: &Borrower) -> Result<Borrower>;
    fn borrower(&self, id: i64) -> Result<Option<Borrower>>;
    fn borrowers(&self) -> Result<Vec<Borrower>>;
    /// Removes the borrower with all of its loans and their payments.
    fn delete_borrower(&mut self, id: i64) -> Result<()>;

    fn insert_loan(&mut self, new: &NewLoan) -> Result<Loan>;
    /// Overwrites every column except `amount_paid`, and only while the stored
    /// `amount_paid` still equals `loan.amount_paid`.
    fn update_loan(&mut self, loan: &Loan) -> Result<Loan>;
    fn loan(&self, id: i64) -> Result<Option<Loan>>;
    fn loans(&self) -> Result<Vec<Loan>>;
    fn loans_for_borrower(&self, borrower_id: i64) -> Result<Vec<Loan>>;
    /// Removes the loan and its payments.
    fn delete_loan(&mut self, id: i64) -> Result<()>;

    fn payment(&self, id: i64) -> Result<Option<Payment>>;
    fn payments(&self) -> Result<Vec<Payment>>;
    /// Newest first: payment_date, payment_time, then id, all descending.
    fn payments_for_loan(&self, loan_id: i64) -> Result<Vec<Payment>>;

    /// Inserts the payment and raises the loan's `amount_paid` in one step.
    /// Fails without writing if `amount_paid` no longer equals `expected_paid`.
    fn record_payment(
        &mut self,
        new: &NewPayment,
        expected_paid: Decimal,
        status: LoanStatus,
    ) -> Result<Payment>;

    /// Deletes the payment and lowers the loan's `amount_paid` in one step,
    /// under the same `expected_paid` guard as `record_payment`.
    fn remove_payment(
        &mut self,
        payment: &Payment,
        expected_paid: Decimal,
        status: LoanStatus,
    ) -> Result<()>;

    /// Upserts whole records keeping their ids. All or nothing.
    fn restore(&mut self, borrowers: &[Borrower], loans: &[Loan], payments: &[Payment])
    -> Result<()>;
}

pub(crate) fn sort_newest_first(payments: &mut [Payment]) {
    payments.sort_by(|a, b| {
        b.payment_date
            .cmp(&a.payment_date)
            .then(b.payment_time.cmp(&a.payment_time))
            .then(b.id.cmp(&a.id))
    });
}
