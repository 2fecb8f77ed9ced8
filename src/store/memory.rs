// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::{LoanStore, sort_newest_first};
use crate::error::{EngineError, Result};
use crate::models::{Borrower, Loan, LoanStatus, NewBorrower, NewLoan, NewPayment, Payment};
use crate::utils::now_stamp;

/// Map-backed store for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    borrowers: BTreeMap<i64, Borrower>,
    loans: BTreeMap<i64, Loan>,
    payments: BTreeMap<i64, Payment>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn bump_past(&mut self, id: i64) {
        self.next_id = self.next_id.max(id);
    }

    fn guarded_loan(&mut self, loan_id: i64, expected_paid: Decimal) -> Result<&mut Loan> {
        let loan = self
            .loans
            .get_mut(&loan_id)
            .ok_or(EngineError::not_found("loan", loan_id))?;
        if loan.amount_paid != expected_paid {
            return Err(EngineError::Persistence(format!(
                "loan {} changed concurrently (paid {} != {})",
                loan_id, loan.amount_paid, expected_paid
            )));
        }
        Ok(loan)
    }
}

impl LoanStore for MemoryStore {
    fn insert_borrower(&mut self, new: &NewBorrower) -> Result<Borrower> {
        let id = self.next();
        let now = now_stamp();
        let b = Borrower {
            id,
            name: new.name.clone(),
            phone: new.phone.clone(),
            address: new.address.clone(),
            title: new.title.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            nic_number: new.nic_number.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.borrowers.insert(id, b.clone());
        Ok(b)
    }

    fn update_borrower(&mut self, borrower: &Borrower) -> Result<Borrower> {
        let slot = self
            .borrowers
            .get_mut(&borrower.id)
            .ok_or(EngineError::not_found("borrower", borrower.id))?;
        *slot = Borrower {
            updated_at: now_stamp(),
            created_at: slot.created_at.clone(),
            ..borrower.clone()
        };
        Ok(slot.clone())
    }

    fn borrower(&self, id: i64) -> Result<Option<Borrower>> {
        Ok(self.borrowers.get(&id).cloned())
    }

    fn borrowers(&self) -> Result<Vec<Borrower>> {
        Ok(self.borrowers.values().cloned().collect())
    }

    fn delete_borrower(&mut self, id: i64) -> Result<()> {
        if self.borrowers.remove(&id).is_none() {
            return Err(EngineError::not_found("borrower", id));
        }
        let loan_ids: Vec<i64> = self
            .loans
            .values()
            .filter(|l| l.borrower_id == id)
            .map(|l| l.id)
            .collect();
        self.loans.retain(|_, l| l.borrower_id != id);
        self.payments.retain(|_, p| !loan_ids.contains(&p.loan_id));
        Ok(())
    }

    fn insert_loan(&mut self, new: &NewLoan) -> Result<Loan> {
        if !self.borrowers.contains_key(&new.borrower_id) {
            return Err(EngineError::not_found("borrower", new.borrower_id));
        }
        let id = self.next();
        let now = now_stamp();
        let loan = Loan {
            id,
            borrower_id: new.borrower_id,
            principal_amount: new.principal_amount,
            interest_rate: new.interest_rate,
            duration_months: new.duration_months,
            duration_days: new.duration_days,
            total_amount: new.total_amount,
            amount_paid: Decimal::ZERO,
            start_date: new.start_date,
            status: new.status,
            next_payment_date: new.next_payment_date,
            arrears: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.loans.insert(id, loan.clone());
        Ok(loan)
    }

    fn update_loan(&mut self, loan: &Loan) -> Result<Loan> {
        let slot = self.guarded_loan(loan.id, loan.amount_paid)?;
        *slot = Loan {
            created_at: slot.created_at.clone(),
            updated_at: now_stamp(),
            ..loan.clone()
        };
        Ok(slot.clone())
    }

    fn loan(&self, id: i64) -> Result<Option<Loan>> {
        Ok(self.loans.get(&id).cloned())
    }

    fn loans(&self) -> Result<Vec<Loan>> {
        Ok(self.loans.values().cloned().collect())
    }

    fn loans_for_borrower(&self, borrower_id: i64) -> Result<Vec<Loan>> {
        Ok(self
            .loans
            .values()
            .filter(|l| l.borrower_id == borrower_id)
            .cloned()
            .collect())
    }

    fn delete_loan(&mut self, id: i64) -> Result<()> {
        if self.loans.remove(&id).is_none() {
            return Err(EngineError::not_found("loan", id));
        }
        self.payments.retain(|_, p| p.loan_id != id);
        Ok(())
    }

    fn payment(&self, id: i64) -> Result<Option<Payment>> {
        Ok(self.payments.get(&id).cloned())
    }

    fn payments(&self) -> Result<Vec<Payment>> {
        Ok(self.payments.values().cloned().collect())
    }

    fn payments_for_loan(&self, loan_id: i64) -> Result<Vec<Payment>> {
        let mut out: Vec<Payment> = self
            .payments
            .values()
            .filter(|p| p.loan_id == loan_id)
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }

    fn record_payment(
        &mut self,
        new: &NewPayment,
        expected_paid: Decimal,
        status: LoanStatus,
    ) -> Result<Payment> {
        let id = self.next_id + 1;
        let loan = self.guarded_loan(new.loan_id, expected_paid)?;
        loan.amount_paid = expected_paid + new.amount;
        loan.status = status;
        loan.updated_at = now_stamp();
        self.next_id = id;
        let payment = Payment {
            id,
            loan_id: new.loan_id,
            amount: new.amount,
            payment_date: new.payment_date,
            payment_time: new.payment_time,
            payment_method: new.payment_method.clone(),
            notes: new.notes.clone(),
            created_at: now_stamp(),
        };
        self.payments.insert(id, payment.clone());
        Ok(payment)
    }

    fn remove_payment(
        &mut self,
        payment: &Payment,
        expected_paid: Decimal,
        status: LoanStatus,
    ) -> Result<()> {
        if !self.payments.contains_key(&payment.id) {
            return Err(EngineError::not_found("payment", payment.id));
        }
        let loan = self.guarded_loan(payment.loan_id, expected_paid)?;
        loan.amount_paid = expected_paid - payment.amount;
        loan.status = status;
        loan.updated_at = now_stamp();
        self.payments.remove(&payment.id);
        Ok(())
    }

    fn restore(
        &mut self,
        borrowers: &[Borrower],
        loans: &[Loan],
        payments: &[Payment],
    ) -> Result<()> {
        let mut staged = self.clone();
        for b in borrowers {
            staged.bump_past(b.id);
            staged.borrowers.insert(b.id, b.clone());
        }
        for l in loans {
            if !staged.borrowers.contains_key(&l.borrower_id) {
                return Err(EngineError::not_found("borrower", l.borrower_id));
            }
            staged.bump_past(l.id);
            staged.loans.insert(l.id, l.clone());
        }
        for p in payments {
            if !staged.loans.contains_key(&p.loan_id) {
                return Err(EngineError::not_found("loan", p.loan_id));
            }
            staged.bump_past(p.id);
            staged.payments.insert(p.id, p.clone());
        }
        *self = staged;
        Ok(())
    }
}
