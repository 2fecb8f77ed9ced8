// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Validated operations over a `LoanStore`.
//!
//! Every function checks its preconditions against a fresh read and only then
//! issues a single store write. Nothing here retries; a rejected write leaves
//! the store as it was.

use chrono::{Days, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::accounting::{self, LoanState, LoanTerms, classify};
use crate::error::{EngineError, Result};
use crate::models::{
    Borrower, DEFAULT_PAYMENT_METHOD, Loan, LoanStatus, NewBorrower, NewLoan, NewPayment, Payment,
};
use crate::store::LoanStore;
use crate::utils::is_valid_nic;

fn clean(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn normalize_borrower(mut b: NewBorrower) -> Result<NewBorrower> {
    b.name = b.name.trim().to_string();
    b.phone = b.phone.trim().to_string();
    b.address = b.address.trim().to_string();
    b.title = clean(b.title);
    b.first_name = clean(b.first_name);
    b.last_name = clean(b.last_name);
    b.nic_number = clean(b.nic_number).map(|n| n.to_uppercase());

    if b.name.is_empty() && b.first_name.is_none() && b.last_name.is_none() {
        return Err(EngineError::validation(
            "borrower needs a name or a first/last name",
        ));
    }
    if b.phone.is_empty() {
        return Err(EngineError::validation("borrower phone is required"));
    }
    if let Some(nic) = &b.nic_number {
        if !is_valid_nic(nic) {
            return Err(EngineError::validation(format!(
                "NIC number '{}' must be 9 digits plus V/X or 12 digits",
                nic
            )));
        }
    }
    Ok(b)
}

pub fn create_borrower<S: LoanStore + ?Sized>(
    store: &mut S,
    input: NewBorrower,
) -> Result<Borrower> {
    let input = normalize_borrower(input)?;
    let b = store.insert_borrower(&input)?;
    info!(borrower_id = b.id, name = %b.display_name(), "borrower created");
    Ok(b)
}

pub fn update_borrower<S: LoanStore + ?Sized>(
    store: &mut S,
    id: i64,
    input: NewBorrower,
) -> Result<Borrower> {
    let existing = store
        .borrower(id)?
        .ok_or(EngineError::not_found("borrower", id))?;
    let input = normalize_borrower(input)?;
    let b = store.update_borrower(&Borrower {
        name: input.name,
        phone: input.phone,
        address: input.address,
        title: input.title,
        first_name: input.first_name,
        last_name: input.last_name,
        nic_number: input.nic_number,
        ..existing
    })?;
    info!(borrower_id = b.id, "borrower updated");
    Ok(b)
}

/// Refuses while any of the borrower's loans is still open on `as_of`.
pub fn delete_borrower<S: LoanStore + ?Sized>(
    store: &mut S,
    id: i64,
    as_of: NaiveDate,
) -> Result<()> {
    if store.borrower(id)?.is_none() {
        return Err(EngineError::not_found("borrower", id));
    }
    let loans = store.loans_for_borrower(id)?;
    let stats = accounting::borrower_stats(id, &loans, as_of);
    if stats.open_loans() > 0 {
        warn!(borrower_id = id, open_loans = stats.open_loans(), "borrower delete refused");
        return Err(EngineError::Conflict(format!(
            "borrower {} still has {} open loan(s) with {} outstanding",
            id,
            stats.open_loans(),
            stats.remaining_amount
        )));
    }
    store.delete_borrower(id)?;
    info!(borrower_id = id, closed_loans = stats.total_loans, "borrower deleted");
    Ok(())
}

pub fn borrower_stats<S: LoanStore + ?Sized>(
    store: &S,
    id: i64,
    as_of: NaiveDate,
) -> Result<accounting::BorrowerStats> {
    let b = store
        .borrower(id)?
        .ok_or(EngineError::not_found("borrower", id))?;
    let loans = store.loans_for_borrower(id)?;
    Ok(accounting::BorrowerStats {
        name: b.display_name(),
        ..accounting::borrower_stats(id, &loans, as_of)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoanRequest {
    pub borrower_id: i64,
    pub terms: LoanTerms,
    pub start_date: NaiveDate,
}

pub fn create_loan<S: LoanStore + ?Sized>(
    store: &mut S,
    req: &LoanRequest,
    as_of: NaiveDate,
) -> Result<Loan> {
    if store.borrower(req.borrower_id)?.is_none() {
        return Err(EngineError::not_found("borrower", req.borrower_id));
    }
    let mut draft = Loan {
        id: 0,
        borrower_id: req.borrower_id,
        principal_amount: req.terms.principal,
        interest_rate: req.terms.interest_rate,
        duration_months: req.terms.duration_months(),
        duration_days: Some(req.terms.duration_days),
        total_amount: req.terms.total_amount(),
        amount_paid: Decimal::ZERO,
        start_date: req.start_date,
        status: LoanStatus::Active,
        next_payment_date: req.start_date.checked_add_days(Days::new(1)),
        arrears: None,
        created_at: String::new(),
        updated_at: String::new(),
    };
    draft.status = classify(&draft, as_of);
    let loan = store.insert_loan(&NewLoan {
        borrower_id: draft.borrower_id,
        principal_amount: draft.principal_amount,
        interest_rate: draft.interest_rate,
        duration_months: draft.duration_months,
        duration_days: draft.duration_days,
        total_amount: draft.total_amount,
        start_date: draft.start_date,
        status: draft.status,
        next_payment_date: draft.next_payment_date,
    })?;
    info!(
        loan_id = loan.id,
        borrower_id = loan.borrower_id,
        total = %loan.total_amount,
        "loan created"
    );
    Ok(loan)
}

/// Replaces a loan's terms and recomputes its total.
///
/// Rejected when the new total would fall below what has already been paid.
pub fn edit_loan<S: LoanStore + ?Sized>(
    store: &mut S,
    loan_id: i64,
    terms: LoanTerms,
    start_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> Result<Loan> {
    let existing = store
        .loan(loan_id)?
        .ok_or(EngineError::not_found("loan", loan_id))?;
    let new_total = terms.total_amount();
    if new_total < existing.amount_paid {
        return Err(EngineError::validation(format!(
            "new total {} is below the {} already paid on loan {}",
            new_total, existing.amount_paid, loan_id
        )));
    }
    let start_date = start_date.unwrap_or(existing.start_date);
    let mut updated = Loan {
        principal_amount: terms.principal,
        interest_rate: terms.interest_rate,
        duration_months: terms.duration_months(),
        duration_days: Some(terms.duration_days),
        total_amount: new_total,
        start_date,
        ..existing.clone()
    };
    updated.status = classify(&updated, as_of);
    let loan = store.update_loan(&updated)?;
    info!(
        loan_id,
        old_total = %existing.total_amount,
        new_total = %loan.total_amount,
        "loan terms edited"
    );
    Ok(loan)
}

pub fn delete_loan<S: LoanStore + ?Sized>(store: &mut S, loan_id: i64) -> Result<()> {
    let removed_payments = store.payments_for_loan(loan_id)?.len();
    store.delete_loan(loan_id)?;
    info!(loan_id, removed_payments, "loan deleted");
    Ok(())
}

/// The loan with its status classified on `as_of`, and its derived state.
pub fn loan_state<S: LoanStore + ?Sized>(
    store: &S,
    loan_id: i64,
    as_of: NaiveDate,
) -> Result<(Loan, LoanState)> {
    let stored = store
        .loan(loan_id)?
        .ok_or(EngineError::not_found("loan", loan_id))?;
    let state = accounting::loan_state(&stored, as_of);
    let loan = Loan {
        status: state.status,
        ..stored
    };
    Ok((loan, state))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectRequest {
    pub loan_id: i64,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_time: Option<NaiveTime>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Records a payment of `0 < amount <= remaining` against a loan.
pub fn collect_payment<S: LoanStore + ?Sized>(
    store: &mut S,
    req: &CollectRequest,
) -> Result<Payment> {
    if req.amount <= Decimal::ZERO {
        return Err(EngineError::validation(format!(
            "payment amount must be positive, got {}",
            req.amount
        )));
    }
    let loan = store
        .loan(req.loan_id)?
        .ok_or(EngineError::not_found("loan", req.loan_id))?;
    let remaining = loan.remaining_amount();
    if req.amount > remaining {
        return Err(EngineError::validation(format!(
            "payment {} exceeds remaining balance {} on loan {}",
            req.amount, remaining, loan.id
        )));
    }

    let after = Loan {
        amount_paid: loan.amount_paid + req.amount,
        ..loan.clone()
    };
    let status = classify(&after, req.payment_date);
    let method = clean(req.payment_method.clone())
        .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
    debug!(loan_id = loan.id, paid = %loan.amount_paid, "recording payment");
    let payment = store.record_payment(
        &NewPayment {
            loan_id: loan.id,
            amount: req.amount,
            payment_date: req.payment_date,
            payment_time: req.payment_time,
            payment_method: method,
            notes: clean(req.notes.clone()),
        },
        loan.amount_paid,
        status,
    )?;
    info!(
        loan_id = loan.id,
        payment_id = payment.id,
        amount = %payment.amount,
        remaining = %(remaining - payment.amount),
        status = %status,
        "payment collected"
    );
    Ok(payment)
}

/// Undoes one payment in full and lowers the loan's paid amount by it.
pub fn reverse_payment<S: LoanStore + ?Sized>(
    store: &mut S,
    payment_id: i64,
    as_of: NaiveDate,
) -> Result<Payment> {
    let payment = store
        .payment(payment_id)?
        .ok_or(EngineError::not_found("payment", payment_id))?;
    let loan = store
        .loan(payment.loan_id)?
        .ok_or(EngineError::not_found("loan", payment.loan_id))?;
    if payment.amount > loan.amount_paid {
        return Err(EngineError::validation(format!(
            "payment {} of {} exceeds the {} recorded as paid on loan {}",
            payment.id, payment.amount, loan.amount_paid, loan.id
        )));
    }
    let after = Loan {
        amount_paid: loan.amount_paid - payment.amount,
        ..loan.clone()
    };
    let status = classify(&after, as_of);
    store.remove_payment(&payment, loan.amount_paid, status)?;
    info!(
        loan_id = loan.id,
        payment_id = payment.id,
        amount = %payment.amount,
        status = %status,
        "payment reversed"
    );
    Ok(payment)
}

/// Reverses the newest payment on a loan.
pub fn reverse_latest_payment<S: LoanStore + ?Sized>(
    store: &mut S,
    loan_id: i64,
    as_of: NaiveDate,
) -> Result<Payment> {
    if store.loan(loan_id)?.is_none() {
        return Err(EngineError::not_found("loan", loan_id));
    }
    let latest = store
        .payments_for_loan(loan_id)?
        .into_iter()
        .next()
        .ok_or(EngineError::not_found("payment for loan", loan_id))?;
    reverse_payment(store, latest.id, as_of)
}

/// Rewrites stored statuses that disagree with `classify` on `as_of`.
pub fn refresh_statuses<S: LoanStore + ?Sized>(store: &mut S, as_of: NaiveDate) -> Result<usize> {
    let mut changed = 0;
    for loan in store.loans()? {
        let live = classify(&loan, as_of);
        if live != loan.status {
            store.update_loan(&Loan {
                status: live,
                ..loan
            })?;
            changed += 1;
        }
    }
    if changed > 0 {
        info!(changed, %as_of, "loan statuses refreshed");
    }
    Ok(changed)
}
