// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveTime;
use rusqlite::types::Type;
use rusqlite::{
    Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params,
};
use rust_decimal::Decimal;

use super::LoanStore;
use crate::error::{EngineError, Result};
use crate::models::{Borrower, Loan, LoanStatus, NewBorrower, NewLoan, NewPayment, Payment};
use crate::utils::now_stamp;

const BORROWER_COLS: &str =
    "id, name, phone, address, title, first_name, last_name, nic_number, created_at, updated_at";
const LOAN_COLS: &str = "id, borrower_id, principal_amount, interest_rate, duration_months, \
     duration_days, total_amount, amount_paid, start_date, status, next_payment_date, arrears, \
     created_at, updated_at";
const PAYMENT_COLS: &str =
    "id, loan_id, amount, payment_date, payment_time, payment_method, notes, created_at";

/// `LoanStore` over the SQLite schema created by `db::init_schema`.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteStore { conn }
    }

    fn begin(&self) -> Result<Transaction<'a>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

fn conversion<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn decimal_at(r: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.trim().parse::<Decimal>().map_err(|e| conversion(idx, e))
}

fn opt_decimal_at(r: &Row, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let s: Option<String> = r.get(idx)?;
    match s {
        Some(s) if !s.trim().is_empty() => {
            s.trim().parse::<Decimal>().map(Some).map_err(|e| conversion(idx, e))
        }
        _ => Ok(None),
    }
}

fn borrower_from_row(r: &Row) -> rusqlite::Result<Borrower> {
    Ok(Borrower {
        id: r.get(0)?,
        name: r.get(1)?,
        phone: r.get(2)?,
        address: r.get(3)?,
        title: r.get(4)?,
        first_name: r.get(5)?,
        last_name: r.get(6)?,
        nic_number: r.get(7)?,
        created_at: r.get(8)?,
        updated_at: r.get(9)?,
    })
}

fn loan_from_row(r: &Row) -> rusqlite::Result<Loan> {
    let status: String = r.get(9)?;
    Ok(Loan {
        id: r.get(0)?,
        borrower_id: r.get(1)?,
        principal_amount: decimal_at(r, 2)?,
        interest_rate: decimal_at(r, 3)?,
        duration_months: r.get(4)?,
        duration_days: r.get(5)?,
        total_amount: decimal_at(r, 6)?,
        amount_paid: decimal_at(r, 7)?,
        start_date: r.get(8)?,
        status: status.parse().map_err(|e| conversion(9, e))?,
        next_payment_date: r.get(10)?,
        arrears: opt_decimal_at(r, 11)?,
        created_at: r.get(12)?,
        updated_at: r.get(13)?,
    })
}

fn payment_from_row(r: &Row) -> rusqlite::Result<Payment> {
    let method: Option<String> = r.get(5)?;
    Ok(Payment {
        id: r.get(0)?,
        loan_id: r.get(1)?,
        amount: decimal_at(r, 2)?,
        payment_date: r.get(3)?,
        payment_time: r.get(4)?,
        payment_method: method.unwrap_or_else(|| crate::models::DEFAULT_PAYMENT_METHOD.into()),
        notes: r.get(6)?,
        created_at: r.get(7)?,
    })
}

fn fmt_time(t: &Option<NaiveTime>) -> Option<String> {
    t.map(|t| t.format("%H:%M:%S").to_string())
}

fn stamp_or_now(s: &str) -> String {
    if s.trim().is_empty() {
        now_stamp()
    } else {
        s.to_string()
    }
}

/// Reads `amount_paid` inside `tx` and fails unless it equals `expected`.
fn check_paid(tx: &Transaction, loan_id: i64, expected: Decimal) -> Result<()> {
    let current: Option<String> = tx
        .query_row(
            "SELECT amount_paid FROM loans WHERE id=?1",
            params![loan_id],
            |r| r.get(0),
        )
        .optional()?;
    let current = current.ok_or(EngineError::not_found("loan", loan_id))?;
    let current = current.trim().parse::<Decimal>().map_err(|e| {
        EngineError::Persistence(format!("loan {} has unreadable amount_paid: {}", loan_id, e))
    })?;
    if current != expected {
        return Err(EngineError::Persistence(format!(
            "loan {} changed concurrently (paid {} != {})",
            loan_id, current, expected
        )));
    }
    Ok(())
}

impl LoanStore for SqliteStore<'_> {
    fn insert_borrower(&mut self, new: &NewBorrower) -> Result<Borrower> {
        let now = now_stamp();
        self.conn.execute(
            "INSERT INTO borrowers(name, phone, address, title, first_name, last_name, nic_number,
             created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?8)",
            params![
                new.name,
                new.phone,
                new.address,
                new.title,
                new.first_name,
                new.last_name,
                new.nic_number,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.borrower(id)?
            .ok_or(EngineError::not_found("borrower", id))
    }

    fn update_borrower(&mut self, b: &Borrower) -> Result<Borrower> {
        let changed = self.conn.execute(
            "UPDATE borrowers SET name=?1, phone=?2, address=?3, title=?4, first_name=?5,
             last_name=?6, nic_number=?7, updated_at=?8 WHERE id=?9",
            params![
                b.name,
                b.phone,
                b.address,
                b.title,
                b.first_name,
                b.last_name,
                b.nic_number,
                now_stamp(),
                b.id
            ],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found("borrower", b.id));
        }
        self.borrower(b.id)?
            .ok_or(EngineError::not_found("borrower", b.id))
    }

    fn borrower(&self, id: i64) -> Result<Option<Borrower>> {
        let sql = format!("SELECT {} FROM borrowers WHERE id=?1", BORROWER_COLS);
        Ok(self
            .conn
            .query_row(&sql, params![id], borrower_from_row)
            .optional()?)
    }

    fn borrowers(&self) -> Result<Vec<Borrower>> {
        let sql = format!("SELECT {} FROM borrowers ORDER BY id", BORROWER_COLS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], borrower_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn delete_borrower(&mut self, id: i64) -> Result<()> {
        let tx = self.begin()?;
        tx.execute(
            "DELETE FROM payments WHERE loan_id IN (SELECT id FROM loans WHERE borrower_id=?1)",
            params![id],
        )?;
        tx.execute("DELETE FROM loans WHERE borrower_id=?1", params![id])?;
        let removed = tx.execute("DELETE FROM borrowers WHERE id=?1", params![id])?;
        if removed == 0 {
            return Err(EngineError::not_found("borrower", id));
        }
        tx.commit()?;
        Ok(())
    }

    fn insert_loan(&mut self, new: &NewLoan) -> Result<Loan> {
        if self.borrower(new.borrower_id)?.is_none() {
            return Err(EngineError::not_found("borrower", new.borrower_id));
        }
        let now = now_stamp();
        self.conn.execute(
            "INSERT INTO loans(borrower_id, principal_amount, interest_rate, duration_months,
             duration_days, total_amount, amount_paid, start_date, status, next_payment_date,
             created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,'0',?7,?8,?9,?10,?10)",
            params![
                new.borrower_id,
                new.principal_amount.to_string(),
                new.interest_rate.to_string(),
                new.duration_months,
                new.duration_days,
                new.total_amount.to_string(),
                new.start_date.to_string(),
                new.status.as_str(),
                new.next_payment_date.map(|d| d.to_string()),
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.loan(id)?.ok_or(EngineError::not_found("loan", id))
    }

    fn update_loan(&mut self, loan: &Loan) -> Result<Loan> {
        let tx = self.begin()?;
        check_paid(&tx, loan.id, loan.amount_paid)?;
        tx.execute(
            "UPDATE loans SET borrower_id=?1, principal_amount=?2, interest_rate=?3,
             duration_months=?4, duration_days=?5, total_amount=?6, start_date=?7, status=?8,
             next_payment_date=?9, arrears=?10, updated_at=?11 WHERE id=?12",
            params![
                loan.borrower_id,
                loan.principal_amount.to_string(),
                loan.interest_rate.to_string(),
                loan.duration_months,
                loan.duration_days,
                loan.total_amount.to_string(),
                loan.start_date.to_string(),
                loan.status.as_str(),
                loan.next_payment_date.map(|d| d.to_string()),
                loan.arrears.map(|a| a.to_string()),
                now_stamp(),
                loan.id
            ],
        )?;
        tx.commit()?;
        self.loan(loan.id)?
            .ok_or(EngineError::not_found("loan", loan.id))
    }

    fn loan(&self, id: i64) -> Result<Option<Loan>> {
        let sql = format!("SELECT {} FROM loans WHERE id=?1", LOAN_COLS);
        Ok(self
            .conn
            .query_row(&sql, params![id], loan_from_row)
            .optional()?)
    }

    fn loans(&self) -> Result<Vec<Loan>> {
        let sql = format!("SELECT {} FROM loans ORDER BY id", LOAN_COLS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], loan_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn loans_for_borrower(&self, borrower_id: i64) -> Result<Vec<Loan>> {
        let sql = format!(
            "SELECT {} FROM loans WHERE borrower_id=?1 ORDER BY id",
            LOAN_COLS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![borrower_id], loan_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn delete_loan(&mut self, id: i64) -> Result<()> {
        let tx = self.begin()?;
        tx.execute("DELETE FROM payments WHERE loan_id=?1", params![id])?;
        let removed = tx.execute("DELETE FROM loans WHERE id=?1", params![id])?;
        if removed == 0 {
            return Err(EngineError::not_found("loan", id));
        }
        tx.commit()?;
        Ok(())
    }

    fn payment(&self, id: i64) -> Result<Option<Payment>> {
        let sql = format!("SELECT {} FROM payments WHERE id=?1", PAYMENT_COLS);
        Ok(self
            .conn
            .query_row(&sql, params![id], payment_from_row)
            .optional()?)
    }

    fn payments(&self) -> Result<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments ORDER BY payment_date, payment_time, id",
            PAYMENT_COLS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], payment_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn payments_for_loan(&self, loan_id: i64) -> Result<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments WHERE loan_id=?1
             ORDER BY payment_date DESC, payment_time DESC, id DESC",
            PAYMENT_COLS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![loan_id], payment_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn record_payment(
        &mut self,
        new: &NewPayment,
        expected_paid: Decimal,
        status: LoanStatus,
    ) -> Result<Payment> {
        let tx = self.begin()?;
        check_paid(&tx, new.loan_id, expected_paid)?;
        let now = now_stamp();
        tx.execute(
            "INSERT INTO payments(loan_id, amount, payment_date, payment_time, payment_method,
             notes, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                new.loan_id,
                new.amount.to_string(),
                new.payment_date.to_string(),
                fmt_time(&new.payment_time),
                new.payment_method,
                new.notes,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE loans SET amount_paid=?1, status=?2, updated_at=?3 WHERE id=?4",
            params![
                (expected_paid + new.amount).to_string(),
                status.as_str(),
                now,
                new.loan_id
            ],
        )?;
        tx.commit()?;
        self.payment(id)?
            .ok_or(EngineError::not_found("payment", id))
    }

    fn remove_payment(
        &mut self,
        payment: &Payment,
        expected_paid: Decimal,
        status: LoanStatus,
    ) -> Result<()> {
        let tx = self.begin()?;
        check_paid(&tx, payment.loan_id, expected_paid)?;
        let removed = tx.execute(
            "DELETE FROM payments WHERE id=?1 AND loan_id=?2",
            params![payment.id, payment.loan_id],
        )?;
        if removed == 0 {
            return Err(EngineError::not_found("payment", payment.id));
        }
        tx.execute(
            "UPDATE loans SET amount_paid=?1, status=?2, updated_at=?3 WHERE id=?4",
            params![
                (expected_paid - payment.amount).to_string(),
                status.as_str(),
                now_stamp(),
                payment.loan_id
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn restore(
        &mut self,
        borrowers: &[Borrower],
        loans: &[Loan],
        payments: &[Payment],
    ) -> Result<()> {
        let tx = self.begin()?;
        for b in borrowers {
            tx.execute(
                "INSERT INTO borrowers(id, name, phone, address, title, first_name, last_name,
                 nic_number, created_at, updated_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
                 ON CONFLICT(id) DO UPDATE SET name=excluded.name, phone=excluded.phone,
                 address=excluded.address, title=excluded.title, first_name=excluded.first_name,
                 last_name=excluded.last_name, nic_number=excluded.nic_number,
                 updated_at=excluded.updated_at",
                params![
                    b.id,
                    b.name,
                    b.phone,
                    b.address,
                    b.title,
                    b.first_name,
                    b.last_name,
                    b.nic_number,
                    stamp_or_now(&b.created_at),
                    stamp_or_now(&b.updated_at)
                ],
            )?;
        }
        for l in loans {
            tx.execute(
                "INSERT INTO loans(id, borrower_id, principal_amount, interest_rate,
                 duration_months, duration_days, total_amount, amount_paid, start_date, status,
                 next_payment_date, arrears, created_at, updated_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)
                 ON CONFLICT(id) DO UPDATE SET borrower_id=excluded.borrower_id,
                 principal_amount=excluded.principal_amount,
                 interest_rate=excluded.interest_rate,
                 duration_months=excluded.duration_months, duration_days=excluded.duration_days,
                 total_amount=excluded.total_amount, amount_paid=excluded.amount_paid,
                 start_date=excluded.start_date, status=excluded.status,
                 next_payment_date=excluded.next_payment_date, arrears=excluded.arrears,
                 updated_at=excluded.updated_at",
                params![
                    l.id,
                    l.borrower_id,
                    l.principal_amount.to_string(),
                    l.interest_rate.to_string(),
                    l.duration_months,
                    l.duration_days,
                    l.total_amount.to_string(),
                    l.amount_paid.to_string(),
                    l.start_date.to_string(),
                    l.status.as_str(),
                    l.next_payment_date.map(|d| d.to_string()),
                    l.arrears.map(|a| a.to_string()),
                    stamp_or_now(&l.created_at),
                    stamp_or_now(&l.updated_at)
                ],
            )?;
        }
        for p in payments {
            tx.execute(
                "INSERT INTO payments(id, loan_id, amount, payment_date, payment_time,
                 payment_method, notes, created_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
                 ON CONFLICT(id) DO UPDATE SET loan_id=excluded.loan_id, amount=excluded.amount,
                 payment_date=excluded.payment_date, payment_time=excluded.payment_time,
                 payment_method=excluded.payment_method, notes=excluded.notes",
                params![
                    p.id,
                    p.loan_id,
                    p.amount.to_string(),
                    p.payment_date.to_string(),
                    fmt_time(&p.payment_time),
                    p.payment_method,
                    p.notes,
                    stamp_or_now(&p.created_at)
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
