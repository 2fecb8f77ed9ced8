// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure loan accounting: no I/O, no clock. Callers pass the reference date.

pub mod status;
pub mod summary;
pub mod terms;

pub use status::{LoanState, classify, days_remaining, end_date, loan_state, progress_percent};
pub use summary::{
    BorrowerStats, DailyCollection, PortfolioSummary, all_borrower_stats, borrower_stats,
    collection_series, daily_collection, payments_on, portfolio_summary,
};
pub use terms::{
    DAYS_PER_MONTH, LoanTerms, MAX_DURATION_DAYS, daily_payment_amount, duration_days,
    months_for_days, total_amount,
};
