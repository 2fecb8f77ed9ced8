// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{d, setup};
use easycollect::models::LoanStatus;
use easycollect::store::{LoanStore, SqliteStore};
use easycollect::{cli, commands};
use std::io::Write;

#[test]
fn import_backup_with_padded_path_refreshes_status() {
    let conn = setup();
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        f,
        r#"{{
  "borrowers": {{
    "3": {{ "id": 3, "first_name": "Kamala", "last_name": "Silva", "phone": "0711111111" }}
  }},
  "loans": [{{ "id": 11, "borrower_id": 3, "principal_amount": 500, "interest_rate": 20,
              "duration_months": 1, "duration_days": 10, "total_amount": 600, "amount_paid": 0,
              "start_date": "2024-01-01", "status": "active" }}],
  "payments": []
}}"#
    )
    .unwrap();
    let padded = format!("  {}  ", f.path().to_str().unwrap());

    let m =
        cli::build_cli().get_matches_from(["easycollect", "import", "backup", "--path", &padded]);
    if let Some(("import", sub)) = m.subcommand() {
        commands::importer::handle(&conn, sub).unwrap();
    }

    let store = SqliteStore::new(&conn);
    let b = store.borrower(3).unwrap().unwrap();
    assert_eq!(b.display_name(), "Kamala Silva");
    let loan = store.loan(11).unwrap().unwrap();
    assert_eq!(loan.total_amount, d("600"));
    // Ended in January 2024, so it is past due by now.
    assert_eq!(loan.status, LoanStatus::Overdue);
}

#[test]
fn malformed_backup_is_rejected() {
    let conn = setup();
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, r#"{{ "borrowers": 12 }}"#).unwrap();

    let path = f.path().to_str().unwrap();
    let m = cli::build_cli().get_matches_from(["easycollect", "import", "backup", "--path", path]);
    let result = match m.subcommand() {
        Some(("import", sub)) => commands::importer::handle(&conn, sub),
        _ => unreachable!(),
    };
    assert!(result.is_err());
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM borrowers", [], |r| r.get(0)).unwrap();
    assert_eq!(n, 0);
}
