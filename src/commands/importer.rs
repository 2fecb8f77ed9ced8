// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup::import_backup;
use crate::service::refresh_statuses;
use crate::store::SqliteStore;
use crate::utils::today;
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("backup", sub)) => import_backup_file(conn, sub),
        _ => Ok(()),
    }
}

fn import_backup_file(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let raw = std::fs::read_to_string(path).with_context(|| format!("Open backup {}", path))?;
    let doc: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("Parse backup {}", path))?;

    let mut store = SqliteStore::new(conn);
    let counts = import_backup(&mut store, &doc).with_context(|| format!("Import {}", path))?;
    let refreshed = refresh_statuses(&mut store, today())?;
    println!(
        "Imported {} borrowers, {} loans, {} payments from {} ({} statuses refreshed)",
        counts.borrowers, counts.loans, counts.payments, path, refreshed
    );
    Ok(())
}
