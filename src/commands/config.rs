// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    SETTING_KEYS, currency_symbol, default_payment_method, get_setting, pretty_table, set_setting,
};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = effective(conn, key)?;
            println!("{}", value);
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            set_setting(conn, key, value)?;
            println!("Set {} = {}", key, value.trim());
        }
        Some(("list", _)) => {
            let mut rows = Vec::new();
            for key in SETTING_KEYS {
                let stored = get_setting(conn, key)?;
                rows.push(vec![
                    key.to_string(),
                    effective(conn, key)?,
                    if stored.is_some() { "set" } else { "default" }.to_string(),
                ]);
            }
            println!("{}", pretty_table(&["Key", "Value", "Source"], rows));
        }
        _ => {}
    }
    Ok(())
}

fn effective(conn: &Connection, key: &str) -> Result<String> {
    match key {
        "currency" => currency_symbol(conn),
        "default_payment_method" => default_payment_method(conn),
        _ => Err(anyhow!(
            "Unknown setting '{}' (expected one of: {})",
            key,
            SETTING_KEYS.join(", ")
        )),
    }
}
