// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, json_flags, opt};
use crate::models::{Account, AccountKind};
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result, anyhow};

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let kind: AccountKind = arg(sub, "kind")?.parse().map_err(|e: String| anyhow!(e))?;
            let balance = parse_decimal(arg(sub, "balance")?)?;
            let data = store.add_platform(Account {
                id: String::new(),
                name: name.to_string(),
                kind,
                balance,
            })?;
            let id = data.accounts.last().map(|a| a.id.as_str()).unwrap_or_default();
            println!("Added account '{}' ({}) id={}", name, kind, id);
        }
        Some(("list", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let data = store.state();
            if !maybe_print_json(json, jsonl, &data.accounts)? {
                let rows = data
                    .accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.clone(),
                            a.name.clone(),
                            a.kind.to_string(),
                            fmt_money(&a.balance),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Id", "Name", "Kind", "Balance"], rows));
            }
        }
        Some(("update", sub)) => {
            let id = arg(sub, "id")?;
            let mut account = store
                .state()
                .account(id)
                .cloned()
                .with_context(|| format!("Account '{}' not found", id))?;
            if let Some(name) = opt(sub, "name") {
                account.name = name.to_string();
            }
            if let Some(kind) = opt(sub, "kind") {
                account.kind = kind.parse().map_err(|e: String| anyhow!(e))?;
            }
            if let Some(balance) = opt(sub, "balance") {
                account.balance = parse_decimal(balance)?;
            }
            store.update_platform(account)?;
            println!("Updated account {}", id);
        }
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            store.delete_platform(id)?;
            println!("Removed account {}", id);
        }
        _ => {}
    }
    Ok(())
}
