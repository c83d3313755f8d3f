// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Assets, liabilities and zakat payments.

use super::{arg, json_flags, opt};
use crate::models::{Asset, Liability, ZakatClass, ZakatPayment};
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};

pub fn handle_assets(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let zakat_class: ZakatClass =
                arg(sub, "zakat")?.parse().map_err(|e: String| anyhow!(e))?;
            store.add_asset(Asset {
                id: String::new(),
                name: name.to_string(),
                asset_class: arg(sub, "class")?.to_string(),
                value: parse_decimal(arg(sub, "value")?)?,
                zakat_class,
                goal_id: opt(sub, "goal").map(str::to_string),
            })?;
            println!("Added asset '{}'", name);
        }
        Some(("list", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let data = store.state();
            if !maybe_print_json(json, jsonl, &data.assets)? {
                let rows = data
                    .assets
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.clone(),
                            a.name.clone(),
                            a.asset_class.clone(),
                            fmt_money(&a.value),
                            a.zakat_class.as_str().to_string(),
                            a.goal_id.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Name", "Class", "Value", "Zakat", "Goal"], rows)
                );
            }
        }
        Some(("link", sub)) => {
            let id = arg(sub, "id")?;
            let goal = opt(sub, "goal");
            store.link_asset_to_goal(id, goal)?;
            match goal {
                Some(g) => println!("Linked asset {} to goal {}", id, g),
                None => println!("Unlinked asset {}", id),
            }
        }
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            store.delete_asset(id)?;
            println!("Removed asset {}", id);
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_liabilities(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            store.add_liability(Liability {
                id: String::new(),
                name: name.to_string(),
                kind: arg(sub, "kind")?.to_string(),
                balance: parse_decimal(arg(sub, "balance")?)?,
                interest_rate: opt(sub, "rate").map(parse_decimal).transpose()?,
                due_date: opt(sub, "due").map(parse_date).transpose()?,
            })?;
            println!("Added liability '{}'", name);
        }
        Some(("list", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let data = store.state();
            if !maybe_print_json(json, jsonl, &data.liabilities)? {
                let rows = data
                    .liabilities
                    .iter()
                    .map(|l| {
                        vec![
                            l.id.clone(),
                            l.name.clone(),
                            l.kind.clone(),
                            fmt_money(&l.balance),
                            l.interest_rate.map(|r| r.to_string()).unwrap_or_default(),
                            l.due_date.map(|d| d.to_string()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Name", "Kind", "Balance", "Rate", "Due"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            store.delete_liability(id)?;
            println!("Removed liability {}", id);
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_zakat(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let date = match opt(sub, "date") {
                Some(d) => parse_date(d)?,
                None => chrono::Local::now().date_naive(),
            };
            store.add_zakat_payment(ZakatPayment {
                id: String::new(),
                date,
                amount,
                recipient: opt(sub, "recipient").map(str::to_string),
                note: opt(sub, "note").map(str::to_string),
            })?;
            println!("Recorded zakat payment of {} on {}", amount, date);
        }
        Some(("list", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let data = store.state();
            if !maybe_print_json(json, jsonl, &data.zakat_payments)? {
                let rows = data
                    .zakat_payments
                    .iter()
                    .map(|z| {
                        vec![
                            z.date.to_string(),
                            fmt_money(&z.amount),
                            z.recipient.clone().unwrap_or_default(),
                            z.note.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Date", "Amount", "Recipient", "Note"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
