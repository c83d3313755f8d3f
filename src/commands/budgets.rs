// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, json_flags, opt};
use crate::models::Budget;
use crate::queries::budget_overview;
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, parse_month, pretty_table};
use anyhow::Result;

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(store, sub)?,
        Some(("status", sub)) => status(store, sub)?,
        Some(("rm", sub)) => {
            let category = arg(sub, "category")?;
            let existing = store
                .state()
                .budgets
                .iter()
                .find(|b| b.category.eq_ignore_ascii_case(category))
                .map(|b| b.id.clone());
            match existing {
                Some(id) => {
                    store.delete_budget(&id)?;
                    println!("Removed budget for {}", category);
                }
                None => println!("No budget for {}", category),
            }
        }
        _ => {}
    }
    Ok(())
}

/// One budget per category: setting an existing one replaces its limit.
fn set(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let category = arg(sub, "category")?;
    let limit = parse_decimal(arg(sub, "limit")?)?;
    let existing = store
        .state()
        .budgets
        .iter()
        .find(|b| b.category.eq_ignore_ascii_case(category))
        .cloned();
    match existing {
        Some(mut b) => {
            b.limit = limit;
            store.update_budget(b)?;
        }
        None => {
            store.add_budget(Budget {
                id: String::new(),
                category: category.to_string(),
                limit,
            })?;
        }
    }
    println!("Budget set for {} = {} / month", category, limit);
    Ok(())
}

fn status(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let month = match opt(sub, "month") {
        Some(m) => parse_month(m)?,
        None => chrono::Local::now().format("%Y-%m").to_string(),
    };
    let statuses = budget_overview(&store.state(), &month);
    if !maybe_print_json(json, jsonl, &statuses)? {
        let rows = statuses
            .iter()
            .map(|s| {
                let limit = s.limit.unwrap_or_default();
                let flag = if s.spent > limit { "OVER" } else { "" };
                vec![
                    s.category.clone(),
                    fmt_money(&limit),
                    fmt_money(&s.spent),
                    fmt_money(&s.remaining.unwrap_or_default()),
                    flag.to_string(),
                ]
            })
            .collect();
        println!("Month: {}", month);
        println!(
            "{}",
            pretty_table(&["Category", "Limit", "Spent", "Remaining", ""], rows)
        );
    }
    Ok(())
}
