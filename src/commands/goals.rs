// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, json_flags, opt};
use crate::models::Goal;
use crate::queries::goal_progress;
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let target_date = opt(sub, "date").map(parse_date).transpose()?;
            store.add_goal(Goal {
                id: String::new(),
                name: name.to_string(),
                target_amount: parse_decimal(arg(sub, "target")?)?,
                target_date,
            })?;
            println!("Added goal '{}'", name);
        }
        Some(("list", sub)) => print_progress(store, sub)?,
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            store.delete_goal(id)?;
            println!("Removed goal {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Goals with how much of each target linked assets and holdings cover.
pub fn print_progress(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let data = store.state();
    let progress = goal_progress(&data);
    if !maybe_print_json(json, jsonl, &progress)? {
        let rows = progress
            .iter()
            .zip(data.goals.iter())
            .map(|(p, g)| {
                vec![
                    p.goal_id.clone(),
                    p.name.clone(),
                    fmt_money(&p.target),
                    fmt_money(&p.saved),
                    format!("{}%", p.percent),
                    g.target_date.map(|d| d.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Goal", "Target", "Saved", "Progress", "By"], rows)
        );
    }
    Ok(())
}
