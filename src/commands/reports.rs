// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{goals, json_flags, opt};
use crate::assistant;
use crate::queries::{net_worth, portfolio_summary};
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rust_decimal::Decimal;

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("networth", sub)) => networth(store, sub)?,
        Some(("goals", sub)) => goals::print_progress(store, sub)?,
        Some(("portfolio", sub)) => portfolio(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn networth(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let nw = net_worth(&store.state());
    if !maybe_print_json(json, jsonl, &nw)? {
        let rows = vec![
            vec!["Cash".to_string(), fmt_money(&nw.cash)],
            vec!["Investments".to_string(), fmt_money(&nw.investments)],
            vec!["Assets".to_string(), fmt_money(&nw.assets)],
            vec!["Liabilities".to_string(), fmt_money(&-nw.liabilities)],
            vec!["Net worth".to_string(), fmt_money(&nw.total)],
        ];
        println!("{}", pretty_table(&["", "Amount"], rows));
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct PortfolioTotals {
    portfolio: String,
    cost_basis: Decimal,
    value: Decimal,
    unrealized_pnl: Decimal,
    realized_pnl: Decimal,
}

fn portfolio(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let mut totals: Vec<PortfolioTotals> = Vec::new();
    for h in portfolio_summary(&store.state()) {
        let idx = match totals.iter().position(|t| t.portfolio == h.portfolio) {
            Some(i) => i,
            None => {
                totals.push(PortfolioTotals {
                    portfolio: h.portfolio.clone(),
                    cost_basis: Decimal::ZERO,
                    value: Decimal::ZERO,
                    unrealized_pnl: Decimal::ZERO,
                    realized_pnl: Decimal::ZERO,
                });
                totals.len() - 1
            }
        };
        let t = &mut totals[idx];
        t.cost_basis += h.cost_basis;
        t.value += h.current_value;
        t.unrealized_pnl += h.unrealized_pnl;
        t.realized_pnl += h.realized_pnl;
    }
    if !maybe_print_json(json, jsonl, &totals)? {
        let rows = totals
            .iter()
            .map(|t| {
                vec![
                    t.portfolio.clone(),
                    fmt_money(&t.cost_basis),
                    fmt_money(&t.value),
                    fmt_money(&t.unrealized_pnl),
                    fmt_money(&t.realized_pnl),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Portfolio", "Cost basis", "Value", "Unrealized", "Realized"],
                rows,
            )
        );
    }
    Ok(())
}

/// `ask` with no function lists the available tools.
pub fn ask(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    let Some(function) = opt(m, "function") else {
        let rows = assistant::declarations()
            .into_iter()
            .map(|d| vec![d.name.to_string(), d.description.to_string()])
            .collect();
        println!("{}", pretty_table(&["Function", "Description"], rows));
        return Ok(());
    };
    let raw = opt(m, "args").unwrap_or("{}");
    let args: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("Invalid JSON arguments '{}'", raw))?;
    let result = assistant::call(&store.state(), function, &args)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
