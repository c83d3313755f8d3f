// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, json_flags, opt};
use crate::models::{InvestmentTransaction, Portfolio, TradeSide};
use crate::queries::portfolio_summary;
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let account = arg(sub, "account")?;
            store.add_portfolio(Portfolio {
                id: String::new(),
                name: name.to_string(),
                account_id: account.to_string(),
                holdings: Vec::new(),
            })?;
            println!("Added portfolio '{}' on account {}", name, account);
        }
        Some(("list", sub)) => list(store, sub)?,
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            store.delete_portfolio(id)?;
            println!("Removed portfolio {}", id);
        }
        Some(("holdings", sub)) => holdings(store, sub)?,
        Some(("trade", sub)) => trade(store, sub)?,
        Some(("trades", sub)) => trades(store, sub)?,
        Some(("rm-holding", sub)) => {
            let holding = arg(sub, "holding")?;
            store.delete_holding(arg(sub, "portfolio")?, holding)?;
            println!("Removed holding {}", holding);
        }
        Some(("link", sub)) => {
            let holding = arg(sub, "holding")?;
            let goal = opt(sub, "goal");
            store.link_holding_to_goal(arg(sub, "portfolio")?, holding, goal)?;
            match goal {
                Some(g) => println!("Linked holding {} to goal {}", holding, g),
                None => println!("Unlinked holding {}", holding),
            }
        }
        _ => {}
    }
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let data = store.state();
    if !maybe_print_json(json, jsonl, &data.portfolios)? {
        let rows = data
            .portfolios
            .iter()
            .map(|p| {
                let value = p.holdings.iter().map(|h| h.current_value).sum();
                vec![
                    p.id.clone(),
                    p.name.clone(),
                    p.account_id.clone(),
                    p.holdings.len().to_string(),
                    fmt_money(&value),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Account", "Holdings", "Value"], rows)
        );
    }
    Ok(())
}

fn holdings(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let summary = portfolio_summary(&store.state());
    if !maybe_print_json(json, jsonl, &summary)? {
        let rows = summary
            .iter()
            .map(|h| {
                vec![
                    h.portfolio.clone(),
                    h.symbol.clone(),
                    h.quantity.normalize().to_string(),
                    fmt_money(&h.avg_cost),
                    fmt_money(&h.current_value),
                    fmt_money(&h.unrealized_pnl),
                    fmt_money(&h.realized_pnl),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Portfolio", "Symbol", "Qty", "Avg cost", "Value", "Unrealized", "Realized"],
                rows,
            )
        );
    }
    Ok(())
}

fn trade(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let side: TradeSide = arg(sub, "side")?.parse().map_err(|e: String| anyhow!(e))?;
    let quantity = parse_decimal(arg(sub, "qty")?)?;
    let price = parse_decimal(arg(sub, "price")?)?;
    let date = match opt(sub, "date") {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let symbol = arg(sub, "symbol")?.to_uppercase();
    store.record_trade(InvestmentTransaction {
        id: String::new(),
        account_id: arg(sub, "account")?.to_string(),
        date,
        side,
        symbol: symbol.clone(),
        name: opt(sub, "name").map(str::to_string),
        quantity,
        price,
        total: quantity * price,
    })?;
    println!(
        "{} {} {} @ {} on {}",
        side.as_str(),
        quantity,
        symbol,
        price,
        date
    );
    Ok(())
}

fn trades(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let data = store.state();
    let limit = sub
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(data.investment_transactions.len());
    let list: Vec<&InvestmentTransaction> =
        data.investment_transactions.iter().take(limit).collect();
    if !maybe_print_json(json, jsonl, &list)? {
        let rows = list
            .iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    t.account_id.clone(),
                    t.side.as_str().to_string(),
                    t.symbol.clone(),
                    t.quantity.normalize().to_string(),
                    fmt_money(&t.price),
                    fmt_money(&t.total),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Account", "Side", "Symbol", "Qty", "Price", "Total"],
                rows,
            )
        );
    }
    Ok(())
}
