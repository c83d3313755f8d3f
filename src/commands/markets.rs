// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Watchlist, price alerts and the live market simulator.

use super::{arg, json_flags, opt};
use crate::models::{AlertDirection, PriceAlert, WatchlistItem};
use crate::queries::{net_worth, triggered_alerts};
use crate::store::Store;
use crate::ticker::{MarketTicker, TickerOptions};
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result, anyhow};
use std::time::Duration;

pub fn handle_watchlist(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let symbol = arg(sub, "symbol")?.trim().to_uppercase();
            store.add_watchlist_item(WatchlistItem {
                id: String::new(),
                name: opt(sub, "name").unwrap_or(&symbol).to_string(),
                symbol: symbol.clone(),
                price: opt(sub, "price").map(parse_decimal).transpose()?,
            })?;
            println!("Watching {}", symbol);
        }
        Some(("list", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let data = store.state();
            if !maybe_print_json(json, jsonl, &data.watchlist)? {
                let rows = data
                    .watchlist
                    .iter()
                    .map(|w| {
                        vec![
                            w.id.clone(),
                            w.symbol.clone(),
                            w.name.clone(),
                            w.price.map(|p| fmt_money(&p)).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Id", "Symbol", "Name", "Price"], rows));
            }
        }
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            store.delete_watchlist_item(id)?;
            println!("Removed {} from the watchlist", id);
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_alerts(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let symbol = arg(sub, "symbol")?.trim().to_uppercase();
            let direction: AlertDirection =
                arg(sub, "direction")?.parse().map_err(|e: String| anyhow!(e))?;
            let target_price = parse_decimal(arg(sub, "target")?)?;
            store.add_price_alert(PriceAlert {
                id: String::new(),
                symbol: symbol.clone(),
                target_price,
                direction,
                active: true,
            })?;
            println!("Alert when {} goes {} {}", symbol, direction.as_str(), target_price);
        }
        Some(("list", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let data = store.state();
            if sub.get_flag("triggered") {
                let hits = triggered_alerts(&data);
                if !maybe_print_json(json, jsonl, &hits)? {
                    let rows = hits
                        .iter()
                        .map(|h| {
                            vec![
                                h.alert_id.clone(),
                                h.symbol.clone(),
                                h.direction.as_str().to_string(),
                                fmt_money(&h.target_price),
                                fmt_money(&h.price),
                            ]
                        })
                        .collect();
                    println!(
                        "{}",
                        pretty_table(&["Id", "Symbol", "When", "Target", "Price"], rows)
                    );
                }
            } else if !maybe_print_json(json, jsonl, &data.price_alerts)? {
                let rows = data
                    .price_alerts
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.clone(),
                            a.symbol.clone(),
                            a.direction.as_str().to_string(),
                            fmt_money(&a.target_price),
                            if a.active { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Symbol", "When", "Target", "Active"], rows)
                );
            }
        }
        Some(("off", sub)) => {
            let id = arg(sub, "id")?;
            let mut alert = store
                .state()
                .price_alerts
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .with_context(|| format!("Price alert '{}' not found", id))?;
            alert.active = false;
            store.update_price_alert(alert)?;
            println!("Deactivated alert {}", id);
        }
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            store.delete_price_alert(id)?;
            println!("Removed alert {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Runs the simulator for `--ticks` ticks, printing net worth after each.
pub fn watch(store: &mut Store, m: &clap::ArgMatches, mut options: TickerOptions) -> Result<()> {
    let ticks = m.get_one::<u32>("ticks").copied().unwrap_or(5) as usize;
    if let Some(ms) = m.get_one::<u64>("interval-ms") {
        options.interval = Duration::from_millis((*ms).max(1));
    }
    let poll = (options.interval / 4).max(Duration::from_millis(10));
    let mut ticker = MarketTicker::start(store.sender(), options)?;

    let mut seen = 0;
    while seen < ticks {
        std::thread::sleep(poll);
        let handled = store.run_pending();
        if handled == 0 {
            continue;
        }
        seen += handled;
        let data = store.state();
        let nw = net_worth(&data);
        println!(
            "tick {:>3}  investments {:>14}  net worth {:>14}",
            seen,
            fmt_money(&nw.investments),
            fmt_money(&nw.total)
        );
        for hit in triggered_alerts(&data) {
            println!(
                "  alert {}: {} is {} {} (now {})",
                hit.alert_id,
                hit.symbol,
                hit.direction.as_str(),
                fmt_money(&hit.target_price),
                fmt_money(&hit.price)
            );
        }
    }
    ticker.stop();
    // Ticks that raced the stop signal.
    store.run_pending();
    Ok(())
}
