// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use std::path::PathBuf;

use famledger::config::{Backend, Config};
use famledger::store::Store;
use famledger::{cli, commands, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    logging::init(matches.get_flag("verbose"));

    let mut config = Config::load()?;
    if let Some(backend) = matches.get_one::<String>("backend") {
        config.backend = backend.parse().map_err(|e: String| anyhow!(e))?;
    }
    if let Some(owner) = matches.get_one::<String>("owner") {
        config.owner_id = owner.clone();
    }
    if let Some(db) = matches.get_one::<String>("db") {
        config.db_path = Some(PathBuf::from(db));
    }

    let mut store = Store::open(config.open_backend()?, config.store_options())?;

    match matches.subcommand() {
        Some(("init", _)) => match config.backend {
            Backend::Memory => println!("Using in-memory storage; nothing is kept"),
            _ => println!(
                "Data for '{}' kept in {} ({})",
                config.owner_id,
                config.database()?.display(),
                config.backend.as_str()
            ),
        },
        Some(("reset", _)) => {
            store.reset_data()?;
            println!("Restored the demo household");
        }
        Some(("account", sub)) => commands::accounts::handle(&mut store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut store, sub)?,
        Some(("portfolio", sub)) => commands::portfolio::handle(&mut store, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut store, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&mut store, sub)?,
        Some(("asset", sub)) => commands::wealth::handle_assets(&mut store, sub)?,
        Some(("liability", sub)) => commands::wealth::handle_liabilities(&mut store, sub)?,
        Some(("zakat", sub)) => commands::wealth::handle_zakat(&mut store, sub)?,
        Some(("watchlist", sub)) => commands::markets::handle_watchlist(&mut store, sub)?,
        Some(("alert", sub)) => commands::markets::handle_alerts(&mut store, sub)?,
        Some(("watch", sub)) => {
            commands::markets::watch(&mut store, sub, config.ticker_options())?
        }
        Some(("report", sub)) => commands::reports::handle(&mut store, sub)?,
        Some(("ask", sub)) => commands::reports::ask(&store, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }

    store.flush()?;
    Ok(())
}
