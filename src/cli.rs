// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn required(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).required(true).help(help)
}

fn optional(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).help(help)
}

fn by_id(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(required("id", "Record id"))
}

pub fn build_cli() -> Command {
    Command::new("famledger")
        .about("Household ledger: accounts, budgets, portfolios, goals and zakat")
        .version(clap::crate_version!())
        .arg(
            Arg::new("backend")
                .long("backend")
                .global(true)
                .value_parser(["memory", "kv", "tables"])
                .help("Storage backend (overrides config)"),
        )
        .arg(
            Arg::new("owner")
                .long("owner")
                .global(true)
                .help("Household/user id whose document is used"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("SQLite database file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .subcommand(Command::new("init").about("Create the database and seed the demo household"))
        .subcommand(Command::new("reset").about("Replace all data with the demo household"))
        .subcommand(
            Command::new("account")
                .about("Accounts (platforms)")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Account name"))
                        .arg(required("kind", "checking|savings|credit|investment"))
                        .arg(optional("balance", "Opening balance").default_value("0")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("update")
                        .arg(required("id", "Account id"))
                        .arg(optional("name", "New name"))
                        .arg(optional("kind", "New kind"))
                        .arg(optional("balance", "New balance (cash accounts)")),
                )
                .subcommand(by_id("rm", "Delete an account with its portfolios and trades")),
        )
        .subcommand(
            Command::new("tx")
                .about("Cash transactions")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(required("date", "YYYY-MM-DD"))
                        .arg(required("account", "Account id"))
                        .arg(
                            required("amount", "Signed amount, negative for expenses")
                                .allow_hyphen_values(true),
                        )
                        .arg(required("description", "What it was"))
                        .arg(optional("category", "Category (suggested when omitted)"))
                        .arg(optional("budget-category", "Budget bucket if different")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(optional("month", "YYYY-MM"))
                        .arg(optional("account", "Account id"))
                        .arg(optional("category", "Category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(required("id", "Transaction id"))
                        .arg(optional("date", "YYYY-MM-DD"))
                        .arg(optional("account", "Account id"))
                        .arg(optional("amount", "Signed amount").allow_hyphen_values(true))
                        .arg(optional("description", "Description"))
                        .arg(optional("category", "Category")),
                )
                .subcommand(by_id("rm", "Delete a transaction")),
        )
        .subcommand(
            Command::new("portfolio")
                .about("Portfolios, holdings and trades")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Portfolio name"))
                        .arg(required("account", "Investment account id")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(by_id("rm", "Delete a portfolio"))
                .subcommand(json_flags(Command::new("holdings")))
                .subcommand(
                    Command::new("trade")
                        .about("Record a buy or sell")
                        .arg(required("account", "Investment account id"))
                        .arg(required("side", "buy|sell"))
                        .arg(required("symbol", "Ticker symbol"))
                        .arg(required("qty", "Quantity"))
                        .arg(required("price", "Price per unit"))
                        .arg(optional("date", "YYYY-MM-DD (default today)"))
                        .arg(optional("name", "Security name")),
                )
                .subcommand(json_flags(
                    Command::new("trades").arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize)),
                    ),
                ))
                .subcommand(
                    Command::new("rm-holding")
                        .arg(required("portfolio", "Portfolio id"))
                        .arg(required("holding", "Holding id")),
                )
                .subcommand(
                    Command::new("link")
                        .about("Link a holding to a goal (omit --goal to unlink)")
                        .arg(required("portfolio", "Portfolio id"))
                        .arg(required("holding", "Holding id"))
                        .arg(optional("goal", "Goal id")),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly category budgets")
                .subcommand_required(true)
                .subcommand(
                    Command::new("set")
                        .arg(required("category", "Category"))
                        .arg(required("limit", "Monthly limit")),
                )
                .subcommand(json_flags(
                    Command::new("status").arg(optional("month", "YYYY-MM (default this month)")),
                ))
                .subcommand(
                    Command::new("rm").arg(required("category", "Category")),
                ),
        )
        .subcommand(
            Command::new("goal")
                .about("Savings goals")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Goal name"))
                        .arg(required("target", "Target amount"))
                        .arg(optional("date", "Target date YYYY-MM-DD")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(by_id("rm", "Delete a goal")),
        )
        .subcommand(
            Command::new("asset")
                .about("Assets outside accounts")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Asset name"))
                        .arg(required("class", "Asset class"))
                        .arg(required("value", "Current value"))
                        .arg(optional("zakat", "zakatable|non-zakatable").default_value("zakatable"))
                        .arg(optional("goal", "Goal id")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("link")
                        .about("Link an asset to a goal (omit --goal to unlink)")
                        .arg(required("id", "Asset id"))
                        .arg(optional("goal", "Goal id")),
                )
                .subcommand(by_id("rm", "Delete an asset")),
        )
        .subcommand(
            Command::new("liability")
                .about("Loans and other debts")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Name"))
                        .arg(required("kind", "Kind, e.g. Mortgage"))
                        .arg(required("balance", "Outstanding balance"))
                        .arg(optional("rate", "Annual interest rate, e.g. 0.045"))
                        .arg(optional("due", "Due date YYYY-MM-DD")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(by_id("rm", "Delete a liability")),
        )
        .subcommand(
            Command::new("watchlist")
                .about("Symbols to follow")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(required("symbol", "Ticker symbol"))
                        .arg(optional("name", "Display name"))
                        .arg(optional("price", "Last known price")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(by_id("rm", "Remove from the watchlist")),
        )
        .subcommand(
            Command::new("alert")
                .about("Price alerts")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(required("symbol", "Ticker symbol"))
                        .arg(required("target", "Target price"))
                        .arg(required("direction", "above|below")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("triggered")
                            .long("triggered")
                            .action(ArgAction::SetTrue)
                            .help("Only alerts whose condition holds now"),
                    ),
                ))
                .subcommand(by_id("off", "Deactivate an alert"))
                .subcommand(by_id("rm", "Delete an alert")),
        )
        .subcommand(
            Command::new("zakat")
                .about("Zakat payments")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(required("amount", "Amount paid"))
                        .arg(optional("date", "YYYY-MM-DD (default today)"))
                        .arg(optional("recipient", "Recipient"))
                        .arg(optional("note", "Note")),
                )
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("report")
                .about("Summaries")
                .subcommand_required(true)
                .subcommand(json_flags(Command::new("networth")))
                .subcommand(json_flags(Command::new("goals")))
                .subcommand(json_flags(Command::new("portfolio"))),
        )
        .subcommand(
            Command::new("ask")
                .about("Call an assistant tool by name")
                .arg(Arg::new("function").required(false).help("Tool name; omit to list tools"))
                .arg(optional("args", "JSON arguments").default_value("{}")),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(required("out", "CSV file"))
                        .arg(optional("month", "YYYY-MM")),
                )
                .subcommand(Command::new("json").arg(required("out", "JSON file"))),
        )
        .subcommand(
            Command::new("watch")
                .about("Run the market simulator and print net worth after each tick")
                .arg(
                    Arg::new("ticks")
                        .long("ticks")
                        .value_parser(value_parser!(u32))
                        .default_value("5"),
                )
                .arg(
                    Arg::new("interval-ms")
                        .long("interval-ms")
                        .value_parser(value_parser!(u64)),
                ),
        )
}
