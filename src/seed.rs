// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Demo household used on first start and by `reset`.

use crate::models::*;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn account(id: &str, name: &str, kind: AccountKind, balance: Decimal) -> Account {
    Account {
        id: id.into(),
        name: name.into(),
        kind,
        balance,
    }
}

fn tx(
    id: &str,
    on: NaiveDate,
    description: &str,
    amount: Decimal,
    category: &str,
    account_id: &str,
) -> Transaction {
    Transaction {
        id: id.into(),
        date: on,
        description: description.into(),
        amount,
        category: category.into(),
        budget_category: None,
        account_id: account_id.into(),
        r#type: TransactionType::for_amount(amount),
    }
}

fn holding(id: &str, symbol: &str, name: &str, qty: Decimal, avg: Decimal, value: Decimal) -> Holding {
    Holding {
        id: id.into(),
        symbol: symbol.into(),
        name: name.into(),
        quantity: qty,
        avg_cost: avg,
        current_value: value,
        zakat_class: ZakatClass::Zakatable,
        realized_pnl: Decimal::ZERO,
        asset_class: Some("Equity".into()),
        goal_id: None,
    }
}

fn trade(id: &str, on: NaiveDate, symbol: &str, qty: Decimal, price: Decimal) -> InvestmentTransaction {
    InvestmentTransaction {
        id: id.into(),
        account_id: "acc-brokerage".into(),
        date: on,
        side: TradeSide::Buy,
        symbol: symbol.into(),
        name: None,
        quantity: qty,
        price,
        total: qty * price,
    }
}

/// Balances in the returned document agree with its transactions and holdings.
pub fn default_data() -> FinancialData {
    let transactions = vec![
        tx("tx-utilities", date(2025, 6, 8), "Electric & water", dec!(-135), "Utilities", "acc-checking"),
        tx("tx-fuel", date(2025, 6, 7), "Fuel", dec!(-60), "Transport", "acc-card"),
        tx("tx-dining", date(2025, 6, 6), "Family dinner", dec!(-86.40), "Dining", "acc-card"),
        tx("tx-groceries", date(2025, 6, 5), "Weekly groceries", dec!(-240.50), "Groceries", "acc-checking"),
        tx("tx-transfer", date(2025, 6, 3), "Monthly saving", dec!(500), "Savings", "acc-savings"),
        tx("tx-rent", date(2025, 6, 2), "Rent", dec!(-1800), "Housing", "acc-checking"),
        tx("tx-salary", date(2025, 6, 1), "Salary", dec!(5200), "Salary", "acc-checking"),
    ];

    let holdings = vec![
        holding("h-aapl", "AAPL", "Apple Inc.", dec!(20), dec!(150), dec!(3800)),
        holding("h-vti", "VTI", "Vanguard Total Stock Market ETF", dec!(15), dec!(200), dec!(3450)),
    ];

    FinancialData {
        accounts: vec![
            account("acc-checking", "Family Checking", AccountKind::Checking, dec!(3024.50)),
            account("acc-savings", "Emergency Savings", AccountKind::Savings, dec!(500)),
            account("acc-card", "Rewards Card", AccountKind::Credit, dec!(-146.40)),
            account("acc-brokerage", "Brokerage", AccountKind::Investment, dec!(7250)),
        ],
        transactions,
        portfolios: vec![Portfolio {
            id: "pf-core".into(),
            name: "Core Portfolio".into(),
            account_id: "acc-brokerage".into(),
            holdings,
        }],
        investment_transactions: vec![
            trade("it-vti", date(2025, 4, 2), "VTI", dec!(15), dec!(200)),
            trade("it-aapl", date(2025, 3, 10), "AAPL", dec!(20), dec!(150)),
        ],
        assets: vec![
            Asset {
                id: "as-home".into(),
                name: "Family home".into(),
                asset_class: "Real Estate".into(),
                value: dec!(450000),
                zakat_class: ZakatClass::NonZakatable,
                goal_id: None,
            },
            Asset {
                id: "as-gold".into(),
                name: "Gold jewellery".into(),
                asset_class: "Gold".into(),
                value: dec!(8000),
                zakat_class: ZakatClass::Zakatable,
                goal_id: Some("g-hajj".into()),
            },
        ],
        liabilities: vec![
            Liability {
                id: "li-mortgage".into(),
                name: "Mortgage".into(),
                kind: "Mortgage".into(),
                balance: dec!(280000),
                interest_rate: Some(dec!(0.045)),
                due_date: None,
            },
            Liability {
                id: "li-car".into(),
                name: "Car loan".into(),
                kind: "Auto".into(),
                balance: dec!(12000),
                interest_rate: Some(dec!(0.062)),
                due_date: Some(date(2027, 9, 1)),
            },
        ],
        goals: vec![
            Goal {
                id: "g-hajj".into(),
                name: "Hajj".into(),
                target_amount: dec!(15000),
                target_date: Some(date(2026, 5, 1)),
            },
            Goal {
                id: "g-college".into(),
                name: "College fund".into(),
                target_amount: dec!(60000),
                target_date: None,
            },
        ],
        budgets: vec![
            Budget {
                id: "b-groceries".into(),
                category: "Groceries".into(),
                limit: dec!(600),
            },
            Budget {
                id: "b-dining".into(),
                category: "Dining".into(),
                limit: dec!(200),
            },
            Budget {
                id: "b-utilities".into(),
                category: "Utilities".into(),
                limit: dec!(250),
            },
            Budget {
                id: "b-housing".into(),
                category: "Housing".into(),
                limit: dec!(1800),
            },
        ],
        watchlist: vec![
            WatchlistItem {
                id: "w-msft".into(),
                symbol: "MSFT".into(),
                name: "Microsoft".into(),
                price: Some(dec!(420)),
            },
            WatchlistItem {
                id: "w-tsla".into(),
                symbol: "TSLA".into(),
                name: "Tesla".into(),
                price: Some(dec!(250)),
            },
        ],
        zakat_payments: vec![ZakatPayment {
            id: "z-2025".into(),
            date: date(2025, 3, 30),
            amount: dec!(400),
            recipient: Some("Local mosque".into()),
            note: None,
        }],
        price_alerts: vec![
            PriceAlert {
                id: "pa-aapl".into(),
                symbol: "AAPL".into(),
                target_price: dec!(200),
                direction: AlertDirection::Above,
                active: true,
            },
            PriceAlert {
                id: "pa-msft".into(),
                symbol: "MSFT".into(),
                target_price: dec!(400),
                direction: AlertDirection::Below,
                active: true,
            },
        ],
    }
}
