// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use famledger::errors::LedgerError;
use famledger::ledger::{Command, MarketTick, reduce};
use famledger::models::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn account(id: &str, kind: AccountKind) -> Account {
    Account {
        id: id.into(),
        name: id.to_uppercase(),
        kind,
        balance: Decimal::ZERO,
    }
}

fn setup() -> FinancialData {
    FinancialData {
        accounts: vec![
            account("acc1", AccountKind::Checking),
            account("acc2", AccountKind::Savings),
            account("inv", AccountKind::Investment),
        ],
        portfolios: vec![Portfolio {
            id: "pf1".into(),
            name: "Main".into(),
            account_id: "inv".into(),
            holdings: vec![],
        }],
        ..Default::default()
    }
}

fn tx(id: &str, account_id: &str, amount: Decimal, d: u32) -> Transaction {
    Transaction {
        id: id.into(),
        date: day(d),
        description: format!("tx {}", id),
        amount,
        category: "General".into(),
        budget_category: None,
        account_id: account_id.into(),
        r#type: TransactionType::for_amount(amount),
    }
}

fn trade(id: &str, side: TradeSide, qty: Decimal, price: Decimal) -> InvestmentTransaction {
    InvestmentTransaction {
        id: id.into(),
        account_id: "inv".into(),
        date: day(10),
        side,
        symbol: "AAPL".into(),
        name: None,
        quantity: qty,
        price,
        total: Decimal::ZERO,
    }
}

fn apply(data: &FinancialData, cmd: Command) -> FinancialData {
    reduce(data, cmd).into_result().unwrap()
}

fn balance(data: &FinancialData, id: &str) -> Decimal {
    data.account(id).unwrap().balance
}

fn aapl(data: &FinancialData) -> Option<&Holding> {
    data.portfolio("pf1")
        .unwrap()
        .holdings
        .iter()
        .find(|h| h.symbol == "AAPL")
}

fn assert_balances_consistent(data: &FinancialData) {
    for acc in &data.accounts {
        let expected: Decimal = match acc.kind {
            AccountKind::Investment => data
                .holdings_for_account(&acc.id)
                .map(|h| h.current_value)
                .sum(),
            _ => data
                .transactions
                .iter()
                .filter(|t| t.account_id == acc.id)
                .map(|t| t.amount)
                .sum(),
        };
        assert_eq!(acc.balance, expected, "account {}", acc.id);
    }
}

#[test]
fn cash_balances_follow_any_edit_sequence() {
    let mut data = setup();
    let commands = vec![
        Command::AddTransaction(tx("t1", "acc1", dec!(1000), 1)),
        Command::AddTransaction(tx("t2", "acc1", dec!(-250.25), 2)),
        Command::AddTransaction(tx("t3", "acc2", dec!(400), 3)),
        Command::UpdateTransaction(tx("t2", "acc2", dec!(-75), 2)),
        Command::DeleteTransaction("t1".into()),
        Command::DeleteTransaction("missing".into()),
        Command::UpdateTransaction(tx("missing", "acc1", dec!(5), 4)),
    ];
    for cmd in commands {
        data = apply(&data, cmd);
        assert_balances_consistent(&data);
    }
    assert_eq!(balance(&data, "acc1"), Decimal::ZERO);
    assert_eq!(balance(&data, "acc2"), dec!(325));
}

#[test]
fn delete_then_readd_restores_balance() {
    let data = apply(&setup(), Command::AddTransaction(tx("t1", "acc1", dec!(-42.10), 1)));
    let before = balance(&data, "acc1");
    let data = apply(&data, Command::DeleteTransaction("t1".into()));
    let data = apply(&data, Command::AddTransaction(tx("t1", "acc1", dec!(-42.10), 1)));
    assert_eq!(balance(&data, "acc1"), before);
}

#[test]
fn edit_across_accounts_moves_the_amount() {
    let data = apply(&setup(), Command::AddTransaction(tx("t1", "acc1", dec!(-100), 1)));
    let (a1, a2) = (balance(&data, "acc1"), balance(&data, "acc2"));
    let data = apply(&data, Command::UpdateTransaction(tx("t1", "acc2", dec!(-150), 1)));
    assert_eq!(balance(&data, "acc1"), a1 + dec!(100));
    assert_eq!(balance(&data, "acc2"), a2 - dec!(150));
}

#[test]
fn transactions_stay_newest_first() {
    let mut data = setup();
    for (id, d) in [("a", 5), ("b", 1), ("c", 9), ("d", 5)] {
        data = apply(&data, Command::AddTransaction(tx(id, "acc1", dec!(1), d)));
    }
    let ids: Vec<_> = data.transactions.iter().map(|t| t.id.as_str()).collect();
    // The later of two same-day additions comes first.
    assert_eq!(ids, ["c", "d", "a", "b"]);
}

#[test]
fn first_buy_opens_a_holding() {
    let data = apply(&setup(), Command::RecordTrade(trade("b1", TradeSide::Buy, dec!(10), dec!(100))));
    let h = aapl(&data).unwrap();
    assert_eq!(h.quantity, dec!(10));
    assert_eq!(h.avg_cost, dec!(100));
    assert_eq!(h.current_value, dec!(1000));
    assert_eq!(h.realized_pnl, Decimal::ZERO);
    assert_eq!(h.zakat_class, ZakatClass::Zakatable);
    assert_eq!(balance(&data, "inv"), dec!(1000));
}

#[test]
fn second_buy_averages_cost() {
    let data = apply(&setup(), Command::RecordTrade(trade("b1", TradeSide::Buy, dec!(10), dec!(100))));
    let data = apply(&data, Command::RecordTrade(trade("b2", TradeSide::Buy, dec!(10), dec!(200))));
    let h = aapl(&data).unwrap();
    assert_eq!(h.quantity, dec!(20));
    assert_eq!(h.avg_cost, dec!(150));
    assert_balances_consistent(&data);
}

#[test]
fn selling_everything_books_gain_and_closes_position() {
    let data = apply(&setup(), Command::RecordTrade(trade("b1", TradeSide::Buy, dec!(10), dec!(100))));
    let data = apply(&data, Command::RecordTrade(trade("s1", TradeSide::Sell, dec!(4), dec!(120))));
    assert_eq!(aapl(&data).unwrap().realized_pnl, dec!(80));
    assert_eq!(aapl(&data).unwrap().current_value, dec!(600));
    let data = apply(&data, Command::RecordTrade(trade("s2", TradeSide::Sell, dec!(6), dec!(120))));
    assert!(aapl(&data).is_none());
    assert_eq!(balance(&data, "inv"), Decimal::ZERO);
    assert_eq!(data.investment_transactions.len(), 3);
}

#[test]
fn oversell_is_rejected_but_logged() {
    let data = apply(&setup(), Command::RecordTrade(trade("b1", TradeSide::Buy, dec!(5), dec!(100))));
    let reduction = reduce(&data, Command::RecordTrade(trade("s1", TradeSide::Sell, dec!(10), dec!(90))));
    assert_eq!(
        reduction.rejected,
        Some(LedgerError::InsufficientQuantity {
            symbol: "AAPL".into(),
            held: dec!(5),
            requested: dec!(10),
        })
    );
    let after = reduction.state;
    assert_eq!(after.investment_transactions.len(), 2);
    assert_eq!(after.investment_transactions[0].id, "s1");
    assert_eq!(aapl(&after), aapl(&data));
}

#[test]
fn invalid_trades_change_nothing() {
    let data = setup();
    for bad in [
        trade("x1", TradeSide::Buy, Decimal::ZERO, dec!(10)),
        trade("x2", TradeSide::Buy, dec!(-1), dec!(10)),
        InvestmentTransaction {
            account_id: "nope".into(),
            ..trade("x3", TradeSide::Buy, dec!(1), dec!(10))
        },
    ] {
        let r = reduce(&data, Command::RecordTrade(bad));
        assert!(r.rejected.is_some());
        assert_eq!(r.state, data);
    }
}

#[test]
fn trade_without_a_portfolio_changes_nothing() {
    let mut data = setup();
    data.accounts.push(account("inv2", AccountKind::Investment));
    let orphan = InvestmentTransaction {
        account_id: "inv2".into(),
        ..trade("b1", TradeSide::Buy, dec!(3), dec!(50))
    };
    let r = reduce(&data, Command::RecordTrade(orphan));
    assert!(r.rejected.is_none());
    assert_eq!(r.state, data);
}

#[test]
fn oversized_trades_are_rejected_without_panicking() {
    let data = setup();
    let r = reduce(&data, Command::RecordTrade(trade("b1", TradeSide::Buy, Decimal::MAX, dec!(2))));
    assert!(matches!(r.rejected, Some(LedgerError::Validation(_))));
    assert_eq!(r.state, data);

    let data = apply(&data, Command::RecordTrade(trade("b1", TradeSide::Buy, Decimal::MAX, dec!(1))));
    let r = reduce(&data, Command::RecordTrade(trade("b2", TradeSide::Buy, dec!(1), dec!(1))));
    assert!(matches!(r.rejected, Some(LedgerError::Validation(_))));
    assert_eq!(r.state, data);
}

#[test]
fn trade_log_keeps_symbol_as_entered() {
    let lower = InvestmentTransaction {
        symbol: "aapl".into(),
        ..trade("b1", TradeSide::Buy, dec!(2), dec!(100))
    };
    let data = apply(&setup(), Command::RecordTrade(lower));
    assert_eq!(data.investment_transactions[0].symbol, "aapl");
    assert_eq!(aapl(&data).unwrap().quantity, dec!(2));

    let sell = InvestmentTransaction {
        symbol: "Aapl".into(),
        ..trade("s1", TradeSide::Sell, dec!(1), dec!(110))
    };
    let data = apply(&data, Command::RecordTrade(sell));
    assert_eq!(data.investment_transactions[0].symbol, "Aapl");
    assert_eq!(aapl(&data).unwrap().quantity, dec!(1));
}

#[test]
fn ticks_keep_investment_balances_in_step() {
    let mut data = apply(&setup(), Command::RecordTrade(trade("b1", TradeSide::Buy, dec!(7), dec!(133.33))));
    for seed in 0..20 {
        data = apply(&data, Command::MarketTick(MarketTick::new(seed)));
        assert_balances_consistent(&data);
        assert!(data.portfolios.iter().flat_map(|p| &p.holdings).all(|h| h.quantity >= Decimal::ZERO));
    }
}

#[test]
fn deleting_investment_account_cascades() {
    let data = apply(&setup(), Command::RecordTrade(trade("b1", TradeSide::Buy, dec!(1), dec!(10))));
    let data = apply(&data, Command::AddTransaction(tx("t1", "acc1", dec!(10), 1)));
    let data = apply(&data, Command::DeleteAccount("inv".into()));
    assert!(data.portfolios.is_empty());
    assert!(data.investment_transactions.is_empty());
    assert_eq!(data.transactions.len(), 1);
}
