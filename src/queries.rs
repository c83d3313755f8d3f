// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only views over a [`FinancialData`] document.

use crate::models::{AccountKind, AlertDirection, FinancialData, Transaction, TransactionType};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetWorth {
    pub cash: Decimal,
    pub investments: Decimal,
    pub assets: Decimal,
    pub liabilities: Decimal,
    pub total: Decimal,
}

/// Account balances plus asset values minus outstanding liabilities.
pub fn net_worth(data: &FinancialData) -> NetWorth {
    let (mut cash, mut investments) = (Decimal::ZERO, Decimal::ZERO);
    for a in &data.accounts {
        match a.kind {
            AccountKind::Investment => investments += a.balance,
            _ => cash += a.balance,
        }
    }
    let assets: Decimal = data.assets.iter().map(|a| a.value).sum();
    let liabilities: Decimal = data.liabilities.iter().map(|l| l.balance).sum();
    NetWorth {
        cash,
        investments,
        assets,
        liabilities,
        total: cash + investments + assets - liabilities,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub category: String,
    pub month: String,
    pub limit: Option<Decimal>,
    pub spent: Decimal,
    pub remaining: Option<Decimal>,
}

/// Spending against one category in `month` (`YYYY-MM`). Categories match
/// case-insensitively; `limit` is `None` when no budget is set.
pub fn budget_status(data: &FinancialData, category: &str, month: &str) -> BudgetStatus {
    let limit = data
        .budgets
        .iter()
        .find(|b| b.category.eq_ignore_ascii_case(category))
        .map(|b| b.limit);
    let spent: Decimal = data
        .transactions
        .iter()
        .filter(|t| t.r#type == TransactionType::Expense)
        .filter(|t| t.budget_key().eq_ignore_ascii_case(category))
        .filter(|t| t.date.format("%Y-%m").to_string() == month)
        .map(|t| -t.amount)
        .sum();
    BudgetStatus {
        category: category.to_string(),
        month: month.to_string(),
        limit,
        spent,
        remaining: limit.map(|l| l - spent),
    }
}

pub fn budget_overview(data: &FinancialData, month: &str) -> Vec<BudgetStatus> {
    data.budgets
        .iter()
        .map(|b| budget_status(data, &b.category, month))
        .collect()
}

/// The `n` newest transactions, newest first.
pub fn recent_transactions(data: &FinancialData, n: usize) -> Vec<Transaction> {
    // Edits keep their position, so order by date here.
    let mut txs = data.transactions.clone();
    txs.sort_by(|a, b| b.date.cmp(&a.date));
    txs.truncate(n);
    txs
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal_id: String,
    pub name: String,
    pub target: Decimal,
    pub saved: Decimal,
    pub percent: Decimal,
}

/// Linked asset values plus linked holding values, per goal.
pub fn goal_progress(data: &FinancialData) -> Vec<GoalProgress> {
    data.goals
        .iter()
        .map(|g| {
            let from_assets: Decimal = data
                .assets
                .iter()
                .filter(|a| a.goal_id.as_deref() == Some(g.id.as_str()))
                .map(|a| a.value)
                .sum();
            let from_holdings: Decimal = data
                .portfolios
                .iter()
                .flat_map(|p| p.holdings.iter())
                .filter(|h| h.goal_id.as_deref() == Some(g.id.as_str()))
                .map(|h| h.current_value)
                .sum();
            let saved = from_assets + from_holdings;
            let percent = if g.target_amount.is_zero() {
                Decimal::ZERO
            } else {
                (saved / g.target_amount * Decimal::ONE_HUNDRED).round_dp(2)
            };
            GoalProgress {
                goal_id: g.id.clone(),
                name: g.name.clone(),
                target: g.target_amount,
                saved,
                percent,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggeredAlert {
    pub alert_id: String,
    pub symbol: String,
    pub direction: AlertDirection,
    pub target_price: Decimal,
    pub price: Decimal,
}

/// Last known price for `symbol`: a holding's unit value, else the watchlist.
pub fn price_of(data: &FinancialData, symbol: &str) -> Option<Decimal> {
    data.portfolios
        .iter()
        .flat_map(|p| p.holdings.iter())
        .find(|h| h.symbol.eq_ignore_ascii_case(symbol) && !h.quantity.is_zero())
        .map(|h| h.unit_value())
        .or_else(|| {
            data.watchlist
                .iter()
                .find(|w| w.symbol.eq_ignore_ascii_case(symbol))
                .and_then(|w| w.price)
        })
}

pub fn triggered_alerts(data: &FinancialData) -> Vec<TriggeredAlert> {
    data.price_alerts
        .iter()
        .filter(|a| a.active)
        .filter_map(|a| {
            let price = price_of(data, &a.symbol)?;
            let hit = match a.direction {
                AlertDirection::Above => price >= a.target_price,
                AlertDirection::Below => price <= a.target_price,
            };
            hit.then(|| TriggeredAlert {
                alert_id: a.id.clone(),
                symbol: a.symbol.clone(),
                direction: a.direction,
                target_price: a.target_price,
                price,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingSummary {
    pub portfolio: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
    pub cost_basis: Decimal,
    pub current_value: Decimal,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
}

pub fn portfolio_summary(data: &FinancialData) -> Vec<HoldingSummary> {
    let mut out = Vec::new();
    for p in &data.portfolios {
        for h in &p.holdings {
            let cost_basis = h.avg_cost * h.quantity;
            out.push(HoldingSummary {
                portfolio: p.name.clone(),
                symbol: h.symbol.clone(),
                quantity: h.quantity,
                avg_cost: h.avg_cost,
                cost_basis,
                current_value: h.current_value,
                unrealized_pnl: h.current_value - cost_basis,
                realized_pnl: h.realized_pnl,
            });
        }
    }
    out
}
