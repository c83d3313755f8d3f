// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{LedgerPolicy, records::insert_new, require_id, sort_most_recent_first};
use crate::errors::{LedgerError, Result};
use crate::models::{FinancialData, Holding, InvestmentTransaction, Portfolio, TradeSide};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Identifier for a holding opened by a trade; derived so replays agree.
pub fn holding_id_for_trade(trade_id: &str) -> String {
    format!("h-{}", trade_id)
}

fn validate(trade: &InvestmentTransaction) -> Result<()> {
    require_id("Trade", &trade.id)?;
    if trade.symbol.trim().is_empty() {
        return Err(LedgerError::validation("Trade symbol must not be empty"));
    }
    if trade.quantity <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "Trade quantity must be positive, got {}",
            trade.quantity
        )));
    }
    if trade.price.is_sign_negative() && !trade.price.is_zero() {
        return Err(LedgerError::validation(format!(
            "Trade price must not be negative, got {}",
            trade.price
        )));
    }
    Ok(())
}

fn too_large(what: &str) -> LedgerError {
    LedgerError::validation(format!("{} is out of range", what))
}

/// Appends the trade to the log and applies it to the first portfolio linked
/// to the trade's account. Without such a portfolio nothing changes.
///
/// The log entry stands even when the holding update is refused: an oversell
/// returns [`LedgerError::InsufficientQuantity`] with the trade recorded and
/// the holding untouched. The symbol is logged as entered.
pub(super) fn record(
    data: &mut FinancialData,
    mut trade: InvestmentTransaction,
    policy: &LedgerPolicy,
) -> Result<()> {
    validate(&trade)?;
    if data.account(&trade.account_id).is_none() {
        return Err(LedgerError::reference("Account", trade.account_id));
    }
    trade.total = trade
        .price
        .checked_mul(trade.quantity)
        .ok_or_else(|| too_large("Trade total"))?;

    let Some(pidx) = data
        .portfolios
        .iter()
        .position(|p| p.account_id == trade.account_id)
    else {
        warn!(
            account_id = %trade.account_id,
            symbol = %trade.symbol,
            "no portfolio for trade account; trade ignored"
        );
        return Ok(());
    };

    insert_new(&mut data.investment_transactions, trade.clone())?;
    if let Some(last) = data.investment_transactions.pop() {
        data.investment_transactions.insert(0, last);
    }
    sort_most_recent_first(&mut data.investment_transactions, |t| t.date);

    let portfolio = &mut data.portfolios[pidx];
    match trade.side {
        TradeSide::Buy => apply_buy(portfolio, &trade, policy),
        TradeSide::Sell => apply_sell(portfolio, &trade, policy),
    }
}

fn apply_buy(
    portfolio: &mut Portfolio,
    trade: &InvestmentTransaction,
    policy: &LedgerPolicy,
) -> Result<()> {
    let cost = trade
        .price
        .checked_mul(trade.quantity)
        .ok_or_else(|| too_large("Trade total"))?;
    match portfolio
        .holdings
        .iter_mut()
        .find(|h| h.symbol.eq_ignore_ascii_case(trade.symbol.trim()))
    {
        Some(h) => {
            let new_qty = h
                .quantity
                .checked_add(trade.quantity)
                .ok_or_else(|| too_large("Holding quantity"))?;
            let avg_cost = h
                .avg_cost
                .checked_mul(h.quantity)
                .and_then(|basis| basis.checked_add(cost))
                .and_then(|basis| basis.checked_div(new_qty))
                .ok_or_else(|| too_large("Holding cost basis"))?;
            let value = h
                .current_value
                .checked_add(cost)
                .ok_or_else(|| too_large("Holding value"))?;
            h.quantity = new_qty;
            h.avg_cost = avg_cost;
            h.current_value = value;
        }
        None => {
            let symbol = trade.symbol.trim().to_uppercase();
            portfolio.holdings.push(Holding {
                id: holding_id_for_trade(&trade.id),
                name: trade.name.clone().unwrap_or_else(|| symbol.clone()),
                symbol,
                quantity: trade.quantity,
                avg_cost: trade.price,
                current_value: cost,
                zakat_class: policy.default_zakat_class,
                realized_pnl: Decimal::ZERO,
                asset_class: policy.default_asset_class.clone(),
                goal_id: None,
            })
        }
    }
    Ok(())
}

fn apply_sell(
    portfolio: &mut Portfolio,
    trade: &InvestmentTransaction,
    policy: &LedgerPolicy,
) -> Result<()> {
    let Some(idx) = portfolio
        .holdings
        .iter()
        .position(|h| h.symbol.eq_ignore_ascii_case(trade.symbol.trim()))
    else {
        return Err(LedgerError::InsufficientQuantity {
            symbol: trade.symbol.clone(),
            held: Decimal::ZERO,
            requested: trade.quantity,
        });
    };
    let h = &mut portfolio.holdings[idx];
    if trade.quantity > h.quantity {
        return Err(LedgerError::InsufficientQuantity {
            symbol: trade.symbol.clone(),
            held: h.quantity,
            requested: trade.quantity,
        });
    }
    let remaining = h.quantity - trade.quantity;
    let realized = trade
        .price
        .checked_sub(h.avg_cost)
        .and_then(|gain| gain.checked_mul(trade.quantity))
        .and_then(|gain| h.realized_pnl.checked_add(gain))
        .ok_or_else(|| too_large("Realized gain"))?;
    let value = h
        .current_value
        .checked_mul(remaining)
        .and_then(|v| v.checked_div(h.quantity))
        .ok_or_else(|| too_large("Holding value"))?;
    h.realized_pnl = realized;
    h.current_value = value;
    h.quantity = remaining;
    if remaining <= policy.dust {
        debug!(symbol = %trade.symbol, "position closed");
        portfolio.holdings.remove(idx);
    }
    Ok(())
}

fn find_portfolio<'a>(
    data: &'a mut FinancialData,
    portfolio_id: &str,
) -> Option<&'a mut Portfolio> {
    data.portfolios.iter_mut().find(|p| p.id == portfolio_id)
}

fn validate_holding(holding: &Holding) -> Result<()> {
    if holding.quantity.is_sign_negative() && !holding.quantity.is_zero() {
        return Err(LedgerError::validation(format!(
            "Holding {} quantity must not be negative, got {}",
            holding.symbol, holding.quantity
        )));
    }
    Ok(())
}

pub(super) fn add_holding(
    data: &mut FinancialData,
    portfolio_id: &str,
    holding: Holding,
) -> Result<()> {
    validate_holding(&holding)?;
    let portfolio = find_portfolio(data, portfolio_id)
        .ok_or_else(|| LedgerError::reference("Portfolio", portfolio_id))?;
    insert_new(&mut portfolio.holdings, holding)
}

pub(super) fn update_holding(
    data: &mut FinancialData,
    portfolio_id: &str,
    holding: Holding,
) -> Result<()> {
    validate_holding(&holding)?;
    let slot = find_portfolio(data, portfolio_id)
        .and_then(|p| p.holdings.iter_mut().find(|h| h.id == holding.id));
    match slot {
        Some(slot) => *slot = holding,
        None => debug!(portfolio_id, id = %holding.id, "update of unknown holding ignored"),
    }
    Ok(())
}

pub(super) fn delete_holding(
    data: &mut FinancialData,
    portfolio_id: &str,
    holding_id: &str,
) -> Result<()> {
    if let Some(p) = find_portfolio(data, portfolio_id) {
        p.holdings.retain(|h| h.id != holding_id);
    }
    Ok(())
}

pub(super) fn link_holding_to_goal(
    data: &mut FinancialData,
    portfolio_id: &str,
    holding_id: &str,
    goal_id: Option<String>,
) -> Result<()> {
    let slot = find_portfolio(data, portfolio_id)
        .and_then(|p| p.holdings.iter_mut().find(|h| h.id == holding_id));
    match slot {
        Some(h) => h.goal_id = goal_id,
        None => debug!(portfolio_id, holding_id, "link of unknown holding ignored"),
    }
    Ok(())
}
