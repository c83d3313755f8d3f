// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger reducer: `(document, command) -> document`.
//!
//! Every mutation of [`FinancialData`] goes through [`Ledger::reduce`]. The
//! reducer never performs I/O and never draws fresh identifiers; commands carry
//! everything they need, so replaying the same commands on the same document
//! always yields the same result.

mod accounts;
mod records;
mod tick;
mod trades;
mod transactions;

pub use records::{Crud, Record};
pub use tick::MarketTick;
pub use trades::holding_id_for_trade;

use crate::errors::{LedgerError, Result};
use crate::models::{
    Account, Asset, Budget, FinancialData, Goal, Holding, InvestmentTransaction, Liability,
    Portfolio, PriceAlert, Transaction, WatchlistItem, ZakatClass, ZakatPayment,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTransaction(Transaction),
    UpdateTransaction(Transaction),
    DeleteTransaction(String),
    /// `total` is recomputed from price and quantity.
    RecordTrade(InvestmentTransaction),
    AddHolding {
        portfolio_id: String,
        holding: Holding,
    },
    UpdateHolding {
        portfolio_id: String,
        holding: Holding,
    },
    DeleteHolding {
        portfolio_id: String,
        holding_id: String,
    },
    AddPortfolio(Portfolio),
    UpdatePortfolio(Portfolio),
    DeletePortfolio(String),
    AddAccount(Account),
    UpdateAccount(Account),
    DeleteAccount(String),
    LinkAssetToGoal {
        asset_id: String,
        goal_id: Option<String>,
    },
    LinkHoldingToGoal {
        portfolio_id: String,
        holding_id: String,
        goal_id: Option<String>,
    },
    Asset(Crud<Asset>),
    Liability(Crud<Liability>),
    Goal(Crud<Goal>),
    Budget(Crud<Budget>),
    Watchlist(Crud<WatchlistItem>),
    ZakatPayment(Crud<ZakatPayment>),
    PriceAlert(Crud<PriceAlert>),
    MarketTick(MarketTick),
    ResetData(Box<FinancialData>),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::AddTransaction(_) => "add_transaction",
            Command::UpdateTransaction(_) => "update_transaction",
            Command::DeleteTransaction(_) => "delete_transaction",
            Command::RecordTrade(_) => "record_trade",
            Command::AddHolding { .. } => "add_holding",
            Command::UpdateHolding { .. } => "update_holding",
            Command::DeleteHolding { .. } => "delete_holding",
            Command::AddPortfolio(_) => "add_portfolio",
            Command::UpdatePortfolio(_) => "update_portfolio",
            Command::DeletePortfolio(_) => "delete_portfolio",
            Command::AddAccount(_) => "add_account",
            Command::UpdateAccount(_) => "update_account",
            Command::DeleteAccount(_) => "delete_account",
            Command::LinkAssetToGoal { .. } => "link_asset_to_goal",
            Command::LinkHoldingToGoal { .. } => "link_holding_to_goal",
            Command::Asset(op) => return write!(f, "{}_asset", op.verb()),
            Command::Liability(op) => return write!(f, "{}_liability", op.verb()),
            Command::Goal(op) => return write!(f, "{}_goal", op.verb()),
            Command::Budget(op) => return write!(f, "{}_budget", op.verb()),
            Command::Watchlist(op) => return write!(f, "{}_watchlist_item", op.verb()),
            Command::ZakatPayment(op) => return write!(f, "{}_zakat_payment", op.verb()),
            Command::PriceAlert(op) => return write!(f, "{}_price_alert", op.verb()),
            Command::MarketTick(_) => "market_tick",
            Command::ResetData(_) => "reset_data",
        };
        f.write_str(name)
    }
}

impl Command {
    pub fn is_market_tick(&self) -> bool {
        matches!(self, Command::MarketTick(_))
    }
}

/// Business defaults baked into the reducer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerPolicy {
    /// Zakat class of a holding created implicitly by a first buy.
    pub default_zakat_class: ZakatClass,
    /// Asset class of a holding created implicitly by a first buy.
    pub default_asset_class: Option<String>,
    /// Quantities at or below this are treated as a closed position.
    pub dust: Decimal,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            default_zakat_class: ZakatClass::Zakatable,
            default_asset_class: None,
            dust: dec!(0.00001),
        }
    }
}

/// Result of reducing one command.
///
/// `rejected` is set when the command failed. The state is then either the
/// input document unchanged, or for partial failures (see
/// [`LedgerError::keeps_partial_state`]) the document with the surviving part
/// of the command applied.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub state: FinancialData,
    pub rejected: Option<LedgerError>,
}

impl Reduction {
    pub fn into_result(self) -> Result<FinancialData> {
        match self.rejected {
            Some(err) => Err(err),
            None => Ok(self.state),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    policy: LedgerPolicy,
}

impl Ledger {
    pub fn new(policy: LedgerPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    pub fn reduce(&self, state: &FinancialData, command: Command) -> Reduction {
        let mut next = state.clone();
        // Investment balances are derived; keep them in step even when a
        // partial failure leaves the trade log changed.
        let outcome = match self.apply(&mut next, command) {
            Err(err) if !err.keeps_partial_state() => Err(err),
            applied => accounts::revalue_investment_accounts(&mut next).and(applied),
        };
        match outcome {
            Ok(()) => Reduction {
                state: next,
                rejected: None,
            },
            Err(err) if err.keeps_partial_state() => Reduction {
                state: next,
                rejected: Some(err),
            },
            Err(err) => Reduction {
                state: state.clone(),
                rejected: Some(err),
            },
        }
    }

    fn apply(&self, data: &mut FinancialData, command: Command) -> Result<()> {
        match command {
            Command::AddTransaction(tx) => transactions::add(data, tx),
            Command::UpdateTransaction(tx) => transactions::update(data, tx),
            Command::DeleteTransaction(id) => transactions::delete(data, &id),
            Command::RecordTrade(trade) => trades::record(data, trade, &self.policy),
            Command::AddHolding {
                portfolio_id,
                holding,
            } => trades::add_holding(data, &portfolio_id, holding),
            Command::UpdateHolding {
                portfolio_id,
                holding,
            } => trades::update_holding(data, &portfolio_id, holding),
            Command::DeleteHolding {
                portfolio_id,
                holding_id,
            } => trades::delete_holding(data, &portfolio_id, &holding_id),
            Command::AddPortfolio(p) => accounts::add_portfolio(data, p),
            Command::UpdatePortfolio(p) => accounts::update_portfolio(data, p),
            Command::DeletePortfolio(id) => accounts::delete_portfolio(data, &id),
            Command::AddAccount(a) => accounts::add(data, a),
            Command::UpdateAccount(a) => accounts::update(data, a),
            Command::DeleteAccount(id) => accounts::delete(data, &id),
            Command::LinkAssetToGoal { asset_id, goal_id } => {
                records::link_asset_to_goal(data, &asset_id, goal_id)
            }
            Command::LinkHoldingToGoal {
                portfolio_id,
                holding_id,
                goal_id,
            } => trades::link_holding_to_goal(data, &portfolio_id, &holding_id, goal_id),
            Command::Asset(op) => records::apply(&mut data.assets, op),
            Command::Liability(op) => records::apply(&mut data.liabilities, op),
            Command::Goal(op) => records::apply(&mut data.goals, op),
            Command::Budget(op) => records::apply(&mut data.budgets, op),
            Command::Watchlist(op) => records::apply(&mut data.watchlist, op),
            Command::ZakatPayment(op) => records::apply(&mut data.zakat_payments, op),
            Command::PriceAlert(op) => records::apply(&mut data.price_alerts, op),
            Command::MarketTick(t) => {
                tick::apply(data, &t);
                Ok(())
            }
            Command::ResetData(doc) => {
                *data = *doc;
                Ok(())
            }
        }
    }
}

/// Reduce with the default policy.
pub fn reduce(state: &FinancialData, command: Command) -> Reduction {
    Ledger::default().reduce(state, command)
}

fn require_id(entity: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(LedgerError::validation(format!("{} id must not be empty", entity)));
    }
    Ok(())
}

/// Stable sort, most recent first; equal dates keep their current order.
fn sort_most_recent_first<T>(items: &mut [T], date: impl Fn(&T) -> chrono::NaiveDate) {
    items.sort_by(|a, b| date(b).cmp(&date(a)));
}
