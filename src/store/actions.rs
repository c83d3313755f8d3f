// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Store;
use crate::errors::Result;
use crate::ledger::{Command, Crud};
use crate::models::*;
use crate::seed;
use crate::utils::new_id;
use std::sync::Arc;

macro_rules! record_actions {
    ($variant:ident, $ty:ty, add: $add:ident, update: $update:ident, delete: $delete:ident) => {
        record_actions!($variant, $ty, add: $add, delete: $delete);

        pub fn $update(&mut self, record: $ty) -> Result<Arc<FinancialData>> {
            self.dispatch(Command::$variant(Crud::Update(record)))
        }
    };
    ($variant:ident, $ty:ty, add: $add:ident, delete: $delete:ident) => {
        /// Stores a copy of `record` under a fresh id.
        pub fn $add(&mut self, mut record: $ty) -> Result<Arc<FinancialData>> {
            record.id = new_id();
            self.dispatch(Command::$variant(Crud::Add(record)))
        }

        pub fn $delete(&mut self, id: &str) -> Result<Arc<FinancialData>> {
            self.dispatch(Command::$variant(Crud::Delete(id.to_string())))
        }
    };
}

/// Convenience calls for the user interface. Each one builds a command,
/// assigning fresh ids where a record is created, and dispatches it.
impl Store {
    pub fn add_transaction(&mut self, mut tx: Transaction) -> Result<Arc<FinancialData>> {
        tx.id = new_id();
        self.dispatch(Command::AddTransaction(tx))
    }

    pub fn update_transaction(&mut self, tx: Transaction) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::UpdateTransaction(tx))
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::DeleteTransaction(id.to_string()))
    }

    /// A first buy of a symbol opens a holding whose id is derived from the
    /// trade id, see [`crate::ledger::holding_id_for_trade`].
    pub fn record_trade(&mut self, mut trade: InvestmentTransaction) -> Result<Arc<FinancialData>> {
        trade.id = new_id();
        self.dispatch(Command::RecordTrade(trade))
    }

    pub fn add_holding(&mut self, portfolio_id: &str, mut holding: Holding) -> Result<Arc<FinancialData>> {
        holding.id = new_id();
        self.dispatch(Command::AddHolding {
            portfolio_id: portfolio_id.to_string(),
            holding,
        })
    }

    pub fn update_holding(&mut self, portfolio_id: &str, holding: Holding) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::UpdateHolding {
            portfolio_id: portfolio_id.to_string(),
            holding,
        })
    }

    pub fn delete_holding(&mut self, portfolio_id: &str, holding_id: &str) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::DeleteHolding {
            portfolio_id: portfolio_id.to_string(),
            holding_id: holding_id.to_string(),
        })
    }

    pub fn add_portfolio(&mut self, mut portfolio: Portfolio) -> Result<Arc<FinancialData>> {
        portfolio.id = new_id();
        self.dispatch(Command::AddPortfolio(portfolio))
    }

    pub fn update_portfolio(&mut self, portfolio: Portfolio) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::UpdatePortfolio(portfolio))
    }

    pub fn delete_portfolio(&mut self, id: &str) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::DeletePortfolio(id.to_string()))
    }

    // Platforms are accounts as the interface names them.

    pub fn add_platform(&mut self, mut account: Account) -> Result<Arc<FinancialData>> {
        account.id = new_id();
        self.dispatch(Command::AddAccount(account))
    }

    pub fn update_platform(&mut self, account: Account) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::UpdateAccount(account))
    }

    /// Also removes the platform's portfolios and trades. Cash transactions stay.
    pub fn delete_platform(&mut self, id: &str) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::DeleteAccount(id.to_string()))
    }

    record_actions!(Asset, Asset, add: add_asset, update: update_asset, delete: delete_asset);
    record_actions!(Liability, Liability, add: add_liability, update: update_liability, delete: delete_liability);
    record_actions!(Goal, Goal, add: add_goal, update: update_goal, delete: delete_goal);
    record_actions!(Budget, Budget, add: add_budget, update: update_budget, delete: delete_budget);
    record_actions!(Watchlist, WatchlistItem, add: add_watchlist_item, delete: delete_watchlist_item);
    record_actions!(ZakatPayment, ZakatPayment, add: add_zakat_payment, delete: delete_zakat_payment);
    record_actions!(PriceAlert, PriceAlert, add: add_price_alert, update: update_price_alert, delete: delete_price_alert);

    pub fn link_asset_to_goal(&mut self, asset_id: &str, goal_id: Option<&str>) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::LinkAssetToGoal {
            asset_id: asset_id.to_string(),
            goal_id: goal_id.map(str::to_string),
        })
    }

    pub fn link_holding_to_goal(
        &mut self,
        portfolio_id: &str,
        holding_id: &str,
        goal_id: Option<&str>,
    ) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::LinkHoldingToGoal {
            portfolio_id: portfolio_id.to_string(),
            holding_id: holding_id.to_string(),
            goal_id: goal_id.map(str::to_string),
        })
    }

    /// Replaces everything with the demo household.
    pub fn reset_data(&mut self) -> Result<Arc<FinancialData>> {
        self.dispatch(Command::ResetData(Box::new(seed::default_data())))
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::LedgerError;
    use crate::ledger::holding_id_for_trade;
    use crate::models::*;
    use crate::persistence::MemoryStore;
    use crate::store::{Store, StoreOptions};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn open() -> Store {
        Store::open(MemoryStore::new(), StoreOptions::default()).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn buy(symbol: &str, qty: rust_decimal::Decimal, price: rust_decimal::Decimal) -> InvestmentTransaction {
        InvestmentTransaction {
            id: String::new(),
            account_id: "acc-brokerage".into(),
            date: day(1),
            side: TradeSide::Buy,
            symbol: symbol.into(),
            name: Some("Nvidia".into()),
            quantity: qty,
            price,
            total: Default::default(),
        }
    }

    #[test]
    fn new_transaction_gets_fresh_id_and_comes_first() {
        let mut store = open();
        let data = store
            .add_transaction(Transaction {
                id: "ignored".into(),
                date: day(2),
                description: "Bakery".into(),
                amount: dec!(-12),
                category: "Groceries".into(),
                budget_category: None,
                account_id: "acc-checking".into(),
                r#type: TransactionType::Expense,
            })
            .unwrap();
        let first = &data.transactions[0];
        assert_eq!(first.description, "Bakery");
        assert_ne!(first.id, "ignored");
        assert_eq!(data.account("acc-checking").unwrap().balance, dec!(3012.50));
    }

    #[test]
    fn first_buy_opens_holding_named_after_trade() {
        let mut store = open();
        let data = store.record_trade(buy("nvda", dec!(4), dec!(100))).unwrap();
        let trade = &data.investment_transactions[0];
        assert_eq!(trade.symbol, "nvda");
        assert_eq!(trade.total, dec!(400));
        let pf = data.portfolio("pf-core").unwrap();
        let h = pf.holdings.iter().find(|h| h.symbol == "NVDA").unwrap();
        assert_eq!(h.id, holding_id_for_trade(&trade.id));
        assert_eq!(data.account("acc-brokerage").unwrap().balance, dec!(7650));
    }

    #[test]
    fn oversell_keeps_trade_but_not_holding_change() {
        let mut store = open();
        let mut sell = buy("AAPL", dec!(25), dec!(190));
        sell.side = TradeSide::Sell;
        let err = store.record_trade(sell).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientQuantity { .. }));
        let data = store.state();
        assert_eq!(data.investment_transactions.len(), 3);
        let aapl = data.portfolio("pf-core").unwrap().holdings[0].clone();
        assert_eq!(aapl.quantity, dec!(20));
    }

    #[test]
    fn platform_delete_cascades_and_reset_restores() {
        let mut store = open();
        store.delete_platform("acc-brokerage").unwrap();
        let data = store.state();
        assert!(data.portfolios.is_empty());
        assert!(data.investment_transactions.is_empty());
        let data = store.reset_data().unwrap();
        assert_eq!(*data, crate::seed::default_data());
    }

    #[test]
    fn record_families_share_one_shape() {
        let mut store = open();
        let data = store
            .add_goal(Goal {
                id: String::new(),
                name: "New car".into(),
                target_amount: dec!(25000),
                target_date: None,
            })
            .unwrap();
        let goal_id = data.goals.last().unwrap().id.clone();
        store.link_asset_to_goal("as-home", Some(&goal_id)).unwrap();
        let data = store.delete_goal(&goal_id).unwrap();
        assert_eq!(data.goals.len(), 2);
        // Links are not cleaned up when a goal goes away.
        let home = data.assets.iter().find(|a| a.id == "as-home").unwrap();
        assert_eq!(home.goal_id.as_deref(), Some(goal_id.as_str()));
    }
}
