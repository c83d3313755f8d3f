// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Persistence, Result};
use crate::db;
use crate::errors::PersistenceError;
use crate::models::{
    Account, Asset, FinancialData, Holding, InvestmentTransaction, Portfolio, Transaction,
};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

const JSON_TABLES: [&str; 6] = [
    "liabilities",
    "goals",
    "budgets",
    "watchlist",
    "zakat_payments",
    "price_alerts",
];

const TYPED_TABLES: [&str; 6] = [
    "accounts",
    "transactions",
    "portfolios",
    "holdings",
    "investment_transactions",
    "assets",
];

/// One table per collection, every row tagged with the owning user.
///
/// A save replaces all of the owner's rows inside one SQLite transaction;
/// other owners' rows are never touched.
pub struct TableStore {
    conn: Connection,
    owner_id: String,
}

impl TableStore {
    pub fn open(path: &Path, owner_id: impl Into<String>) -> Result<Self> {
        Ok(Self {
            conn: db::open(path)?,
            owner_id: owner_id.into(),
        })
    }

    pub fn in_memory(owner_id: impl Into<String>) -> Result<Self> {
        Ok(Self {
            conn: db::open_in_memory()?,
            owner_id: owner_id.into(),
        })
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// True once a document, even an empty one, has been saved for the owner.
    fn has_saved(&self) -> Result<bool> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM owners WHERE owner_id=?1",
            params![self.owner_id],
            |r| r.get(0),
        )?;
        Ok(n > 0)
    }
}

fn decimal(row: &Row<'_>, idx: usize, what: &str) -> Result<Decimal> {
    let s: String = row.get(idx)?;
    Decimal::from_str_exact(&s)
        .map_err(|_| PersistenceError::Corrupt(format!("invalid {} '{}'", what, s)))
}

fn date(row: &Row<'_>, idx: usize) -> Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .map_err(|_| PersistenceError::Corrupt(format!("invalid date '{}'", s)))
}

fn parsed<T: FromStr<Err = String>>(row: &Row<'_>, idx: usize) -> Result<T> {
    let s: String = row.get(idx)?;
    s.parse::<T>().map_err(PersistenceError::Corrupt)
}

fn query_rows<T>(
    conn: &Connection,
    sql: &str,
    owner_id: &str,
    mut map: impl FnMut(&Row<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params![owner_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(map(r)?);
    }
    Ok(out)
}

fn load_json<T: DeserializeOwned>(
    conn: &Connection,
    table: &str,
    owner_id: &str,
) -> Result<Vec<T>> {
    let sql = format!(
        "SELECT data FROM {} WHERE owner_id=?1 ORDER BY position",
        table
    );
    query_rows(conn, &sql, owner_id, |r| {
        let raw: String = r.get(0)?;
        Ok(serde_json::from_str(&raw)?)
    })
}

fn save_json<T: Serialize>(
    tx: &rusqlite::Transaction<'_>,
    table: &str,
    owner_id: &str,
    items: &[T],
    id: impl Fn(&T) -> &str,
) -> Result<()> {
    let mut stmt = tx.prepare_cached(&format!(
        "INSERT INTO {}(owner_id, id, position, data) VALUES (?1,?2,?3,?4)",
        table
    ))?;
    for (pos, item) in items.iter().enumerate() {
        stmt.execute(params![owner_id, id(item), pos as i64, serde_json::to_string(item)?])?;
    }
    Ok(())
}

impl Persistence for TableStore {
    fn load(&mut self) -> Result<Option<FinancialData>> {
        if !self.has_saved()? {
            return Ok(None);
        }
        let conn = &self.conn;
        let owner = self.owner_id.as_str();

        let accounts = query_rows(
            conn,
            "SELECT id, name, kind, balance FROM accounts WHERE owner_id=?1 ORDER BY position",
            owner,
            |r| {
                Ok(Account {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    kind: parsed(r, 2)?,
                    balance: decimal(r, 3, "balance")?,
                })
            },
        )?;

        let transactions = query_rows(
            conn,
            "SELECT id, date, description, amount, category, budget_category, account_id, type
             FROM transactions WHERE owner_id=?1 ORDER BY position",
            owner,
            |r| {
                Ok(Transaction {
                    id: r.get(0)?,
                    date: date(r, 1)?,
                    description: r.get(2)?,
                    amount: decimal(r, 3, "amount")?,
                    category: r.get(4)?,
                    budget_category: r.get(5)?,
                    account_id: r.get(6)?,
                    r#type: parsed(r, 7)?,
                })
            },
        )?;

        let mut holdings_by_portfolio: HashMap<String, Vec<Holding>> = HashMap::new();
        let holdings = query_rows(
            conn,
            "SELECT portfolio_id, id, symbol, name, quantity, avg_cost, current_value,
                    zakat_class, realized_pnl, asset_class, goal_id
             FROM holdings WHERE owner_id=?1 ORDER BY position",
            owner,
            |r| {
                let portfolio_id: String = r.get(0)?;
                let holding = Holding {
                    id: r.get(1)?,
                    symbol: r.get(2)?,
                    name: r.get(3)?,
                    quantity: decimal(r, 4, "quantity")?,
                    avg_cost: decimal(r, 5, "avg_cost")?,
                    current_value: decimal(r, 6, "current_value")?,
                    zakat_class: parsed(r, 7)?,
                    realized_pnl: decimal(r, 8, "realized_pnl")?,
                    asset_class: r.get(9)?,
                    goal_id: r.get(10)?,
                };
                Ok((portfolio_id, holding))
            },
        )?;
        for (portfolio_id, holding) in holdings {
            holdings_by_portfolio
                .entry(portfolio_id)
                .or_default()
                .push(holding);
        }

        let portfolios = query_rows(
            conn,
            "SELECT id, name, account_id FROM portfolios WHERE owner_id=?1 ORDER BY position",
            owner,
            |r| {
                let id: String = r.get(0)?;
                Ok(Portfolio {
                    holdings: holdings_by_portfolio.remove(&id).unwrap_or_default(),
                    id,
                    name: r.get(1)?,
                    account_id: r.get(2)?,
                })
            },
        )?;

        let investment_transactions = query_rows(
            conn,
            "SELECT id, account_id, date, side, symbol, name, quantity, price, total
             FROM investment_transactions WHERE owner_id=?1 ORDER BY position",
            owner,
            |r| {
                Ok(InvestmentTransaction {
                    id: r.get(0)?,
                    account_id: r.get(1)?,
                    date: date(r, 2)?,
                    side: parsed(r, 3)?,
                    symbol: r.get(4)?,
                    name: r.get(5)?,
                    quantity: decimal(r, 6, "quantity")?,
                    price: decimal(r, 7, "price")?,
                    total: decimal(r, 8, "total")?,
                })
            },
        )?;

        let assets = query_rows(
            conn,
            "SELECT id, name, asset_class, value, zakat_class, goal_id
             FROM assets WHERE owner_id=?1 ORDER BY position",
            owner,
            |r| {
                Ok(Asset {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    asset_class: r.get(2)?,
                    value: decimal(r, 3, "value")?,
                    zakat_class: parsed(r, 4)?,
                    goal_id: r.get(5)?,
                })
            },
        )?;

        Ok(Some(FinancialData {
            accounts,
            transactions,
            portfolios,
            investment_transactions,
            assets,
            liabilities: load_json(conn, "liabilities", owner)?,
            goals: load_json(conn, "goals", owner)?,
            budgets: load_json(conn, "budgets", owner)?,
            watchlist: load_json(conn, "watchlist", owner)?,
            zakat_payments: load_json(conn, "zakat_payments", owner)?,
            price_alerts: load_json(conn, "price_alerts", owner)?,
        }))
    }

    fn save(&mut self, data: &FinancialData) -> Result<()> {
        let owner = self.owner_id.clone();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO owners(owner_id) VALUES (?1)
             ON CONFLICT(owner_id) DO UPDATE SET saved_at=datetime('now')",
            params![owner],
        )?;
        for table in TYPED_TABLES.iter().chain(JSON_TABLES.iter()) {
            tx.execute(
                &format!("DELETE FROM {} WHERE owner_id=?1", table),
                params![owner],
            )?;
        }

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO accounts(owner_id, id, position, name, kind, balance)
                 VALUES (?1,?2,?3,?4,?5,?6)",
            )?;
            for (pos, a) in data.accounts.iter().enumerate() {
                stmt.execute(params![
                    owner,
                    a.id,
                    pos as i64,
                    a.name,
                    a.kind.as_str(),
                    a.balance.to_string()
                ])?;
            }

            let mut stmt = tx.prepare_cached(
                "INSERT INTO transactions(owner_id, id, position, date, description, amount,
                                          category, budget_category, account_id, type)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            )?;
            for (pos, t) in data.transactions.iter().enumerate() {
                stmt.execute(params![
                    owner,
                    t.id,
                    pos as i64,
                    t.date.to_string(),
                    t.description,
                    t.amount.to_string(),
                    t.category,
                    t.budget_category,
                    t.account_id,
                    t.r#type.as_str()
                ])?;
            }

            let mut portfolio_stmt = tx.prepare_cached(
                "INSERT INTO portfolios(owner_id, id, position, name, account_id)
                 VALUES (?1,?2,?3,?4,?5)",
            )?;
            let mut holding_stmt = tx.prepare_cached(
                "INSERT INTO holdings(owner_id, id, position, portfolio_id, symbol, name, quantity,
                                      avg_cost, current_value, zakat_class, realized_pnl,
                                      asset_class, goal_id)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            )?;
            let mut holding_pos = 0i64;
            for (pos, p) in data.portfolios.iter().enumerate() {
                portfolio_stmt.execute(params![owner, p.id, pos as i64, p.name, p.account_id])?;
                for h in &p.holdings {
                    holding_stmt.execute(params![
                        owner,
                        h.id,
                        holding_pos,
                        p.id,
                        h.symbol,
                        h.name,
                        h.quantity.to_string(),
                        h.avg_cost.to_string(),
                        h.current_value.to_string(),
                        h.zakat_class.as_str(),
                        h.realized_pnl.to_string(),
                        h.asset_class,
                        h.goal_id
                    ])?;
                    holding_pos += 1;
                }
            }

            let mut stmt = tx.prepare_cached(
                "INSERT INTO investment_transactions(owner_id, id, position, account_id, date, side,
                                                     symbol, name, quantity, price, total)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            )?;
            for (pos, t) in data.investment_transactions.iter().enumerate() {
                stmt.execute(params![
                    owner,
                    t.id,
                    pos as i64,
                    t.account_id,
                    t.date.to_string(),
                    t.side.as_str(),
                    t.symbol,
                    t.name,
                    t.quantity.to_string(),
                    t.price.to_string(),
                    t.total.to_string()
                ])?;
            }

            let mut stmt = tx.prepare_cached(
                "INSERT INTO assets(owner_id, id, position, name, asset_class, value, zakat_class,
                                    goal_id)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            )?;
            for (pos, a) in data.assets.iter().enumerate() {
                stmt.execute(params![
                    owner,
                    a.id,
                    pos as i64,
                    a.name,
                    a.asset_class,
                    a.value.to_string(),
                    a.zakat_class.as_str(),
                    a.goal_id
                ])?;
            }
        }

        save_json(&tx, "liabilities", &owner, &data.liabilities, |x| &x.id)?;
        save_json(&tx, "goals", &owner, &data.goals, |x| &x.id)?;
        save_json(&tx, "budgets", &owner, &data.budgets, |x| &x.id)?;
        save_json(&tx, "watchlist", &owner, &data.watchlist, |x| &x.id)?;
        save_json(&tx, "zakat_payments", &owner, &data.zakat_payments, |x| &x.id)?;
        save_json(&tx, "price_alerts", &owner, &data.price_alerts, |x| &x.id)?;

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owners_do_not_see_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.sqlite");
        let mut alice = TableStore::open(&path, "alice").unwrap();
        alice.save(&crate::seed::default_data()).unwrap();

        let mut bob = TableStore::open(&path, "bob").unwrap();
        assert!(bob.load().unwrap().is_none());
        assert!(alice.load().unwrap().is_some());
    }

    #[test]
    fn emptied_document_still_counts_as_saved() {
        let mut store = TableStore::in_memory("u1").unwrap();
        store.save(&crate::seed::default_data()).unwrap();
        store.save(&FinancialData::default()).unwrap();
        assert_eq!(store.load().unwrap(), Some(FinancialData::default()));
    }

    #[test]
    fn corrupt_decimal_is_reported() {
        let mut store = TableStore::in_memory("u1").unwrap();
        store.save(&FinancialData::default()).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO accounts(owner_id, id, position, name, kind, balance)
                 VALUES ('u1', 'a1', 0, 'Checking', 'Checking', 'lots')",
                [],
            )
            .unwrap();
        let err = store.load().unwrap_err();
        assert_eq!(err, PersistenceError::Corrupt("invalid balance 'lots'".into()));
    }
}
