// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::PersistenceError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Famledger", "famledger"));

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")
}

pub fn data_dir() -> Result<PathBuf> {
    let proj = project_dirs()?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.to_path_buf())
}

pub fn config_path() -> Result<PathBuf> {
    let proj = project_dirs()?;
    Ok(proj.config_dir().join("config.json"))
}

pub fn db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("famledger.sqlite"))
}

/// Opens (creating if needed) a database file and makes sure every table exists.
pub fn open(path: &Path) -> std::result::Result<Connection, PersistenceError> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> std::result::Result<Connection, PersistenceError> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> std::result::Result<(), PersistenceError> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS kv(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- Row store: one table per collection, every row owned by one user.
    -- An owner row marks that a document was saved, even an empty one.
    CREATE TABLE IF NOT EXISTS owners(
        owner_id TEXT PRIMARY KEY,
        saved_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- `position` keeps the document's list order.
    CREATE TABLE IF NOT EXISTS accounts(
        owner_id TEXT NOT NULL,
        id TEXT NOT NULL,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        kind TEXT NOT NULL,
        balance TEXT NOT NULL,
        PRIMARY KEY(owner_id, id)
    );

    CREATE TABLE IF NOT EXISTS transactions(
        owner_id TEXT NOT NULL,
        id TEXT NOT NULL,
        position INTEGER NOT NULL,
        date TEXT NOT NULL,
        description TEXT NOT NULL,
        amount TEXT NOT NULL,
        category TEXT NOT NULL,
        budget_category TEXT,
        account_id TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        PRIMARY KEY(owner_id, id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(owner_id, account_id);

    CREATE TABLE IF NOT EXISTS portfolios(
        owner_id TEXT NOT NULL,
        id TEXT NOT NULL,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        account_id TEXT NOT NULL,
        PRIMARY KEY(owner_id, id)
    );

    CREATE TABLE IF NOT EXISTS holdings(
        owner_id TEXT NOT NULL,
        id TEXT NOT NULL,
        position INTEGER NOT NULL,
        portfolio_id TEXT NOT NULL,
        symbol TEXT NOT NULL,
        name TEXT NOT NULL,
        quantity TEXT NOT NULL,
        avg_cost TEXT NOT NULL,
        current_value TEXT NOT NULL,
        zakat_class TEXT NOT NULL,
        realized_pnl TEXT NOT NULL DEFAULT '0',
        asset_class TEXT,
        goal_id TEXT,
        PRIMARY KEY(owner_id, portfolio_id, id)
    );

    CREATE TABLE IF NOT EXISTS investment_transactions(
        owner_id TEXT NOT NULL,
        id TEXT NOT NULL,
        position INTEGER NOT NULL,
        account_id TEXT NOT NULL,
        date TEXT NOT NULL,
        side TEXT NOT NULL CHECK(side IN ('buy','sell')),
        symbol TEXT NOT NULL,
        name TEXT,
        quantity TEXT NOT NULL,
        price TEXT NOT NULL,
        total TEXT NOT NULL,
        PRIMARY KEY(owner_id, id)
    );

    CREATE TABLE IF NOT EXISTS assets(
        owner_id TEXT NOT NULL,
        id TEXT NOT NULL,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        asset_class TEXT NOT NULL,
        value TEXT NOT NULL,
        zakat_class TEXT NOT NULL,
        goal_id TEXT,
        PRIMARY KEY(owner_id, id)
    );

    CREATE TABLE IF NOT EXISTS liabilities(
        owner_id TEXT NOT NULL, id TEXT NOT NULL, position INTEGER NOT NULL, data TEXT NOT NULL,
        PRIMARY KEY(owner_id, id)
    );
    CREATE TABLE IF NOT EXISTS goals(
        owner_id TEXT NOT NULL, id TEXT NOT NULL, position INTEGER NOT NULL, data TEXT NOT NULL,
        PRIMARY KEY(owner_id, id)
    );
    CREATE TABLE IF NOT EXISTS budgets(
        owner_id TEXT NOT NULL, id TEXT NOT NULL, position INTEGER NOT NULL, data TEXT NOT NULL,
        PRIMARY KEY(owner_id, id)
    );
    CREATE TABLE IF NOT EXISTS watchlist(
        owner_id TEXT NOT NULL, id TEXT NOT NULL, position INTEGER NOT NULL, data TEXT NOT NULL,
        PRIMARY KEY(owner_id, id)
    );
    CREATE TABLE IF NOT EXISTS zakat_payments(
        owner_id TEXT NOT NULL, id TEXT NOT NULL, position INTEGER NOT NULL, data TEXT NOT NULL,
        PRIMARY KEY(owner_id, id)
    );
    CREATE TABLE IF NOT EXISTS price_alerts(
        owner_id TEXT NOT NULL, id TEXT NOT NULL, position INTEGER NOT NULL, data TEXT NOT NULL,
        PRIMARY KEY(owner_id, id)
    );
    "#,
    )?;
    Ok(())
}
