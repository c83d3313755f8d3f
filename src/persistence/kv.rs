// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Persistence, Result};
use crate::db;
use crate::models::FinancialData;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

pub const DEFAULT_KEY: &str = "financial_data";

/// Whole document serialized as JSON under a single key.
pub struct KvStore {
    conn: Connection,
    key: String,
}

impl KvStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_connection(db::open(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_connection(db::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            key: DEFAULT_KEY.to_string(),
        }
    }

    /// Stores under `key` instead of the default; one key per user.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl Persistence for KvStore {
    fn load(&mut self) -> Result<Option<FinancialData>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key=?1",
                params![self.key],
                |r| r.get(0),
            )
            .optional()?;
        match raw {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, data: &FinancialData) -> Result<()> {
        let value = serde_json::to_string(data)?;
        self.conn.execute(
            "INSERT INTO kv(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=datetime('now')",
            params![self.key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PersistenceError;

    #[test]
    fn empty_store_loads_none() {
        let mut store = KvStore::in_memory().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn keys_are_isolated() {
        let mut store = KvStore::in_memory().unwrap();
        store.save(&crate::seed::default_data()).unwrap();
        let mut other = KvStore::from_connection(store.conn).with_key("someone_else");
        assert!(other.load().unwrap().is_none());
    }

    #[test]
    fn garbage_value_is_a_serialization_error() {
        let mut store = KvStore::in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO kv(key, value) VALUES(?1, 'not json')",
                params![DEFAULT_KEY],
            )
            .unwrap();
        assert!(matches!(
            store.load(),
            Err(PersistenceError::Serialization(_))
        ));
    }
}
