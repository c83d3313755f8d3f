// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Settings read from `config.json`, then overridden by `FAMLEDGER_*`
//! environment variables, then by command-line flags.

use crate::db;
use crate::ledger::LedgerPolicy;
use crate::persistence::{KvStore, MemoryStore, Persistence, TableStore};
use crate::store::StoreOptions;
use crate::ticker::TickerOptions;
use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    #[default]
    Kv,
    Tables,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Kv => "kv",
            Backend::Tables => "tables",
        }
    }
}

impl FromStr for Backend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "kv" => Ok(Backend::Kv),
            "tables" => Ok(Backend::Tables),
            other => Err(format!("Unknown backend '{}' (memory|kv|tables)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub owner_id: String,
    /// Database file; the platform data dir when unset.
    pub db_path: Option<PathBuf>,
    pub tick_interval_ms: u64,
    pub tick_max_drift: Decimal,
    pub persist_ticks: bool,
    pub ledger: LedgerPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            owner_id: "local".into(),
            db_path: None,
            tick_interval_ms: 3000,
            tick_max_drift: dec!(0.005),
            persist_ticks: false,
            ledger: LedgerPolicy::default(),
        }
    }
}

impl Config {
    /// Config file plus environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_from(&db::config_path()?)?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Defaults when `path` does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = var("FAMLEDGER_BACKEND") {
            self.backend = v.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Some(v) = var("FAMLEDGER_OWNER") {
            self.owner_id = v;
        }
        if let Some(v) = var("FAMLEDGER_DB") {
            self.db_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("FAMLEDGER_TICK_MS") {
            self.tick_interval_ms = v
                .parse()
                .with_context(|| format!("Invalid FAMLEDGER_TICK_MS '{}'", v))?;
        }
        if let Some(v) = var("FAMLEDGER_TICK_DRIFT") {
            self.tick_max_drift = v
                .parse()
                .with_context(|| format!("Invalid FAMLEDGER_TICK_DRIFT '{}'", v))?;
        }
        if let Some(v) = var("FAMLEDGER_PERSIST_TICKS") {
            self.persist_ticks = matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            policy: self.ledger.clone(),
            persist_ticks: self.persist_ticks,
        }
    }

    pub fn ticker_options(&self) -> TickerOptions {
        TickerOptions {
            interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            max_drift: self.tick_max_drift,
        }
    }

    pub fn database(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(p) => Ok(p.clone()),
            None => db::db_path(),
        }
    }

    pub fn open_backend(&self) -> Result<Box<dyn Persistence>> {
        if self.owner_id.trim().is_empty() {
            return Err(anyhow!("Owner id must not be empty"));
        }
        Ok(match self.backend {
            Backend::Memory => Box::new(MemoryStore::new()),
            Backend::Kv => Box::new(
                KvStore::open(&self.database()?)?.with_key(format!("financial_data/{}", self.owner_id)),
            ),
            Backend::Tables => Box::new(TableStore::open(&self.database()?, self.owner_id.clone())?),
        })
    }
}
