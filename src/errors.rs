// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Failures raised by the ledger and its store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Invalid command: {0}")]
    Validation(String),

    #[error("{entity} '{id}' not found")]
    Reference { entity: &'static str, id: String },

    #[error("Cannot sell {requested} {symbol}: only {held} held")]
    InsufficientQuantity {
        symbol: String,
        held: Decimal,
        requested: Decimal,
    },

    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn reference(entity: &'static str, id: impl Into<String>) -> Self {
        LedgerError::Reference {
            entity,
            id: id.into(),
        }
    }

    /// True when the rest of the command still applies, e.g. an oversell
    /// whose trade stays in the log while the holding is left untouched.
    pub fn keeps_partial_state(&self) -> bool {
        matches!(self, LedgerError::InsufficientQuantity { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("SQLite error: {0}")]
    Sqlite(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Stored row is invalid: {0}")]
    Corrupt(String),

    #[error("Persistence writer has stopped")]
    WriterStopped,
}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        PersistenceError::Io(e.to_string())
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(e: rusqlite::Error) -> Self {
        PersistenceError::Sqlite(e.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn only_oversell_keeps_partial_state() {
        let oversell = LedgerError::InsufficientQuantity {
            symbol: "AAPL".into(),
            held: dec!(5),
            requested: dec!(10),
        };
        assert!(oversell.keeps_partial_state());
        assert!(!LedgerError::validation("bad").keeps_partial_state());
        assert!(!LedgerError::reference("Account", "acc9").keeps_partial_state());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = LedgerError::reference("Account", "acc9");
        assert_eq!(err.to_string(), "Account 'acc9' not found");
        let err = LedgerError::InsufficientQuantity {
            symbol: "AAPL".into(),
            held: dec!(5),
            requested: dec!(10),
        };
        assert_eq!(err.to_string(), "Cannot sell 10 AAPL: only 5 held");
    }
}
