// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use famledger::errors::{LedgerError, PersistenceError};
use famledger::ledger::{Command, MarketTick};
use famledger::models::*;
use famledger::persistence::{KvStore, MemoryStore, Persistence, TableStore};
use famledger::seed::default_data;
use famledger::store::{Store, StoreEvent, StoreOptions};
use rust_decimal_macros::dec;
use std::cell::RefCell;
use std::rc::Rc;

/// Exercises most collections so a lossy backend shows up.
fn busy_document() -> FinancialData {
    let mut store = Store::open(MemoryStore::new(), StoreOptions::default()).unwrap();
    store
        .add_transaction(Transaction {
            id: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
            description: "Pharmacy".into(),
            amount: dec!(-18.75),
            category: "Health".into(),
            budget_category: Some("Groceries".into()),
            account_id: "acc-card".into(),
            r#type: TransactionType::Expense,
        })
        .unwrap();
    store
        .record_trade(InvestmentTransaction {
            id: String::new(),
            account_id: "acc-brokerage".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            side: TradeSide::Sell,
            symbol: "VTI".into(),
            name: None,
            quantity: dec!(5),
            price: dec!(240),
            total: dec!(0),
        })
        .unwrap();
    store
        .link_holding_to_goal("pf-core", "h-aapl", Some("g-college"))
        .unwrap();
    store.dispatch(Command::MarketTick(MarketTick::new(99))).unwrap();
    (*store.state()).clone()
}

fn round_trip(backend: &mut dyn Persistence) {
    // An emptied document is still a saved document.
    backend.save(&FinancialData::default()).unwrap();
    assert_eq!(backend.load().unwrap(), Some(FinancialData::default()));

    let doc = busy_document();
    backend.save(&doc).unwrap();
    let loaded = backend.load().unwrap().unwrap();
    assert_eq!(loaded, doc);
    // Saving what was loaded changes nothing.
    backend.save(&loaded).unwrap();
    assert_eq!(backend.load().unwrap().unwrap(), doc);
}

#[test]
fn every_backend_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    round_trip(&mut MemoryStore::new());
    round_trip(&mut KvStore::open(&dir.path().join("kv.sqlite")).unwrap());
    round_trip(&mut TableStore::open(&dir.path().join("tables.sqlite"), "fam-1").unwrap());
}

#[test]
fn reopened_store_sees_flushed_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("famledger.sqlite");
    {
        let mut store = Store::open(TableStore::open(&path, "fam-1").unwrap(), StoreOptions::default()).unwrap();
        store.delete_transaction("tx-rent").unwrap();
        store.flush().unwrap();
    }
    let store = Store::open(TableStore::open(&path, "fam-1").unwrap(), StoreOptions::default()).unwrap();
    let data = store.state();
    assert!(data.transaction("tx-rent").is_none());
    assert_eq!(data.account("acc-checking").unwrap().balance, dec!(4824.50));

    // Another owner in the same file starts from the demo data.
    let other = Store::open(TableStore::open(&path, "fam-2").unwrap(), StoreOptions::default()).unwrap();
    assert!(other.state().transaction("tx-rent").is_some());
}

#[test]
fn emptied_household_is_not_reseeded_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("famledger.sqlite");
    {
        let mut store = Store::open(TableStore::open(&path, "fam-1").unwrap(), StoreOptions::default()).unwrap();
        for id in ["acc-checking", "acc-savings", "acc-card", "acc-brokerage"] {
            store.delete_platform(id).unwrap();
        }
        store.flush().unwrap();
    }
    let store = Store::open(TableStore::open(&path, "fam-1").unwrap(), StoreOptions::default()).unwrap();
    assert!(store.state().accounts.is_empty());
}

#[test]
fn ticks_are_persisted_when_asked() {
    let backend = MemoryStore::new();
    let options = StoreOptions {
        persist_ticks: true,
        ..Default::default()
    };
    let mut store = Store::open(backend.clone(), options).unwrap();
    store.dispatch(Command::MarketTick(MarketTick::new(3))).unwrap();
    store.flush().unwrap();
    assert_eq!(backend.snapshot().unwrap().as_ref(), Some(&*store.state()));
}

struct Broken;

impl Persistence for Broken {
    fn load(&mut self) -> Result<Option<FinancialData>, PersistenceError> {
        Ok(None)
    }

    fn save(&mut self, _: &FinancialData) -> Result<(), PersistenceError> {
        Err(PersistenceError::Io("read-only file system".into()))
    }
}

#[test]
fn write_failures_are_surfaced_but_state_is_kept() {
    let mut store = Store::open(Broken, StoreOptions::default()).unwrap();
    let failures = Rc::new(RefCell::new(Vec::new()));
    let sink = failures.clone();
    store.subscribe(move |event| {
        if let StoreEvent::PersistenceFailed(e) = event {
            sink.borrow_mut().push((*e).clone());
        }
    });
    store.delete_transaction("tx-fuel").unwrap();
    let err = store.flush().unwrap_err();
    assert_eq!(
        err,
        LedgerError::Persistence(PersistenceError::Io("read-only file system".into()))
    );
    assert!(!failures.borrow().is_empty());
    assert!(store.state().transaction("tx-fuel").is_none());
}

#[test]
fn reset_restores_the_demo_household() {
    let mut store = Store::open(MemoryStore::with_data(FinancialData::default()), StoreOptions::default()).unwrap();
    assert!(store.state().accounts.is_empty());
    let data = store.reset_data().unwrap();
    assert_eq!(*data, default_data());
}
