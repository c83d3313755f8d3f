// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Single owner of the current [`FinancialData`].
//!
//! All mutations, whether they come from the user or from a timer, flow
//! through [`Store::dispatch`]. Timers hold a [`CommandSender`] and the owner
//! drains their commands with [`Store::run_pending`], so reads always see
//! either the state before a command or the state after it.

mod actions;

use crate::errors::{LedgerError, PersistenceError};
use crate::ledger::{Command, Ledger, LedgerPolicy, Reduction};
use crate::models::FinancialData;
use crate::persistence::{Persistence, Writer};
use crate::seed;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error, info, warn};

pub type SubscriptionId = u64;

/// Delivered to subscribers after each accepted command or failed write.
#[derive(Debug)]
pub enum StoreEvent<'a> {
    Changed(&'a FinancialData),
    PersistenceFailed(&'a PersistenceError),
}

type Listener = Box<dyn FnMut(&StoreEvent<'_>)>;

#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub policy: LedgerPolicy,
    /// Write the document after every market tick as well.
    pub persist_ticks: bool,
}

/// Cloneable handle for queueing commands from other threads.
#[derive(Clone)]
pub struct CommandSender(Sender<Command>);

impl CommandSender {
    /// Returns false once the store is gone.
    pub fn send(&self, command: Command) -> bool {
        self.0.send(command).is_ok()
    }
}

pub struct Store {
    state: Arc<FinancialData>,
    ledger: Ledger,
    writer: Writer,
    persist_ticks: bool,
    /// Set when an accepted tick was not handed to the writer.
    unsaved: bool,
    /// First write failure since the last flush.
    failed: Option<PersistenceError>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
    queue_tx: Sender<Command>,
    queue_rx: Receiver<Command>,
}

impl Store {
    /// Hydrates from `backend`, falling back to the demo document when the
    /// backend has nothing saved yet. Backend failures come back as
    /// [`LedgerError::Persistence`].
    pub fn open<P>(mut backend: P, options: StoreOptions) -> Result<Self, LedgerError>
    where
        P: Persistence + 'static,
    {
        let (state, fresh) = match backend.load()? {
            Some(data) => {
                info!(
                    accounts = data.accounts.len(),
                    transactions = data.transactions.len(),
                    "loaded saved document"
                );
                (data, false)
            }
            None => {
                info!("no saved document; starting from the demo household");
                (seed::default_data(), true)
            }
        };
        let (queue_tx, queue_rx) = mpsc::channel();
        let store = Self {
            state: Arc::new(state),
            ledger: Ledger::new(options.policy),
            writer: Writer::spawn(Box::new(backend)),
            persist_ticks: options.persist_ticks,
            unsaved: false,
            failed: None,
            listeners: Vec::new(),
            next_subscription: 1,
            queue_tx,
            queue_rx,
        };
        if fresh {
            store.writer.submit(store.state.clone())?;
        }
        Ok(store)
    }

    pub fn state(&self) -> Arc<FinancialData> {
        self.state.clone()
    }

    pub fn policy(&self) -> &LedgerPolicy {
        self.ledger.policy()
    }

    /// Applies one command and returns the resulting document.
    ///
    /// A rejected command leaves the state untouched, except for partial
    /// failures whose surviving effects are kept and announced like any other
    /// change before the error is returned.
    pub fn dispatch(&mut self, command: Command) -> Result<Arc<FinancialData>, LedgerError> {
        let name = command.to_string();
        let is_tick = command.is_market_tick();
        let Reduction { state, rejected } = self.ledger.reduce(&self.state, command);

        let changed = rejected.as_ref().is_none_or(|e| e.keeps_partial_state());
        if changed {
            self.state = Arc::new(state);
            if is_tick && !self.persist_ticks {
                self.unsaved = true;
            } else {
                self.persist();
            }
            let snapshot = self.state.clone();
            self.notify(&StoreEvent::Changed(&snapshot));
        }
        self.poll_persistence();

        match rejected {
            Some(err) => {
                warn!(command = %name, error = %err, "command rejected");
                Err(err)
            }
            None => {
                if is_tick {
                    debug!(command = %name, "applied");
                } else {
                    info!(command = %name, "applied");
                }
                Ok(self.state.clone())
            }
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent<'_>) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn sender(&self) -> CommandSender {
        CommandSender(self.queue_tx.clone())
    }

    /// Dispatches every queued command in arrival order. Rejections are
    /// logged by `dispatch`; the number of commands handled is returned.
    pub fn run_pending(&mut self) -> usize {
        let pending: Vec<Command> = self.queue_rx.try_iter().collect();
        let handled = pending.len();
        for command in pending {
            let _ = self.dispatch(command);
        }
        handled
    }

    /// Waits until everything accepted so far has been written.
    ///
    /// Returns the first write failure since the previous flush, if any, as
    /// [`LedgerError::Persistence`]. The in-memory state is never rolled back.
    pub fn flush(&mut self) -> Result<(), LedgerError> {
        if self.unsaved {
            self.persist();
        }
        self.writer.flush()?;
        self.poll_persistence();
        match self.failed.take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Collects write failures reported by the background writer and
    /// forwards them to subscribers.
    pub fn poll_persistence(&mut self) -> Vec<PersistenceError> {
        let failures = self.writer.drain_failures();
        for err in &failures {
            error!(error = %err, "persisting document failed");
            self.notify(&StoreEvent::PersistenceFailed(err));
        }
        if self.failed.is_none() {
            self.failed = failures.first().cloned();
        }
        failures
    }

    fn persist(&mut self) {
        match self.writer.submit(self.state.clone()) {
            Ok(()) => self.unsaved = false,
            Err(err) => {
                error!(error = %err, "could not queue document for saving");
                self.notify(&StoreEvent::PersistenceFailed(&err));
                self.failed.get_or_insert(err);
            }
        }
    }

    fn notify(&mut self, event: &StoreEvent<'_>) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MarketTick;
    use crate::persistence::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> (Store, MemoryStore) {
        let backend = MemoryStore::new();
        let store = Store::open(backend.clone(), StoreOptions::default()).unwrap();
        (store, backend)
    }

    #[test]
    fn empty_backend_starts_from_seed() {
        let (mut store, backend) = store();
        assert_eq!(*store.state(), seed::default_data());
        store.flush().unwrap();
        assert_eq!(backend.snapshot().unwrap(), Some(seed::default_data()));
    }

    #[test]
    fn saved_document_wins_over_seed() {
        let backend = MemoryStore::with_data(FinancialData::default());
        let store = Store::open(backend, StoreOptions::default()).unwrap();
        assert!(store.state().accounts.is_empty());
    }

    #[test]
    fn listeners_see_changes_until_unsubscribed() {
        let (mut store, _) = store();
        let seen = Rc::new(RefCell::new(0));
        let counter = seen.clone();
        let id = store.subscribe(move |event| {
            if let StoreEvent::Changed(_) = event {
                *counter.borrow_mut() += 1;
            }
        });
        store.dispatch(Command::DeleteTransaction("tx-fuel".into())).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(Command::DeleteTransaction("tx-rent".into())).unwrap();
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn rejected_command_is_not_announced() {
        let (mut store, _) = store();
        let seen = Rc::new(RefCell::new(false));
        let flag = seen.clone();
        store.subscribe(move |_| *flag.borrow_mut() = true);
        let before = store.state();
        let err = store.dispatch(Command::AddPortfolio(crate::models::Portfolio {
            id: "pf-x".into(),
            name: "Nowhere".into(),
            account_id: "acc-missing".into(),
            holdings: vec![],
        }));
        assert!(matches!(err, Err(LedgerError::Reference { .. })));
        assert_eq!(*store.state(), *before);
        assert!(!*seen.borrow());
    }

    struct Unreadable;

    impl Persistence for Unreadable {
        fn load(&mut self) -> Result<Option<FinancialData>, PersistenceError> {
            Err(PersistenceError::Sqlite("database disk image is malformed".into()))
        }

        fn save(&mut self, _: &FinancialData) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    #[test]
    fn load_failure_is_a_persistence_error() {
        let err = Store::open(Unreadable, StoreOptions::default()).err();
        assert_eq!(
            err,
            Some(LedgerError::Persistence(PersistenceError::Sqlite(
                "database disk image is malformed".into()
            )))
        );
    }

    #[test]
    fn ticks_are_saved_only_on_flush_by_default() {
        let (mut store, backend) = store();
        store.flush().unwrap();
        store.dispatch(Command::MarketTick(MarketTick::new(7))).unwrap();
        // Wait for any queued write without forcing the tick out.
        store.writer.flush().unwrap();
        assert_eq!(backend.snapshot().unwrap(), Some(seed::default_data()));
        store.flush().unwrap();
        assert_eq!(backend.snapshot().unwrap().as_ref(), Some(&*store.state()));
    }

    #[test]
    fn queued_commands_run_in_order() {
        let (mut store, _) = store();
        let sender = store.sender();
        assert!(sender.send(Command::DeleteTransaction("tx-rent".into())));
        assert!(sender.send(Command::DeleteTransaction("tx-salary".into())));
        assert_eq!(store.run_pending(), 2);
        assert_eq!(store.run_pending(), 0);
        let data = store.state();
        assert!(data.transaction("tx-rent").is_none());
        assert!(data.transaction("tx-salary").is_none());
    }
}
