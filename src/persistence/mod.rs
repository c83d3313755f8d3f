// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Backing stores for the financial document.
//!
//! Every backend implements the same two-method [`Persistence`] contract, so
//! the store behaves identically whichever one is configured.

mod kv;
mod memory;
mod tables;

pub use kv::KvStore;
pub use memory::MemoryStore;
pub use tables::TableStore;

use crate::errors::PersistenceError;
use crate::models::FinancialData;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, PersistenceError>;

pub trait Persistence: Send {
    /// Returns `None` when nothing has been saved yet.
    fn load(&mut self) -> Result<Option<FinancialData>>;

    /// Writes the whole document. Saving the same document twice is harmless.
    fn save(&mut self, data: &FinancialData) -> Result<()>;
}

impl<P: Persistence + ?Sized> Persistence for Box<P> {
    fn load(&mut self) -> Result<Option<FinancialData>> {
        (**self).load()
    }

    fn save(&mut self, data: &FinancialData) -> Result<()> {
        (**self).save(data)
    }
}

enum Job {
    Save(Arc<FinancialData>),
    Flush(Sender<()>),
}

/// Background thread that owns a [`Persistence`] backend.
///
/// Snapshots queued while a write is in progress are coalesced: only the
/// newest one is written. Failures are collected for the owner to pick up.
pub struct Writer {
    jobs: Option<Sender<Job>>,
    failures: Receiver<PersistenceError>,
    handle: Option<JoinHandle<()>>,
}

impl Writer {
    pub fn spawn(backend: Box<dyn Persistence>) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::channel();
        let (fail_tx, fail_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("famledger-writer".into())
            .spawn(move || run(backend, jobs_rx, fail_tx))
            .ok();
        if handle.is_none() {
            warn!("could not spawn persistence writer; writes will fail");
        }
        Self {
            jobs: handle.as_ref().map(|_| jobs_tx),
            failures: fail_rx,
            handle,
        }
    }

    /// Queues a snapshot for writing without waiting for it.
    pub fn submit(&self, data: Arc<FinancialData>) -> Result<()> {
        self.send(Job::Save(data))
    }

    /// Blocks until every snapshot submitted so far has been handled.
    pub fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = mpsc::channel();
        self.send(Job::Flush(done_tx))?;
        done_rx.recv().map_err(|_| PersistenceError::WriterStopped)
    }

    /// Failures reported by the writer since the last call.
    pub fn drain_failures(&self) -> Vec<PersistenceError> {
        self.failures.try_iter().collect()
    }

    fn send(&self, job: Job) -> Result<()> {
        self.jobs
            .as_ref()
            .ok_or(PersistenceError::WriterStopped)?
            .send(job)
            .map_err(|_| PersistenceError::WriterStopped)
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        // Closing the queue lets the thread finish pending writes and exit.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("persistence writer panicked");
            }
        }
    }
}

fn run(
    mut backend: Box<dyn Persistence>,
    jobs: Receiver<Job>,
    failures: Sender<PersistenceError>,
) {
    while let Ok(first) = jobs.recv() {
        let mut latest = None;
        let mut waiters = Vec::new();
        for job in std::iter::once(first).chain(jobs.try_iter()) {
            match job {
                Job::Save(data) => latest = Some(data),
                Job::Flush(done) => waiters.push(done),
            }
        }
        if let Some(data) = latest {
            match backend.save(&data) {
                Ok(()) => debug!("document saved"),
                Err(e) => {
                    warn!(error = %e, "saving document failed");
                    let _ = failures.send(e);
                }
            }
        }
        for done in waiters {
            let _ = done.send(());
        }
    }
    debug!("persistence writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Recording {
        saves: Arc<Mutex<Vec<usize>>>,
        fail: bool,
    }

    impl Persistence for Recording {
        fn load(&mut self) -> Result<Option<FinancialData>> {
            Ok(None)
        }

        fn save(&mut self, data: &FinancialData) -> Result<()> {
            if self.fail {
                return Err(PersistenceError::Io("disk full".into()));
            }
            self.saves.lock().unwrap().push(data.goals.len());
            Ok(())
        }
    }

    #[test]
    fn flush_waits_for_latest_snapshot() {
        let backend = Recording::default();
        let saves = backend.saves.clone();
        let writer = Writer::spawn(Box::new(backend));
        for n in 0..5 {
            let mut data = FinancialData::default();
            data.goals = (0..n)
                .map(|i| crate::models::Goal {
                    id: format!("g{}", i),
                    name: "G".into(),
                    target_amount: Default::default(),
                    target_date: None,
                })
                .collect();
            writer.submit(Arc::new(data)).unwrap();
        }
        writer.flush().unwrap();
        let saves = saves.lock().unwrap();
        assert_eq!(saves.last(), Some(&4));
        assert!(saves.len() <= 5);
    }

    #[test]
    fn failures_are_reported_not_raised() {
        let writer = Writer::spawn(Box::new(Recording {
            fail: true,
            ..Default::default()
        }));
        writer.submit(Arc::new(FinancialData::default())).unwrap();
        writer.flush().unwrap();
        let failures = writer.drain_failures();
        assert_eq!(failures, vec![PersistenceError::Io("disk full".into())]);
        assert!(writer.drain_failures().is_empty());
    }
}
