// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Persistence, Result};
use crate::errors::PersistenceError;
use crate::models::FinancialData;
use std::sync::{Arc, Mutex, MutexGuard};

/// Keeps the last saved document in process memory only.
///
/// Clones share the same slot, so a caller can keep a handle to inspect what
/// the store wrote after handing the backend over.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<FinancialData>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: FinancialData) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(data))),
        }
    }

    /// Last saved document. Fails if a writer panicked while holding the slot.
    pub fn snapshot(&self) -> Result<Option<FinancialData>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<FinancialData>>> {
        self.slot
            .lock()
            .map_err(|_| PersistenceError::Io("in-memory document lock poisoned".into()))
    }
}

impl Persistence for MemoryStore {
    fn load(&mut self) -> Result<Option<FinancialData>> {
        self.snapshot()
    }

    fn save(&mut self, data: &FinancialData) -> Result<()> {
        *self.lock()? = Some(data.clone());
        Ok(())
    }
}
