// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Periodic simulated price movement.
//!
//! The ticker never touches the document itself. It queues
//! [`Command::MarketTick`] on the store, which applies it like any other
//! command the next time the owner runs [`crate::store::Store::run_pending`].

use crate::ledger::{Command, MarketTick};
use crate::store::CommandSender;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct TickerOptions {
    pub interval: Duration,
    /// Largest relative move per tick, e.g. 0.005 for ±0.5%.
    pub max_drift: Decimal,
}

impl Default for TickerOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
            max_drift: dec!(0.005),
        }
    }
}

pub struct MarketTicker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MarketTicker {
    pub fn start(sender: CommandSender, options: TickerOptions) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("famledger-ticker".into())
            .spawn(move || {
                info!(interval_ms = options.interval.as_millis() as u64, "market ticker started");
                let mut rng = rand::thread_rng();
                loop {
                    match stop_rx.recv_timeout(options.interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        // Explicit stop or the ticker handle was dropped.
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    let tick = MarketTick {
                        seed: rng.r#gen(),
                        max_drift: options.max_drift,
                    };
                    if !sender.send(Command::MarketTick(tick)) {
                        warn!("store is gone; market ticker exiting");
                        break;
                    }
                    debug!("market tick queued");
                }
                info!("market ticker stopped");
            })?;
        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it. No tick is queued after this returns.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("market ticker panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for MarketTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
