//! Shared wall clock broadcast at a fixed cadence.
//!
//! Run phases are derived from timestamps, never stored, so anything that
//! reports READY/RUNNING needs a ticking "now". The ticker owns one tokio
//! task publishing the current time on a watch channel; handlers subscribe
//! and read the latest value without coordinating.

use crate::domain::TimeMs;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct Ticker {
    tx: watch::Sender<TimeMs>,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn the clock task publishing `TimeMs::now()` every `period`.
    pub fn start(period: Duration) -> Self {
        let (tx, _rx) = watch::channel(TimeMs::now());
        let task_tx = tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                // send_replace never fails, so ticking before the first
                // subscriber arrives cannot kill the task.
                task_tx.send_replace(TimeMs::now());
            }
        });
        Self { tx, handle }
    }

    pub fn subscribe(&self) -> watch::Receiver<TimeMs> {
        self.tx.subscribe()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
