// src/client/disclaimer.rs
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const SHOWN_FOR: Duration = Duration::from_secs(8);
pub const HIDDEN_FOR: Duration = Duration::from_secs(3);

pub const DISCLAIMER: &str =
    "Price prediction is under development. Do not use it for trading decisions.";

/// Show/hide cycle for the prediction disclaimer, starting visible. Runs
/// until dropped.
pub struct DisclaimerCycle {
    rx: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl DisclaimerCycle {
    pub fn start() -> Self {
        Self::with_timing(SHOWN_FOR, HIDDEN_FOR)
    }

    pub fn with_timing(shown: Duration, hidden: Duration) -> Self {
        let (tx, rx) = watch::channel(true);
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(shown).await;
                if tx.send(false).is_err() {
                    return;
                }
                tokio::time::sleep(hidden).await;
                if tx.send(true).is_err() {
                    return;
                }
            }
        });
        DisclaimerCycle { rx, task }
    }

    pub fn is_visible(&self) -> bool {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }
}

impl Drop for DisclaimerCycle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
