// src/client/progress.rs
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const LOADING_STEPS: [&str; 4] = [
    "Fetching market data",
    "Analyzing news sentiment",
    "Running price prediction model",
    "Assessing risk",
];

pub const STEP_DURATION: Duration = Duration::from_secs(4);

/// Timer-driven loading indicator. Advances one step per tick and parks on
/// the last step; it knows nothing about actual backend progress.
pub struct LoadingProgress {
    rx: watch::Receiver<usize>,
    task: JoinHandle<()>,
}

impl LoadingProgress {
    pub fn start() -> Self {
        Self::with_step_duration(STEP_DURATION)
    }

    pub fn with_step_duration(step: Duration) -> Self {
        let (tx, rx) = watch::channel(0usize);
        let task = tokio::spawn(async move {
            for next in 1..LOADING_STEPS.len() {
                tokio::time::sleep(step).await;
                if tx.send(next).is_err() {
                    return;
                }
            }
        });
        LoadingProgress { rx, task }
    }

    pub fn current_step(&self) -> usize {
        *self.rx.borrow()
    }

    pub fn current_label(&self) -> &'static str {
        LOADING_STEPS[self.current_step()]
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.rx.clone()
    }
}

impl Drop for LoadingProgress {
    fn drop(&mut self) {
        self.task.abort();
    }
}
