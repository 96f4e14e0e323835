//! Trailing-edge debounce over an mpsc channel.
//!
//! Every event pushes the deadline out by one window. When the window
//! elapses with no new event, the batch collected so far is handed to
//! the settle callback once. Superseded deadlines are simply dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

/// Default quiet period before a batch of edits is acted on.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window: Duration,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Run until the sender side closes.
    ///
    /// A batch still pending when the channel closes is flushed before
    /// returning. Returns the number of settles performed.
    pub async fn run<T, F>(&self, mut rx: mpsc::Receiver<T>, mut on_settle: F) -> usize
    where
        F: FnMut(Vec<T>),
    {
        info!(window_ms = self.window.as_millis() as u64, "debouncer started");

        let mut pending: Vec<T> = Vec::new();
        let mut deadline: Option<Instant> = None;
        let mut settles = 0;

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => {
                        pending.push(event);
                        deadline = Some(Instant::now() + self.window);
                    }
                    None => {
                        if !pending.is_empty() {
                            on_settle(std::mem::take(&mut pending));
                            settles += 1;
                        }
                        info!(settles, "debouncer shutting down");
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    debug!(events = pending.len(), "input settled");
                    on_settle(std::mem::take(&mut pending));
                    settles += 1;
                }
            }
        }

        settles
    }
}
