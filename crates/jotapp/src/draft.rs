//! Debounced autosave of the composer text.
//!
//! Every change is pushed with [`DraftAutosaver::update`]. The background task
//! waits for a quiet period with no further changes, then writes only the most
//! recent text to the `draft` key. An empty text is never written, which also
//! makes `update("")` a way to cancel a pending write after the draft was used.

use crate::persistence::PersistenceGateway;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
const QUEUE_CAPACITY: usize = 64;

pub struct DraftAutosaver {
    tx: mpsc::Sender<String>,
    task: JoinHandle<()>,
}

impl DraftAutosaver {
    /// Spawns the autosave task. It lives until the autosaver is dropped, and
    /// flushes a pending draft on the way out.
    pub fn start(gateway: PersistenceGateway, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<String>(QUEUE_CAPACITY);
        let task = tokio::spawn(Self::run_loop(gateway, rx, debounce));
        Self { tx, task }
    }

    /// Non-blocking. If the channel is full the change is dropped and logged;
    /// the next accepted change replaces it.
    pub fn update(&self, text: impl Into<String>) {
        match self.tx.try_send(text.into()) {
            Ok(()) => {}
            Err(TrySendError::Full(text)) => {
                tracing::debug!(chars = text.chars().count(), "draft queue full, change dropped");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("draft task gone, change dropped");
            }
        }
    }

    /// Stops accepting changes and waits until a pending draft is written.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "draft task ended abnormally");
        }
    }

    async fn run_loop(
        gateway: PersistenceGateway,
        mut rx: mpsc::Receiver<String>,
        debounce: Duration,
    ) {
        loop {
            let mut latest = match rx.recv().await {
                Some(text) => text,
                None => break,
            };

            loop {
                match tokio::time::timeout(debounce, rx.recv()).await {
                    Ok(Some(text)) => latest = text,
                    Ok(None) => {
                        write_draft(&gateway, &latest);
                        return;
                    }
                    Err(_) => break,
                }
            }

            write_draft(&gateway, &latest);
        }
    }
}

fn write_draft(gateway: &PersistenceGateway, text: &str) {
    if text.is_empty() {
        return;
    }
    if gateway.save_draft(text) {
        tracing::debug!(chars = text.chars().count(), "draft saved");
    }
}
