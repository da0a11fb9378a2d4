//! # Periodic Backups
//!
//! [`BackupScheduler::start`] spawns a tokio task that writes a timestamped
//! backup of the latest published snapshot once per [`BackupInterval`]. The
//! first backup is written one full interval after start.
//!
//! The task is owned by the returned [`BackupHandle`]. It ends when the handle
//! is stopped or dropped, so tearing down the engine never leaks the timer.

use crate::error::{JotError, Result};
use crate::model::now;
use crate::persistence::{PersistenceGateway, Retention};
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const MIN_INTERVAL_MINUTES: u64 = 5;
pub const MAX_INTERVAL_MINUTES: u64 = 1440;
pub const DEFAULT_INTERVAL_MINUTES: u64 = 30;
pub const DEFAULT_RETENTION: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupInterval {
    minutes: u64,
}

impl BackupInterval {
    pub fn from_minutes(minutes: u64) -> Result<Self> {
        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) {
            return Err(JotError::Config(format!(
                "backup interval must be between {} and {} minutes, got {}",
                MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES, minutes
            )));
        }
        Ok(Self { minutes })
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.minutes * 60)
    }
}

impl Default for BackupInterval {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupPolicy {
    pub interval: BackupInterval,
    pub retention: Retention,
}

impl Default for BackupPolicy {
    fn default() -> Self {
        Self {
            interval: BackupInterval::default(),
            retention: NonZeroUsize::new(DEFAULT_RETENTION)
                .map_or(Retention::Unbounded, Retention::KeepLast),
        }
    }
}

pub struct BackupScheduler;

impl BackupScheduler {
    /// Spawns the backup task. Must be called from within a tokio runtime.
    pub fn start(gateway: PersistenceGateway, policy: BackupPolicy) -> BackupHandle {
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let snapshots = gateway.subscribe();
        let period = policy.interval.as_duration();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(minutes = policy.interval.minutes(), "backup timer started");

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => {
                        tracing::info!("backup timer stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let snapshot = snapshots.borrow().clone();
                        if snapshot.is_empty() {
                            tracing::debug!("collection empty, periodic backup skipped");
                            continue;
                        }
                        gateway.write_timestamped_backup(&snapshot, now(), policy.retention);
                    }
                }
            }
        });

        BackupHandle {
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }
}

/// Owner of a running backup task.
pub struct BackupHandle {
    stop_tx: Option<mpsc::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl BackupHandle {
    /// Signals the task and waits for it to finish. Safe to call twice.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "backup task ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Note, NoteDraft};
    use crate::store::mem_backend::MemBackend;
    use std::sync::Arc;

    fn gateway() -> PersistenceGateway {
        PersistenceGateway::new(Arc::new(MemBackend::new()))
    }

    fn publish(gateway: &PersistenceGateway, texts: &[&str]) {
        let notes: Vec<Note> = texts
            .iter()
            .map(|t| Note::from_draft(NoteDraft::new(*t), now()))
            .collect();
        gateway.publish(Arc::new(notes));
    }

    fn policy(minutes: u64, keep: usize) -> BackupPolicy {
        BackupPolicy {
            interval: BackupInterval::from_minutes(minutes).unwrap(),
            retention: Retention::from_count(keep),
        }
    }

    fn minutes(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn interval_bounds() {
        assert!(BackupInterval::from_minutes(4).is_err());
        assert!(BackupInterval::from_minutes(1441).is_err());
        assert_eq!(BackupInterval::from_minutes(5).unwrap().minutes(), 5);
        assert_eq!(
            BackupInterval::from_minutes(1440).unwrap().as_duration(),
            Duration::from_secs(86_400)
        );
        assert_eq!(BackupInterval::default().minutes(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn writes_one_backup_per_tick() {
        let gateway = gateway();
        publish(&gateway, &["a", "b"]);
        let mut handle = BackupScheduler::start(gateway.clone(), policy(5, 0));

        tokio::time::sleep(minutes(5) - Duration::from_secs(1)).await;
        assert!(gateway.list_backups().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        let backups = gateway.list_backups();
        assert_eq!(backups.len(), 1);
        let record = gateway.load_backup(&backups[0].key).unwrap();
        assert_eq!(record.notes.len(), 2);
        assert_eq!(record.version, "2.0");
        assert!(gateway.status().last_backup.is_some());

        tokio::time::sleep(minutes(10)).await;
        assert_eq!(gateway.list_backups().len(), 3);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_use_latest_snapshot() {
        let gateway = gateway();
        publish(&gateway, &["first"]);
        let mut handle = BackupScheduler::start(gateway.clone(), policy(5, 0));

        publish(&gateway, &["second", "third"]);
        tokio::time::sleep(minutes(5) + Duration::from_secs(1)).await;

        let backups = gateway.list_backups();
        let record = gateway.load_backup(&backups[0].key).unwrap();
        assert_eq!(record.notes.len(), 2);
        assert_eq!(record.notes[0].text, "second");

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn retention_keeps_newest() {
        let gateway = gateway();
        publish(&gateway, &["x"]);
        let mut handle = BackupScheduler::start(gateway.clone(), policy(5, 2));

        tokio::time::sleep(minutes(20) + Duration::from_secs(1)).await;
        assert_eq!(gateway.list_backups().len(), 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn empty_collection_is_not_backed_up() {
        let gateway = gateway();
        let mut handle = BackupScheduler::start(gateway.clone(), policy(5, 0));

        tokio::time::sleep(minutes(11)).await;
        assert!(gateway.list_backups().is_empty());

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_task() {
        let gateway = gateway();
        publish(&gateway, &["x"]);
        let mut handle = BackupScheduler::start(gateway.clone(), policy(5, 0));
        assert!(handle.is_running());

        handle.stop().await;
        assert!(!handle.is_running());
        handle.stop().await;

        tokio::time::sleep(minutes(30)).await;
        assert!(gateway.list_backups().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_ends_the_task() {
        let gateway = gateway();
        publish(&gateway, &["x"]);
        let handle = BackupScheduler::start(gateway.clone(), policy(5, 0));
        drop(handle);

        tokio::time::sleep(minutes(30)).await;
        assert!(gateway.list_backups().is_empty());
    }
}
