// Retention Sweeper
// Scheduled age-based deletion of logs, runs and checks

use crate::application::ShutdownToken;
use crate::error::Result;
use crate::port::time_provider::DAY_MILLIS;
use crate::port::{RetentionConfig, RetentionStore, SweepReport, TimeProvider};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Retention sweeper
///
/// Each table is swept independently; a failure on one is logged and the
/// others still run. Nothing is retried before the next scheduled sweep.
pub struct RetentionSweeper {
    store: Arc<dyn RetentionStore>,
    time_provider: Arc<dyn TimeProvider>,
    config: RetentionConfig,
}

impl RetentionSweeper {
    pub fn new(
        store: Arc<dyn RetentionStore>,
        time_provider: Arc<dyn TimeProvider>,
        config: RetentionConfig,
    ) -> Self {
        Self {
            store,
            time_provider,
            config,
        }
    }

    /// Records started strictly before this instant are deleted
    ///
    /// A horizon too large for i64 milliseconds clamps to `i64::MIN`, which
    /// deletes nothing.
    pub fn cutoff(&self) -> i64 {
        match self.config.retention_days.checked_mul(DAY_MILLIS) {
            Some(horizon) => self.time_provider.now_millis().saturating_sub(horizon),
            None => i64::MIN,
        }
    }

    /// Run one sweep now
    pub async fn sweep(&self) -> SweepReport {
        let cutoff = self.cutoff();

        let report = SweepReport {
            cutoff,
            logs_deleted: sweep_table("playbook_logs", self.store.delete_logs_before(cutoff)).await,
            runs_deleted: sweep_table("playbook_runs", self.store.delete_runs_before(cutoff)).await,
            checks_deleted: sweep_table("inventory_checks", self.store.delete_checks_before(cutoff))
                .await,
        };

        info!(
            cutoff = cutoff,
            logs_deleted = ?report.logs_deleted,
            runs_deleted = ?report.runs_deleted,
            checks_deleted = ?report.checks_deleted,
            "Retention sweep completed"
        );

        report
    }

    /// Sweep loop (background task)
    ///
    /// The first tick fires immediately, so a sweep runs at startup and then
    /// once per interval until shutdown.
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        let period = Duration::from_secs(self.config.sweep_interval_hours.max(1) * 3600);
        info!(
            interval_hours = self.config.sweep_interval_hours,
            retention_days = self.config.retention_days,
            "Retention sweeper started"
        );

        let mut tick = interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    self.sweep().await;
                }
                _ = shutdown.cancelled() => {
                    info!("Retention sweeper stopped");
                    return;
                }
            }
        }
    }
}

async fn sweep_table(table: &str, delete: impl Future<Output = Result<u64>>) -> Option<u64> {
    match delete.await {
        Ok(count) => Some(count),
        Err(e) => {
            error!(table = table, error = %e, "Retention delete failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::shutdown_channel;
    use crate::error::AppError;
    use crate::port::time_provider::mocks::ManualClock;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        cutoffs: Mutex<Vec<i64>>,
        sweeps: AtomicUsize,
        fail_runs: bool,
    }

    #[async_trait]
    impl RetentionStore for RecordingStore {
        async fn delete_logs_before(&self, cutoff: i64) -> Result<u64> {
            self.cutoffs.lock().unwrap().push(cutoff);
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            Ok(4)
        }

        async fn delete_runs_before(&self, cutoff: i64) -> Result<u64> {
            self.cutoffs.lock().unwrap().push(cutoff);
            if self.fail_runs {
                return Err(AppError::Database("database is locked".to_string()));
            }
            Ok(2)
        }

        async fn delete_checks_before(&self, cutoff: i64) -> Result<u64> {
            self.cutoffs.lock().unwrap().push(cutoff);
            Ok(1)
        }
    }

    fn sweeper(store: Arc<RecordingStore>, now: i64) -> RetentionSweeper {
        RetentionSweeper::new(
            store,
            Arc::new(ManualClock::new(now)),
            RetentionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_cutoff_uses_horizon() {
        let now = 100 * DAY_MILLIS;
        let store = Arc::new(RecordingStore::default());
        let report = sweeper(store.clone(), now).sweep().await;

        assert_eq!(report.cutoff, 70 * DAY_MILLIS);
        assert_eq!(report.logs_deleted, Some(4));
        assert_eq!(report.runs_deleted, Some(2));
        assert_eq!(report.checks_deleted, Some(1));
        assert!(store
            .cutoffs
            .lock()
            .unwrap()
            .iter()
            .all(|c| *c == 70 * DAY_MILLIS));
    }

    #[tokio::test]
    async fn test_failing_table_does_not_stop_others() {
        let store = Arc::new(RecordingStore {
            fail_runs: true,
            ..Default::default()
        });
        let report = sweeper(store.clone(), 40 * DAY_MILLIS).sweep().await;

        assert_eq!(report.logs_deleted, Some(4));
        assert_eq!(report.runs_deleted, None);
        assert_eq!(report.checks_deleted, Some(1));
        assert_eq!(store.cutoffs.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_loop_sweeps_at_start_and_stops_on_shutdown() {
        let store = Arc::new(RecordingStore::default());
        let (tx, token) = shutdown_channel();
        let sweeper = sweeper(store.clone(), 40 * DAY_MILLIS);
        let handle = tokio::spawn(async move { sweeper.run(token).await });

        for _ in 0..50 {
            if store.sweeps.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.sweeps.load(Ordering::SeqCst), 1);

        tx.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_huge_horizon_clamps_instead_of_overflowing() {
        let store = Arc::new(RecordingStore::default());
        let now = 100 * DAY_MILLIS;

        for days in [i64::MAX, i64::MAX / DAY_MILLIS + 1] {
            let sweeper = RetentionSweeper::new(
                store.clone(),
                Arc::new(ManualClock::new(now)),
                RetentionConfig {
                    retention_days: days,
                    ..RetentionConfig::default()
                },
            );
            assert_eq!(sweeper.cutoff(), i64::MIN);
        }

        // Representable horizon, but subtracting it from now would underflow
        let sweeper = RetentionSweeper::new(
            store.clone(),
            Arc::new(ManualClock::new(-DAY_MILLIS)),
            RetentionConfig {
                retention_days: i64::MAX / DAY_MILLIS,
                ..RetentionConfig::default()
            },
        );
        assert_eq!(sweeper.cutoff(), i64::MIN);

        let report = sweeper.sweep().await;
        assert_eq!(report.cutoff, i64::MIN);
    }
}
