use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use super::CollabSettings;
use crate::db::CollabStore;

/// Rows removed by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub rooms_deleted: u64,
    pub files_deleted: u64,
}

/// Periodic cleanup of stale rooms and orphaned files.
///
/// Independent of live sessions: it only talks to the store.
pub struct GarbageCollector {
    store: Arc<dyn CollabStore>,
    interval: Duration,
    room_ttl: Duration,
    orphan_file_ttl: Duration,
}

const MIN_INTERVAL: Duration = Duration::from_secs(1);

fn cutoff(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_sub_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl GarbageCollector {
    pub fn new(store: Arc<dyn CollabStore>, settings: &CollabSettings) -> Self {
        Self {
            store,
            // a zero period would stop the timer task
            interval: settings.gc_interval.max(MIN_INTERVAL),
            room_ttl: settings.room_ttl,
            orphan_file_ttl: settings.orphan_file_ttl,
        }
    }

    /// Run both sweeps once. A failing sweep is logged and does not stop
    /// the other one.
    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        match self.store.delete_stale_rooms(cutoff(now, self.room_ttl)).await {
            Ok(deleted) => {
                report.rooms_deleted = deleted;
                if deleted > 0 {
                    info!("🧹 Cleaned up {} old rooms", deleted);
                }
            }
            Err(e) => error!("❌ Room cleanup error: {}", e),
        }

        match self
            .store
            .delete_orphaned_files(cutoff(now, self.orphan_file_ttl))
            .await
        {
            Ok(deleted) => {
                report.files_deleted = deleted;
                if deleted > 0 {
                    info!("🧹 Cleaned up {} orphaned files", deleted);
                }
            }
            Err(e) => error!("❌ File cleanup error: {}", e),
        }

        report
    }

    /// Sweep every interval, starting one interval from now
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Garbage collector scheduled every {:?}", self.interval);
            loop {
                ticker.tick().await;
                let report = self.sweep(Utc::now()).await;
                debug!(rooms = report.rooms_deleted, files = report.files_deleted, "sweep finished");
            }
        })
    }
}
