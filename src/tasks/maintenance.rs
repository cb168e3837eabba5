//! Maintenance Scheduler
//!
//! Runs fallible jobs on a fixed interval with graceful shutdown. The
//! scheduler is deliberately generic: the cache sweep is the one job
//! this crate ships, but anything expressible as a closure can run on
//! an interval through the same handle.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Spawns a background task that runs `job` once per `interval`.
///
/// The first run happens a full interval after the spawn, not
/// immediately. A slow run delays the next tick rather than letting
/// missed ticks burst, and a failing run is logged and does not stop
/// the schedule.
///
/// # Arguments
/// * `name` - Task name used in log lines
/// * `interval` - Time between runs
/// * `job` - The work to run each cycle
///
/// # Returns
/// A [`MaintenanceTask`] handle used to stop the task during shutdown.
pub fn spawn_maintenance<F>(name: &'static str, interval: Duration, mut job: F) -> MaintenanceTask
where
    F: FnMut() -> Result<()> + Send + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        info!(
            task = name,
            interval_secs = interval.as_secs_f64(),
            "maintenance task started"
        );

        // tokio panics on a zero period
        let mut ticker = time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The interval's first tick completes immediately; consume it so
        // the job waits a full interval before its first run.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = job() {
                        warn!(task = name, %err, "maintenance cycle failed");
                    }
                }
                _ = shutdown_rx.changed() => {
                    debug!(task = name, "maintenance task stopping");
                    break;
                }
            }
        }
    });

    MaintenanceTask {
        name,
        shutdown: shutdown_tx,
        handle: Some(handle),
    }
}

/// Handle to a running maintenance task.
///
/// Stopping is cooperative: [`shutdown`](Self::shutdown) signals the
/// task, waits up to a grace period for it to finish the cycle it may
/// be in, and only then aborts. Dropping the handle without calling
/// `shutdown` also stops the task at its next loop iteration, since
/// the watch channel closes.
#[derive(Debug)]
pub struct MaintenanceTask {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl MaintenanceTask {
    /// The name the task logs under.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the background task has already exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Signals the task to stop and waits up to `grace` for it.
    ///
    /// Idempotent: once the task has been stopped, further calls return
    /// immediately.
    pub async fn shutdown(&mut self, grace: Duration) {
        let Some(mut handle) = self.handle.take() else {
            return;
        };

        let _ = self.shutdown.send(true);
        match time::timeout(grace, &mut handle).await {
            Ok(Ok(())) => info!(task = self.name, "maintenance task stopped"),
            Ok(Err(err)) => warn!(task = self.name, %err, "maintenance task ended abnormally"),
            Err(_) => {
                warn!(
                    task = self.name,
                    grace_secs = grace.as_secs_f64(),
                    "maintenance task did not stop in time, aborting"
                );
                handle.abort();
            }
        }
    }
}

// == Tests ==
