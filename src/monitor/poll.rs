// src/monitor/poll.rs
// =============================================================================
// This module polls scan tasks and reports only what changed.
//
// How it works:
// 1. Sleep one interval (the engine needs a moment before the first poll
//    says anything useful)
// 2. Snapshot every task: query its scan log and scan data
// 3. Compare each snapshot's fingerprint against the last one we saw for
//    that task id; unchanged -> silence, changed -> exactly one report
// 4. Repeat until the cancellation token fires
//
// The per-cycle queries run concurrently (buffer_unordered), but every task
// is checked exactly once per cycle and reports are emitted after the whole
// cycle has been collected.
//
// A query failure for one task is logged and skipped: its last-known
// fingerprint stays in place, so the change is reported once a query
// succeeds again. Other tasks are unaffected.
// =============================================================================

use crate::engine::{Finding, LogEntry, ScanEngine, TaskCollection, TaskHandle};
use crate::error::ScanError;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

// How many task queries may be in flight at once within a cycle
const MAX_CONCURRENT_QUERIES: usize = 8;

/// The combined log + data state of a task at one poll.
///
/// This is a derived value: it exists only so two polls can be compared.
/// Nothing is persisted beyond the fingerprint of the last one seen.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSnapshot {
    pub log: Vec<LogEntry>,
    pub data: Vec<Finding>,
}

impl TaskSnapshot {
    /// Comparison key for change detection. Two snapshots with the same
    /// log and data always fingerprint identically.
    pub fn fingerprint(&self) -> String {
        format!("{:?}{:?}", self.data, self.log)
    }
}

/// Where task reports go. Implementations decide the medium (console,
/// JSON stream, a test's Vec) - the monitor only decides the *when*.
pub trait TaskReporter: Send + Sync {
    fn on_task_changed(&self, task: &TaskHandle, snapshot: &TaskSnapshot);
}

/// Why the monitor loop ended. There is exactly one way out.
#[derive(Debug, PartialEq, Eq)]
pub enum MonitorExit {
    Cancelled,
}

/// Polls a task collection on a fixed interval, reporting state changes.
pub struct TaskMonitor<'a> {
    engine: &'a dyn ScanEngine,
    interval: Duration,
    cancel: CancellationToken,
}

impl<'a> TaskMonitor<'a> {
    pub fn new(
        engine: &'a dyn ScanEngine,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            engine,
            interval,
            cancel,
        }
    }

    /// Runs the polling loop until cancelled.
    ///
    /// The first snapshot of each task always counts as a change (there is
    /// no previous fingerprint), so every task is reported at least once.
    pub async fn monitor(
        &self,
        tasks: &TaskCollection,
        reporter: &dyn TaskReporter,
    ) -> MonitorExit {
        let mut last_seen: HashMap<String, String> = HashMap::new();

        loop {
            // The sleep itself is interruptible; a Ctrl-C mid-interval
            // should not wait out the remaining seconds
            tokio::select! {
                _ = self.cancel.cancelled() => return MonitorExit::Cancelled,
                _ = tokio::time::sleep(self.interval) => {}
            }

            let cycle: Vec<_> = stream::iter(
                tasks
                    .values()
                    .map(|task| async move { (task, self.snapshot(task).await) }),
            )
            .buffer_unordered(MAX_CONCURRENT_QUERIES)
            .collect()
            .await;

            for (task, result) in cycle {
                match result {
                    Ok(snapshot) => {
                        let fingerprint = snapshot.fingerprint();
                        if last_seen.get(&task.id) == Some(&fingerprint) {
                            debug!(task_id = %task.id, "no change");
                            continue;
                        }
                        last_seen.insert(task.id.clone(), fingerprint);
                        reporter.on_task_changed(task, &snapshot);
                    }
                    Err(e) => {
                        // Keep the last fingerprint: when the query works
                        // again, whatever changed meanwhile gets reported
                        warn!(task_id = %task.id, error = %e, "task query failed");
                    }
                }
            }
        }
    }

    async fn snapshot(&self, task: &TaskHandle) -> Result<TaskSnapshot, ScanError> {
        let log = self.engine.scan_log(task).await?;
        let data = self.engine.scan_data(task).await?;
        Ok(TaskSnapshot { log, data })
    }
}
