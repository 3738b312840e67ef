// src/monitor/mod.rs
// =============================================================================
// This module watches a collection of scan tasks and reports progress.
//
// Submodules:
// - poll: the polling loop, snapshots and change detection
// - report: reporter implementations (human console output, JSON lines)
//
// The monitor never interprets scan results; it only notices that a task's
// log or data changed and hands the new snapshot to a reporter.
// =============================================================================

mod poll;
mod report;

// Re-export the monitoring API
pub use poll::{MonitorExit, TaskMonitor, TaskReporter, TaskSnapshot};
pub use report::{ConsoleReporter, JsonReporter};
