// src/monitor/report.rs
// =============================================================================
// Reporter implementations: where task change reports end up.
//
// - ConsoleReporter: human-readable blocks on stdout, one per change
// - JsonReporter: one JSON object per line, for piping into other tools
//
// Both are stateless; all change-detection state lives in the monitor.
// =============================================================================

use super::{TaskReporter, TaskSnapshot};
use crate::engine::TaskHandle;
use serde::Serialize;

/// Prints a human-readable block per changed task.
pub struct ConsoleReporter;

impl TaskReporter for ConsoleReporter {
    fn on_task_changed(&self, task: &TaskHandle, snapshot: &TaskSnapshot) {
        let rule = "-".repeat(58);

        println!();
        println!("{rule}");
        println!("🎯 Scan url: {}", task.target_url);
        println!("   Task id:  {}", task.id);
        println!("{rule}");

        println!("📋 Scan log:");
        if snapshot.log.is_empty() {
            println!("   (empty)");
        }
        for entry in &snapshot.log {
            println!("   [{}] {} {}", entry.time, entry.level, entry.message);
        }

        println!("{rule}");
        println!("💉 Scan data:");
        if snapshot.data.is_empty() {
            println!("   (no findings yet)");
        }
        for finding in &snapshot.data {
            // Findings are engine-shaped JSON; pretty-print what we can
            match serde_json::to_string_pretty(finding) {
                Ok(pretty) => println!("{pretty}"),
                Err(_) => println!("   {finding:?}"),
            }
        }
        println!();
    }
}

/// Prints one JSON object per changed task, machine-readable.
pub struct JsonReporter;

// The line format: task identity plus the full snapshot
#[derive(Serialize)]
struct JsonReport<'a> {
    task_id: &'a str,
    target_url: &'a str,
    #[serde(flatten)]
    snapshot: &'a TaskSnapshot,
}

impl TaskReporter for JsonReporter {
    fn on_task_changed(&self, task: &TaskHandle, snapshot: &TaskSnapshot) {
        let report = JsonReport {
            task_id: &task.id,
            target_url: &task.target_url,
            snapshot,
        };
        match serde_json::to_string(&report) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(task_id = %task.id, error = %e, "report serialization failed"),
        }
    }
}
