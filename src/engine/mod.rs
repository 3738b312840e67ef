// src/engine/mod.rs
// =============================================================================
// This module is the boundary with the external scanning engine - the thing
// that actually performs SQL injection. We never run payloads ourselves; we
// create remote tasks and query their progress.
//
// Submodules:
// - sqlmap: the default engine, a client for the sqlmap REST API
//
// The ScanEngine trait exists so the crawler, dispatcher and monitor can be
// tested against an in-memory fake instead of a running sqlmap daemon.
// =============================================================================

mod sqlmap;

pub use sqlmap::SqlmapEngine;

use crate::crawl::CookieSet;
use crate::error::ScanError;
use crate::page::FormMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Engine-assigned unique task identifier.
pub type TaskId = String;

/// Everything one orchestrator invocation produced: task id -> handle.
/// Keys are unique by construction (the engine assigns them).
pub type TaskCollection = HashMap<TaskId, TaskHandle>;

/// Opaque reference to one remote scan job.
///
/// The handle itself never changes after creation; all scan state lives in
/// the engine and is read back through `scan_log` / `scan_data`.
#[derive(Debug, Clone, Serialize)]
pub struct TaskHandle {
    pub id: TaskId,
    /// The page or endpoint this task is scanning.
    pub target_url: String,
}

/// One entry of a task's scan log. The engine appends, never rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub level: String,
    pub message: String,
}

/// One structured finding from a task's scan data. The shape is entirely
/// engine-defined, so we keep it as opaque JSON.
pub type Finding = serde_json::Value;

/// The external scanning engine contract.
///
/// Creation failures (`EngineUnavailable`, `TaskCreationFailed`) are fatal
/// to the caller; query failures (`TaskQueryFailed`) are absorbed per task
/// per poll cycle by the monitor.
#[async_trait]
pub trait ScanEngine: Send + Sync {
    /// Start an injection attempt directly against a URL, no form context.
    async fn create_url_task(&self, url: &str) -> Result<TaskHandle, ScanError>;

    /// Start an injection attempt against a page, with every form found so
    /// far (cross-page context) and the session cookies to replay.
    async fn create_form_task(
        &self,
        url: &str,
        forms: &FormMap,
        cookies: &CookieSet,
    ) -> Result<TaskHandle, ScanError>;

    /// Current scan log for a task (ordered, append-only).
    async fn scan_log(&self, task: &TaskHandle) -> Result<Vec<LogEntry>, ScanError>;

    /// Current scan data for a task (structured findings, unordered).
    async fn scan_data(&self, task: &TaskHandle) -> Result<Vec<Finding>, ScanError>;
}
