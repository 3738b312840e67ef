// src/error.rs
// =============================================================================
// This module defines the typed error taxonomy for the scanner core.
//
// The granularity matters more than the variants themselves:
// - InvalidTarget and the two engine errors abort the whole operation
//   (no work unit can be established without them)
// - FetchFailed is absorbed per crawl branch (a dead page must not kill
//   the crawl of its siblings)
// - TaskQueryFailed is absorbed per task per poll cycle (one unreachable
//   task must not stop monitoring of the others)
//
// We use `thiserror` for the library side; main.rs wraps everything in
// anyhow for display at the application boundary.
// =============================================================================

use thiserror::Error;

/// Errors produced by the crawl/dispatch/monitor core.
///
/// Which variant a function returns tells the caller how far the failure
/// reaches; see the module header for the absorption rules.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The target URL could not be parsed or is not http(s).
    /// Raised before any scan task is created.
    #[error("invalid target URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    /// A single page could not be fetched. The crawler treats the page as
    /// empty (no forms, no links, no cookies) and keeps going.
    #[error("failed to fetch '{url}': {reason}")]
    FetchFailed { url: String, reason: String },

    /// The scanning engine could not be reached at all.
    #[error("scanning engine unavailable: {reason}")]
    EngineUnavailable { reason: String },

    /// The engine answered but refused to create a task for this target.
    #[error("engine could not create a task for '{url}': {reason}")]
    TaskCreationFailed { url: String, reason: String },

    /// A scan log/data query for one task failed. The monitor keeps the
    /// task's last-known snapshot and retries next cycle.
    #[error("query for task '{task_id}' failed: {reason}")]
    TaskQueryFailed { task_id: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_target() {
        let err = ScanError::InvalidTarget {
            url: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert!(err.to_string().contains("not a url"));

        let err = ScanError::TaskQueryFailed {
            task_id: "abc123".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("abc123"));
    }
}
