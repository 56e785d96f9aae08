//! Pipeline message types
//!
//! Explicit request/response and event shapes so the engine stays decoupled
//! from whatever notification mechanism the host application uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::row::{RowIssue, RowStatus};

/// Operator correction for a single row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest<R> {
    /// Stable 1-based row index
    pub index: u32,
    /// Replacement raw field values
    pub raw: R,
}

/// Result of applying an edit and re-validating
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResult {
    pub index: u32,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RowIssue>,
    pub warnings: Vec<RowIssue>,
}

/// Batch-level operator confirmation covering every warning row at once
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmBatch {
    pub confirmed: bool,
}

impl ConfirmBatch {
    pub fn confirmed() -> Self {
        Self { confirmed: true }
    }
}

/// Aggregate result of a commit run.
///
/// `succeeded + failed + skipped == total` holds for every finished run,
/// cancelled or not; `with_warnings` counts rows that succeeded despite
/// having had warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub with_warnings: u32,
    pub skipped: u32,
    pub cancelled: bool,
    pub duration_ms: u64,
}

/// Per-row and aggregate events emitted while a commit run executes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommitEvent {
    /// Execution started
    #[serde(rename_all = "camelCase")]
    Started { total: u32 },
    /// A row changed status (processing, then success or error)
    #[serde(rename_all = "camelCase")]
    Row {
        index: u32,
        status: RowStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Recomputed after every row, never batched
    #[serde(rename_all = "camelCase")]
    Progress {
        processed: u32,
        total: u32,
        succeeded: u32,
        failed: u32,
        skipped: u32,
    },
    /// All rows attempted
    #[serde(rename_all = "camelCase")]
    Completed { summary: CommitSummary },
    /// Run stopped early by the cancellation token
    #[serde(rename_all = "camelCase")]
    Cancelled { summary: CommitSummary },
}

/// Event envelope tying a commit event to its run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStatusUpdate {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: CommitEvent,
}

impl CommitStatusUpdate {
    pub fn new(run_id: Uuid, event: CommitEvent) -> Self {
        Self {
            run_id,
            timestamp: Utc::now(),
            event,
        }
    }
}
