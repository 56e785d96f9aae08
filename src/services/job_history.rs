//! Import run history
//!
//! Keeps the most recent import runs in memory with file-backed JSON
//! persistence so the history survives restarts.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::CommitSummary;

const MAX_HISTORY_SIZE: usize = 100;

/// One finished import run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportHistoryEntry {
    pub id: Uuid,
    pub entity: String,
    pub filename: Option<String>,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<CommitSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// History storage backed by an in-memory deque + JSON file on disk.
pub struct ImportHistory {
    path: Option<PathBuf>,
    entries: RwLock<VecDeque<ImportHistoryEntry>>,
}

impl ImportHistory {
    /// In-memory only; nothing is persisted.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            entries: RwLock::new(VecDeque::new()),
        }
    }

    /// File-backed history, loading any previous entries from disk.
    pub fn with_file(path: PathBuf) -> Self {
        let mut entries = VecDeque::with_capacity(MAX_HISTORY_SIZE);
        if let Ok(content) = std::fs::read_to_string(&path) {
            match serde_json::from_str::<Vec<ImportHistoryEntry>>(&content) {
                Ok(loaded) => {
                    entries.extend(loaded);
                    info!("Loaded {} import history entries from disk", entries.len());
                }
                Err(e) => warn!("Ignoring unreadable import history file: {}", e),
            }
        }
        Self {
            path: Some(path),
            entries: RwLock::new(entries),
        }
    }

    /// Record a run that reached a summary (completed or cancelled).
    pub fn record_run(
        &self,
        id: Uuid,
        entity: &str,
        filename: Option<&str>,
        started_at: DateTime<Utc>,
        summary: CommitSummary,
    ) {
        let status = if summary.cancelled {
            "cancelled"
        } else {
            "completed"
        };
        self.add_entry(ImportHistoryEntry {
            id,
            entity: entity.to_string(),
            filename: filename.map(str::to_string),
            status: status.to_string(),
            started_at,
            completed_at: Utc::now(),
            duration_ms: summary.duration_ms,
            summary: Some(summary),
            error: None,
        });
    }

    /// Record a run that never executed (parse failure, refused gate).
    pub fn record_failed(
        &self,
        id: Uuid,
        entity: &str,
        filename: Option<&str>,
        started_at: DateTime<Utc>,
        error: String,
    ) {
        let completed_at = Utc::now();
        let duration_ms = (completed_at - started_at).num_milliseconds().max(0) as u64;
        self.add_entry(ImportHistoryEntry {
            id,
            entity: entity.to_string(),
            filename: filename.map(str::to_string),
            status: "failed".to_string(),
            started_at,
            completed_at,
            duration_ms,
            summary: None,
            error: Some(error),
        });
    }

    /// Entries newest first.
    pub fn list(&self) -> Vec<ImportHistoryEntry> {
        self.entries.read().iter().cloned().collect()
    }

    fn add_entry(&self, entry: ImportHistoryEntry) {
        {
            let mut entries = self.entries.write();
            entries.push_front(entry);
            entries.truncate(MAX_HISTORY_SIZE);
        }
        self.persist();
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let snapshot: Vec<_> = self.list();
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => {
                if let Some(parent) = path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                if let Err(e) = std::fs::write(path, json) {
                    warn!("Failed to persist import history: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize import history: {}", e),
        }
    }
}
